use crate::grid::{Position, Puzzle};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An unobstructed straight line between two islands; `a` is always the upper or left endpoint.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CandidateEdge {
    pub a: Position,
    pub b: Position,
}

impl CandidateEdge {
    pub fn new(a: Position, b: Position) -> Self {
        debug_assert!(a.row == b.row || a.col == b.col);
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.a.row == self.b.row {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    pub fn touches(&self, position: Position) -> bool {
        self.a == position || self.b == position
    }

    /// Cells strictly between the endpoints.
    pub fn interior(&self) -> impl Iterator<Item = Position> {
        let (a, b) = (self.a, self.b);
        let horizontal = self.orientation() == Orientation::Horizontal;
        let (start, end) = if horizontal { (a.col, b.col) } else { (a.row, b.row) };
        (start + 1..end).map(move |i| {
            if horizontal {
                Position::new(a.row, i)
            } else {
                Position::new(i, a.col)
            }
        })
    }

    /// Whether a horizontal and a vertical edge meet at a point interior to both.
    /// Sharing an endpoint is not a crossing, and parallel edges never cross.
    pub fn crosses(&self, other: &CandidateEdge) -> bool {
        let (horizontal, vertical) = match (self.orientation(), other.orientation()) {
            (Orientation::Horizontal, Orientation::Vertical) => (self, other),
            (Orientation::Vertical, Orientation::Horizontal) => (other, self),
            _ => return false,
        };
        let row = horizontal.a.row;
        let col = vertical.a.col;
        vertical.a.row < row && row < vertical.b.row && horizontal.a.col < col && col < horizontal.b.col
    }
}

/// For every island, the nearest island to its right and the nearest below, in row-major island
/// order with the right neighbour first.
pub fn candidate_edges(puzzle: &Puzzle) -> Vec<CandidateEdge> {
    let mut edges = vec![];
    for island in puzzle.islands() {
        let Position { row, col } = island.position;

        if let Some(right) = (col + 1..puzzle.cols())
            .map(|c| Position::new(row, c))
            .find(|p| puzzle.is_island(*p))
        {
            edges.push(CandidateEdge::new(island.position, right));
        }

        if let Some(below) = (row + 1..puzzle.rows())
            .map(|r| Position::new(r, col))
            .find(|p| puzzle.is_island(*p))
        {
            edges.push(CandidateEdge::new(island.position, below));
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn square_has_four_sides() {
        let puzzle = Puzzle::parse("2,2\n2,2").unwrap();
        let edges = candidate_edges(&puzzle);
        assert_eq!(
            edges,
            vec![
                CandidateEdge::new(pos(0, 0), pos(0, 1)),
                CandidateEdge::new(pos(0, 0), pos(1, 0)),
                CandidateEdge::new(pos(0, 1), pos(1, 1)),
                CandidateEdge::new(pos(1, 0), pos(1, 1)),
            ]
        );
    }

    #[test]
    fn only_nearest_neighbour_is_a_candidate() {
        let puzzle = Puzzle::parse("1,0,2,0,1").unwrap();
        let edges = candidate_edges(&puzzle);
        assert_eq!(
            edges,
            vec![CandidateEdge::new(pos(0, 0), pos(0, 2)), CandidateEdge::new(pos(0, 2), pos(0, 4))]
        );
    }

    #[test]
    fn no_diagonals() {
        let puzzle = Puzzle::parse("1,0\n0,1").unwrap();
        assert!(candidate_edges(&puzzle).is_empty());
    }

    #[test]
    fn endpoints_are_normalised() {
        let e = CandidateEdge::new(pos(3, 1), pos(0, 1));
        assert_eq!(e.a, pos(0, 1));
        assert_eq!(e.orientation(), Orientation::Vertical);
        assert_eq!(e.b, pos(3, 1));
        assert!(e.touches(pos(3, 1)));
        assert!(!e.touches(pos(2, 1)));
        assert_eq!(e.interior().collect::<Vec<_>>(), vec![pos(1, 1), pos(2, 1)]);
    }

    #[test]
    fn crossing_requires_interior_intersection() {
        let horizontal = CandidateEdge::new(pos(1, 0), pos(1, 2));
        let vertical = CandidateEdge::new(pos(0, 1), pos(2, 1));
        assert!(horizontal.crosses(&vertical));
        assert!(vertical.crosses(&horizontal));

        // meeting at an endpoint
        let touching = CandidateEdge::new(pos(1, 2), pos(3, 2));
        assert!(!horizontal.crosses(&touching));

        // parallel
        let parallel = CandidateEdge::new(pos(2, 0), pos(2, 2));
        assert!(!horizontal.crosses(&parallel));

        // passes beside
        let beside = CandidateEdge::new(pos(2, 1), pos(4, 1));
        assert!(!horizontal.crosses(&beside));
    }
}
