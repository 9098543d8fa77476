use crate::connectivity::is_connected;
use crate::edges::CandidateEdge;
use crate::grid::{Position, Puzzle};
use itertools::Itertools;
use thiserror::Error;

/// One to two bridges along a candidate edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Bridge {
    pub edge: CandidateEdge,
    pub weight: u8,
}

/// Why a set of bridges does not solve a puzzle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("bridge {a} - {b} has weight {weight}")]
    Weight { a: Position, b: Position, weight: u8 },
    #[error("bridge {a} - {b} does not join two neighbouring islands")]
    NotCandidate { a: Position, b: Position },
    #[error("island at {position} needs {expected} bridges but has {found}")]
    Degree { position: Position, expected: u8, found: u8 },
    #[error("bridges {first:?} and {second:?} cross")]
    Crossing { first: CandidateEdge, second: CandidateEdge },
    #[error("islands are not all connected")]
    Disconnected,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Solution {
    bridges: Vec<Bridge>,
}

impl Solution {
    pub fn new(bridges: Vec<Bridge>) -> Self {
        Self { bridges }
    }

    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    /// Total bridge weight ending at `position`.
    pub fn degree(&self, position: Position) -> u8 {
        self.bridges
            .iter()
            .filter(|bridge| bridge.edge.touches(position))
            .map(|bridge| bridge.weight)
            .sum()
    }

    pub fn is_connected(&self, puzzle: &Puzzle) -> bool {
        is_connected(
            puzzle.island_positions(),
            self.bridges.iter().map(|bridge| (bridge.edge.a, bridge.edge.b)),
        )
    }

    /// Check every puzzle rule, reporting the first broken one.
    pub fn verify(&self, puzzle: &Puzzle) -> Result<(), Violation> {
        for bridge in &self.bridges {
            let CandidateEdge { a, b } = bridge.edge;
            if !(1..=2).contains(&bridge.weight) {
                return Err(Violation::Weight { a, b, weight: bridge.weight });
            }
            let aligned = a.row == b.row || a.col == b.col;
            if !aligned
                || !puzzle.is_island(a)
                || !puzzle.is_island(b)
                || bridge.edge.interior().any(|p| puzzle.is_island(p))
            {
                return Err(Violation::NotCandidate { a, b });
            }
        }

        for island in puzzle.islands() {
            let found = self.degree(island.position);
            if found != island.degree {
                return Err(Violation::Degree {
                    position: island.position,
                    expected: island.degree,
                    found,
                });
            }
        }

        if let Some((first, second)) = self
            .bridges
            .iter()
            .tuple_combinations()
            .find(|(x, y)| x.edge.crosses(&y.edge))
        {
            return Err(Violation::Crossing {
                first: first.edge,
                second: second.edge,
            });
        }

        if !self.is_connected(puzzle) {
            return Err(Violation::Disconnected);
        }
        Ok(())
    }
}
