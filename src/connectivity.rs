use crate::grid::Position;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;

/// Whether every island is reachable from the first one through `bridges`. Bridge weights do not
/// matter here, only which pairs are joined. No islands at all counts as connected.
pub fn is_connected(
    islands: impl IntoIterator<Item = Position>,
    bridges: impl IntoIterator<Item = (Position, Position)>,
) -> bool {
    let mut graph = UnGraphMap::<Position, ()>::new();
    let mut start = None;
    for island in islands {
        start.get_or_insert(island);
        graph.add_node(island);
    }
    for (a, b) in bridges {
        graph.add_edge(a, b, ());
    }
    let start = match start {
        Some(start) => start,
        None => return true,
    };

    let mut bfs = Bfs::new(&graph, start);
    let mut reached = 0;
    while bfs.next(&graph).is_some() {
        reached += 1;
    }
    reached == graph.node_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn square_ring_is_connected() {
        let islands = vec![pos(0, 0), pos(0, 1), pos(1, 0), pos(1, 1)];
        let bridges = vec![(pos(0, 0), pos(0, 1)), (pos(0, 1), pos(1, 1)), (pos(1, 1), pos(1, 0))];
        assert!(is_connected(islands, bridges));
    }

    #[test]
    fn two_pairs_are_not_connected() {
        let islands = vec![pos(0, 0), pos(0, 1), pos(1, 0), pos(1, 1)];
        let bridges = vec![(pos(0, 0), pos(0, 1)), (pos(1, 0), pos(1, 1))];
        assert!(!is_connected(islands, bridges));
    }

    #[test]
    fn lone_island_is_connected() {
        assert!(is_connected(vec![pos(2, 3)], vec![]));
        assert!(!is_connected(vec![pos(2, 3), pos(2, 5)], vec![]));
    }

    #[test]
    fn start_island_does_not_matter() {
        let bridges = vec![(pos(0, 0), pos(0, 2)), (pos(0, 2), pos(3, 2))];
        assert!(is_connected(vec![pos(3, 2), pos(0, 0), pos(0, 2)], bridges.clone()));
        assert!(is_connected(vec![pos(0, 2), pos(3, 2), pos(0, 0)], bridges));
    }
}
