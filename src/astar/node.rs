use crate::board::{Board, Move};

/// Index of a node in its [`NodeArena`].
pub(super) type NodeId = usize;

/// One explored configuration with its path-cost bookkeeping.
///
/// `h` is fixed at creation; `f` is derived from `g` so the two can never
/// drift apart when a cheaper path relinks the node.
pub(super) struct SearchNode {
    pub board: Board,
    /// Move that produced this configuration; `None` only for the start.
    pub mv: Option<Move>,
    /// Path cost from the start.
    pub g: u32,
    /// Heuristic estimate to the target.
    pub h: u32,
    /// Predecessor in the search tree, as an arena index.
    pub parent: Option<NodeId>,
}

impl SearchNode {
    #[inline]
    pub fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Owns every node created during one solve.
///
/// Predecessor references are plain indices into this arena, so the search
/// tree has no ownership cycles and nodes stay alive until the whole arena
/// is dropped with the solve.
#[derive(Default)]
pub(super) struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn insert(&mut self, node: SearchNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id]
    }

    /// Walk predecessor links from `id` back to the start, returning the
    /// moves in the order they must be applied from the start.
    ///
    /// Pure: callable for any node, any number of times, without touching
    /// search state.
    pub fn path_to(&self, id: NodeId) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut cursor = Some(id);
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            if let Some(mv) = node.mv {
                moves.push(mv);
            }
            cursor = node.parent;
        }
        moves.reverse();
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (NodeArena, NodeId) {
        // start --Up--> a --Left--> b
        let start = Board::solved(3);
        let a = start.apply(Move::Up).unwrap();
        let b = a.apply(Move::Left).unwrap();
        let mut arena = NodeArena::default();
        let start_id = arena.insert(SearchNode {
            board: start,
            mv: None,
            g: 0,
            h: 0,
            parent: None,
        });
        let a_id = arena.insert(SearchNode {
            board: a,
            mv: Some(Move::Up),
            g: 1,
            h: 1,
            parent: Some(start_id),
        });
        let b_id = arena.insert(SearchNode {
            board: b,
            mv: Some(Move::Left),
            g: 2,
            h: 2,
            parent: Some(a_id),
        });
        (arena, b_id)
    }

    #[test]
    fn path_to_orders_moves_from_the_start() {
        let (arena, tail) = chain();
        assert_eq!(arena.path_to(tail), vec![Move::Up, Move::Left]);
    }

    #[test]
    fn path_to_is_restartable_from_any_node() {
        let (arena, tail) = chain();
        assert_eq!(arena.path_to(tail), arena.path_to(tail));
        assert_eq!(arena.path_to(0), Vec::<Move>::new());
        assert_eq!(arena.path_to(1), vec![Move::Up]);
    }

    #[test]
    fn predecessor_chain_strictly_decreases_in_g() {
        let (arena, tail) = chain();
        let mut cursor = Some(tail);
        let mut last_g = None;
        while let Some(i) = cursor {
            let node = arena.get(i);
            if let Some(prev) = last_g {
                assert!(node.g < prev, "g must strictly decrease toward the start");
            }
            last_g = Some(node.g);
            cursor = node.parent;
        }
        assert_eq!(last_g, Some(0));
    }
}
