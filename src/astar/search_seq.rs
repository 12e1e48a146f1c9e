use crate::board::{Board, Goal, Move};

use super::{validate, SearchCtx, SearchStats, SolveError};

/// Single-threaded A* search.
///
/// Expands nodes in strict non-decreasing f order, so the returned path is
/// optimal for the admissible, consistent Manhattan heuristic. The parallel
/// variant trades that guarantee for wall-clock speed.
pub struct Astar {
    stats: SearchStats,
}

impl Astar {
    pub fn new() -> Self {
        Self {
            stats: SearchStats::default(),
        }
    }

    /// Find a move sequence taking `start` to `goal`.
    ///
    /// Returns the empty sequence when `start` already matches the target.
    ///
    /// ```
    /// use npuzzle::astar::Astar;
    /// use npuzzle::board::{Board, Goal};
    ///
    /// let goal = Goal::standard(3);
    /// let mut solver = Astar::new();
    /// let steps = solver.solve(&Board::solved(3), &goal).unwrap();
    /// assert!(steps.is_empty());
    /// ```
    pub fn solve(&mut self, start: &Board, goal: &Goal) -> Result<Vec<Move>, SolveError> {
        validate(start, goal)?;
        let mut ctx = SearchCtx::new(start, goal);
        let result = loop {
            let Some(id) = ctx.pop() else {
                break Err(SolveError::Exhausted);
            };
            if ctx.arena.get(id).h == 0 {
                break Ok(ctx.arena.path_to(id));
            }
            let (board, g) = {
                let node = ctx.arena.get(id);
                (node.board.clone(), node.g)
            };
            for (mv, to) in board.legal_moves() {
                let neighbor = board.with_blank_at(to);
                let h = goal.distance_from(&neighbor);
                ctx.integrate(id, g, mv, neighbor, h);
            }
        };
        self.stats = ctx.stats;
        result
    }

    /// Statistics collected from the last call to [`solve`](Self::solve).
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }
}

impl Default for Astar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::board::StateKey;

    /// True shortest distances from `goal` to every reachable board.
    fn bfs_distances(goal: &Board) -> HashMap<StateKey, (Board, u32)> {
        let mut dist = HashMap::new();
        dist.insert(goal.key(), (goal.clone(), 0));
        let mut queue = VecDeque::from([goal.clone()]);
        while let Some(board) = queue.pop_front() {
            let d = dist[board.tiles()].1;
            for (_, to) in board.legal_moves() {
                let next = board.with_blank_at(to);
                if !dist.contains_key(next.tiles()) {
                    dist.insert(next.key(), (next.clone(), d + 1));
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    #[test]
    fn already_solved_returns_no_moves() {
        let goal = Goal::standard(3);
        let mut solver = Astar::new();
        let steps = solver.solve(&Board::solved(3), &goal).unwrap();
        assert!(steps.is_empty());
        assert_eq!(solver.last_stats().expanded, 1);
    }

    #[test]
    fn single_swap_needs_a_single_move() {
        let goal = Goal::standard(3);
        let start = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        let mut solver = Astar::new();
        let steps = solver.solve(&start, &goal).unwrap();
        assert_eq!(steps, vec![Move::Right]);
        let end = start.apply(Move::Right).unwrap();
        assert_eq!(goal.distance_from(&end), 0);
    }

    #[test]
    fn paths_are_optimal_on_the_full_2x2_space() {
        let goal = Goal::standard(2);
        let goal_board = Board::solved(2);
        let mut solver = Astar::new();
        for (board, true_dist) in bfs_distances(&goal_board).values() {
            let steps = solver.solve(board, &goal).unwrap();
            assert_eq!(
                steps.len() as u32,
                *true_dist,
                "suboptimal path for {board:?}"
            );
        }
    }

    #[test]
    fn heuristic_never_overestimates_on_2x2() {
        let goal = Goal::standard(2);
        for (board, true_dist) in bfs_distances(&Board::solved(2)).values() {
            assert!(
                goal.distance_from(board) <= *true_dist,
                "inadmissible estimate for {board:?}"
            );
        }
    }

    #[test]
    fn unsolvable_scramble_is_reported_not_hung() {
        let goal = Goal::standard(2);
        // two tiles transposed relative to the solved layout: unreachable
        let start = Board::from_tiles(2, vec![2, 1, 3, 0]).unwrap();
        let mut solver = Astar::new();
        assert_eq!(solver.solve(&start, &goal), Err(SolveError::Exhausted));
        // the whole reachable half of the space was expanded
        assert_eq!(solver.last_stats().expanded, 12);
    }

    #[test]
    fn malformed_target_is_fatal_before_any_expansion() {
        let goal = Goal::from_positions(2, [(1, (0, 0)), (2, (0, 1))]);
        let start = Board::solved(2);
        let mut solver = Astar::new();
        assert_eq!(
            solver.solve(&start, &goal),
            Err(SolveError::MalformedTarget { tile: 3 })
        );
        assert_eq!(solver.last_stats().expanded, 0);
    }

    #[test]
    fn mismatched_sides_are_rejected() {
        let goal = Goal::standard(4);
        let mut solver = Astar::new();
        assert_eq!(
            solver.solve(&Board::solved(3), &goal),
            Err(SolveError::SizeMismatch { board: 3, goal: 4 })
        );
    }

    #[test]
    fn closed_keys_are_never_reopened() {
        let goal = Goal::standard(3);
        let start = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        let mut ctx = SearchCtx::new(&start, &goal);
        let id = ctx.pop().unwrap();
        let closed_g = ctx.arena.get(id).g;
        // a second, costlier route to the already-closed configuration
        ctx.integrate(id, 7, Move::Left, start.clone(), 1);
        assert_eq!(ctx.arena.get(id).g, closed_g);
        assert!(ctx.frontier.get_open(start.tiles()).is_none());
        assert_eq!(ctx.stats.generated, 0);
    }

    #[test]
    fn cheaper_paths_relink_open_nodes_in_place() {
        let goal = Goal::standard(3);
        let start = Board::solved(3);
        let mut ctx = SearchCtx::new(&start, &goal);
        let id = ctx.pop().unwrap();
        let neighbor = start.apply(Move::Up).unwrap();
        let h = goal.distance_from(&neighbor);
        // first discovered through a costly path, then through a cheap one
        ctx.integrate(id, 5, Move::Up, neighbor.clone(), h);
        let nid = ctx.frontier.get_open(neighbor.tiles()).unwrap();
        assert_eq!(ctx.arena.get(nid).g, 6);
        ctx.integrate(id, 0, Move::Up, neighbor.clone(), h);
        assert_eq!(ctx.arena.get(nid).g, 1);
        assert_eq!(ctx.stats.relinked, 1);
        // an equal-cost path changes nothing
        ctx.integrate(id, 0, Move::Up, neighbor, h);
        assert_eq!(ctx.arena.get(nid).g, 1);
        assert_eq!(ctx.stats.relinked, 1);
    }

    #[test]
    fn replaying_the_answer_reaches_the_target() {
        use rand::{rngs::StdRng, SeedableRng};
        let goal = Goal::standard(3);
        let mut rng = StdRng::seed_from_u64(4242);
        let mut solver = Astar::new();
        for _ in 0..10 {
            let start = Board::shuffled(3, &mut rng);
            let steps = solver.solve(&start, &goal).unwrap();
            let end = steps
                .iter()
                .fold(start, |b, &mv| b.apply(mv).expect("legal move"));
            assert_eq!(goal.distance_from(&end), 0);
        }
    }
}
