use std::sync::{Condvar, Mutex};
use std::thread;

use crate::board::{Board, Goal, Move};

use super::node::NodeId;
use super::{validate, SearchCtx, SearchConfig, SearchStats, SolveError};

/// Parallel A* search: a fixed pool of workers racing on one shared
/// frontier.
///
/// All frontier/closed-set mutations are serialized behind a single lock;
/// neighbor construction and heuristic evaluation run outside it so workers
/// overlap the CPU work. Idle workers block on a condvar until a peer
/// pushes new nodes or the search is decided.
///
/// The first worker to pop a goal node commits the result; a goal found a
/// beat later by another worker is discarded without comparing costs, so
/// the returned path can be slightly longer than optimal when near-ties
/// race. [`Astar`](super::Astar) gives the optimality guarantee.
pub struct AstarParallel {
    cfg: SearchConfig,
    stats: SearchStats,
}

enum Outcome {
    Running,
    Found(NodeId),
    Exhausted,
}

struct ParCtx {
    search: SearchCtx,
    /// Workers currently expanding a popped node off-lock. The frontier
    /// being empty means exhaustion only once this reaches zero.
    in_flight: usize,
    outcome: Outcome,
}

struct Shared {
    ctx: Mutex<ParCtx>,
    work: Condvar,
}

impl AstarParallel {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(cfg: SearchConfig) -> Self {
        Self {
            cfg,
            stats: SearchStats::default(),
        }
    }

    /// Find a move sequence taking `start` to `goal`.
    ///
    /// Returns the empty sequence when `start` already matches the target;
    /// no worker is spawned in that case.
    ///
    /// ```
    /// use npuzzle::astar::{AstarParallel, SearchConfig};
    /// use npuzzle::board::{Board, Goal};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let goal = Goal::standard(3);
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let start = Board::shuffled(3, &mut rng);
    ///
    /// let mut solver = AstarParallel::with_config(SearchConfig { workers: 2 });
    /// let steps = solver.solve(&start, &goal).expect("3x3 scrambles are solvable");
    ///
    /// let end = steps.iter().fold(start, |b, &mv| b.apply(mv).unwrap());
    /// assert_eq!(goal.distance_from(&end), 0);
    /// ```
    pub fn solve(&mut self, start: &Board, goal: &Goal) -> Result<Vec<Move>, SolveError> {
        validate(start, goal)?;
        if goal.distance_from(start) == 0 {
            self.stats = SearchStats::default();
            return Ok(Vec::new());
        }
        let workers = self.cfg.workers.max(1);
        let shared = Shared {
            ctx: Mutex::new(ParCtx {
                search: SearchCtx::new(start, goal),
                in_flight: 0,
                outcome: Outcome::Running,
            }),
            work: Condvar::new(),
        };
        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| worker(&shared, goal));
            }
        });
        let ctx = shared.ctx.into_inner().expect("a search worker panicked");
        self.stats = ctx.search.stats;
        match ctx.outcome {
            Outcome::Found(id) => Ok(ctx.search.arena.path_to(id)),
            Outcome::Exhausted => Err(SolveError::Exhausted),
            Outcome::Running => unreachable!("workers exited with the search undecided"),
        }
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

impl Default for AstarParallel {
    fn default() -> Self {
        Self::new()
    }
}

fn worker(shared: &Shared, goal: &Goal) {
    loop {
        // Pop under the lock; a pop moves the key from open to closed
        // atomically. Block while the frontier is empty but peers still
        // hold popped nodes that may yet push successors.
        let mut guard = shared.ctx.lock().expect("search context poisoned");
        let (id, board, g) = loop {
            let ctx = &mut *guard;
            if !matches!(ctx.outcome, Outcome::Running) {
                return;
            }
            if let Some(id) = ctx.search.pop() {
                let node = ctx.search.arena.get(id);
                if node.h == 0 {
                    // goal popped: only the first committed report is
                    // honored, and it is committed under the same lock
                    // that handed the node out
                    ctx.outcome = Outcome::Found(id);
                    shared.work.notify_all();
                    return;
                }
                let popped = (id, node.board.clone(), node.g);
                ctx.in_flight += 1;
                break popped;
            }
            if ctx.in_flight == 0 {
                // nothing open and nobody expanding: the reachable space
                // is spent, report it instead of blocking forever
                ctx.outcome = Outcome::Exhausted;
                shared.work.notify_all();
                return;
            }
            guard = shared.work.wait(guard).expect("search context poisoned");
        };
        drop(guard);

        // Neighbor configurations and heuristics are built on private
        // copies outside the lock.
        let neighbors: Vec<(Move, Board, u32)> = board
            .legal_moves()
            .into_iter()
            .map(|(mv, to)| {
                let next = board.with_blank_at(to);
                let h = goal.distance_from(&next);
                (mv, next, h)
            })
            .collect();

        let mut guard = shared.ctx.lock().expect("search context poisoned");
        let ctx = &mut *guard;
        if matches!(ctx.outcome, Outcome::Running) {
            for (mv, next, h) in neighbors {
                ctx.search.integrate(id, g, mv, next, h);
            }
        }
        ctx.in_flight -= 1;
        shared.work.notify_all();
        if !matches!(ctx.outcome, Outcome::Running) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn already_solved_returns_no_moves() {
        let goal = Goal::standard(3);
        let mut solver = AstarParallel::new();
        let steps = solver.solve(&Board::solved(3), &goal).unwrap();
        assert!(steps.is_empty());
        assert_eq!(solver.last_stats().expanded, 0);
    }

    #[test]
    fn single_swap_needs_a_single_move() {
        let goal = Goal::standard(3);
        let start = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        let mut solver = AstarParallel::new();
        let steps = solver.solve(&start, &goal).unwrap();
        assert_eq!(steps, vec![Move::Right]);
    }

    #[test]
    fn replaying_the_answer_reaches_the_target() {
        let goal = Goal::standard(3);
        let mut rng = StdRng::seed_from_u64(42);
        let mut solver = AstarParallel::new();
        for _ in 0..10 {
            let start = Board::shuffled(3, &mut rng);
            let steps = solver.solve(&start, &goal).expect("scrambles are solvable");
            let end = steps
                .iter()
                .fold(start, |b, &mv| b.apply(mv).expect("legal move"));
            assert_eq!(goal.distance_from(&end), 0);
        }
    }

    #[test]
    fn more_workers_still_reach_the_target() {
        let goal = Goal::standard(3);
        let mut rng = StdRng::seed_from_u64(7);
        let mut solver = AstarParallel::with_config(SearchConfig { workers: 4 });
        for _ in 0..5 {
            let start = Board::shuffled(3, &mut rng);
            let steps = solver.solve(&start, &goal).expect("scrambles are solvable");
            let end = steps
                .iter()
                .fold(start, |b, &mv| b.apply(mv).expect("legal move"));
            assert_eq!(goal.distance_from(&end), 0);
        }
    }

    #[test]
    fn unsolvable_scramble_exhausts_instead_of_hanging() {
        let goal = Goal::standard(2);
        let start = Board::from_tiles(2, vec![2, 1, 3, 0]).unwrap();
        let mut solver = AstarParallel::new();
        assert_eq!(solver.solve(&start, &goal), Err(SolveError::Exhausted));
        assert_eq!(solver.last_stats().expanded, 12);
    }

    #[test]
    fn malformed_target_is_fatal_before_any_worker_spawns() {
        let goal = Goal::from_positions(2, [(1, (0, 0)), (2, (0, 1))]);
        let mut solver = AstarParallel::new();
        assert_eq!(
            solver.solve(&Board::solved(2), &goal),
            Err(SolveError::MalformedTarget { tile: 3 })
        );
    }

    #[test]
    fn worker_count_is_clamped_to_at_least_one() {
        let goal = Goal::standard(3);
        let start = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
        let mut solver = AstarParallel::with_config(SearchConfig { workers: 0 });
        assert_eq!(solver.solve(&start, &goal).unwrap(), vec![Move::Right]);
    }
}
