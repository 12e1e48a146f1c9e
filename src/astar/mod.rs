//! A* search for the sliding puzzle (single-threaded and parallel).
//!
//! This module provides two solver implementations:
//! - [`Astar`]: single-threaded best-first search. Expands nodes in strict
//!   non-decreasing f order, so with the admissible, consistent Manhattan
//!   heuristic its paths are optimal.
//! - [`AstarParallel`]: a fixed pool of worker threads racing on one shared
//!   frontier. Workers pop concurrently, so global expansion order is not
//!   strictly f-ordered and the first goal reported wins; the returned path
//!   is a solution but can be slightly longer than optimal when near-ties
//!   race.
//!
//! Both variants share the arena/frontier/closed-set machinery and the same
//! public surface.
//!
//! Quick start
//! ```
//! use npuzzle::astar::Astar;
//! use npuzzle::board::{Board, Goal, Move};
//!
//! let goal = Goal::standard(3);
//! // the blank swapped with the tile to its left: one move fixes it
//! let start = Board::from_tiles(3, vec![1, 2, 3, 4, 5, 6, 7, 0, 8]).unwrap();
//!
//! let mut solver = Astar::new();
//! let steps = solver.solve(&start, &goal).unwrap();
//! assert_eq!(steps, vec![Move::Right]);
//! ```

mod frontier;
mod node;
mod search_par;
mod search_seq;

pub use search_par::AstarParallel;
pub use search_seq::Astar;

use thiserror::Error;

use crate::board::{Board, Goal, Move};

use frontier::{ClosedSet, Frontier};
use node::{NodeArena, NodeId, SearchNode};

/// Configurable knobs for the parallel solver. Defaults match the shipped
/// behavior.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Worker threads sharing the frontier (minimum 1).
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

/// Why a solve call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The target mapping has no goal position for a tile on the board.
    #[error("target mapping has no goal position for tile {tile}")]
    MalformedTarget { tile: u8 },
    /// Board and goal describe different grid sizes.
    #[error("board side {board} does not match goal side {goal}")]
    SizeMismatch { board: usize, goal: usize },
    /// Every reachable configuration was expanded without finding the
    /// target.
    #[error("search frontier exhausted without reaching the target")]
    Exhausted,
}

/// Counters from a single solve call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    /// Nodes popped from the frontier and expanded.
    pub expanded: u64,
    /// Nodes created and inserted into the frontier.
    pub generated: u64,
    /// Open nodes relinked to a cheaper parent.
    pub relinked: u64,
    /// Largest frontier size observed.
    pub peak_frontier: usize,
}

/// Reject board/goal pairs the engine cannot search.
///
/// Fatal and immediate: no thread is spawned and no node is expanded for a
/// malformed target.
fn validate(start: &Board, goal: &Goal) -> Result<(), SolveError> {
    if start.side() != goal.side() {
        return Err(SolveError::SizeMismatch {
            board: start.side(),
            goal: goal.side(),
        });
    }
    if let Some(tile) = goal.missing_tile(start) {
        return Err(SolveError::MalformedTarget { tile });
    }
    Ok(())
}

/// One search in progress: the node arena, the open frontier, and the
/// closed set, mutated together.
///
/// The parallel solver wraps this in a mutex; every mutation of the three
/// structures goes through these methods so a pop moves a key from open to
/// closed atomically with respect to the lock.
struct SearchCtx {
    arena: NodeArena,
    frontier: Frontier,
    closed: ClosedSet,
    stats: SearchStats,
}

impl SearchCtx {
    /// Seed a context with the start node (g = 0, h = heuristic(start)).
    fn new(start: &Board, goal: &Goal) -> SearchCtx {
        let mut ctx = SearchCtx {
            arena: NodeArena::default(),
            frontier: Frontier::default(),
            closed: ClosedSet::default(),
            stats: SearchStats::default(),
        };
        let h = goal.distance_from(start);
        let id = ctx.arena.insert(SearchNode {
            board: start.clone(),
            mv: None,
            g: 0,
            h,
            parent: None,
        });
        ctx.frontier.insert(start.key(), id, h);
        ctx
    }

    /// Pop the minimum-f node, moving its key from open to closed.
    fn pop(&mut self) -> Option<NodeId> {
        let id = self.frontier.pop_min()?;
        let (key, _) = self
            .frontier
            .take_open(self.arena.get(id).board.tiles())
            .expect("popped node missing from the open index");
        self.closed.insert(key);
        self.stats.expanded += 1;
        Some(id)
    }

    /// Fold one neighbor of `parent` into the search.
    ///
    /// Closed keys are skipped outright (a closed key is never reopened);
    /// unseen keys become new open nodes; open keys reached by a strictly
    /// cheaper path are relinked and repositioned in the frontier.
    fn integrate(&mut self, parent: NodeId, parent_g: u32, mv: Move, neighbor: Board, h: u32) {
        if self.closed.contains(neighbor.tiles()) {
            return;
        }
        let tentative = parent_g + 1;
        match self.frontier.get_open(neighbor.tiles()) {
            None => {
                let key = neighbor.key();
                let id = self.arena.insert(SearchNode {
                    board: neighbor,
                    mv: Some(mv),
                    g: tentative,
                    h,
                    parent: Some(parent),
                });
                self.frontier.insert(key, id, tentative + h);
                self.stats.generated += 1;
            }
            Some(id) => {
                let node = self.arena.get_mut(id);
                if tentative < node.g {
                    let old_f = node.f();
                    node.g = tentative;
                    node.mv = Some(mv);
                    node.parent = Some(parent);
                    let new_f = tentative + node.h;
                    self.frontier.reposition(id, old_f, new_f);
                    self.stats.relinked += 1;
                }
            }
        }
        self.stats.peak_frontier = self.stats.peak_frontier.max(self.frontier.len());
    }
}
