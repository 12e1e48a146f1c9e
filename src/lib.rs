//! npuzzle: a sliding-puzzle engine + concurrent A* solver
//!
//! This crate provides:
//! - A `Board` type for square N-tile grids with ergonomic methods
//!   (`apply`, `legal_moves`, `shuffled`, ...) and a `Goal` target mapping
//!   with the Manhattan-distance heuristic (`board` module)
//! - An A* solver (`astar` module) with single-threaded and parallel
//!   variants sharing one frontier/arena core
//!
//! Quick start:
//! ```
//! use npuzzle::astar::AstarParallel;
//! use npuzzle::board::{Board, Goal};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let goal = Goal::standard(3);
//!
//! // Deterministic scramble with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let start = Board::shuffled(3, &mut rng);
//!
//! let mut solver = AstarParallel::new();
//! let steps = solver.solve(&start, &goal).expect("3x3 scrambles are solvable");
//!
//! // Replaying the answer restores the target layout
//! let end = steps.iter().fold(start, |b, &mv| b.apply(mv).unwrap());
//! assert_eq!(goal.distance_from(&end), 0);
//! ```
//!
//! Note: the parallel solver's answer is a valid solution but not always a
//! shortest one; workers race on the shared frontier and the first goal
//! reported wins. Use `astar::Astar` when optimality matters.
//!
pub mod astar;
pub mod board;
