use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use npuzzle::astar::{Astar, AstarParallel, SearchConfig, SearchStats, SolveError};
use npuzzle::board::{Board, Goal, Move, MAX_SIDE, MIN_SIDE};

#[derive(Debug, Parser)]
#[command(name = "npuzzle", about = "Sliding puzzle with a concurrent A* auto-solver")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Cmd>,

    /// Grid side length (side x side board)
    #[arg(long, default_value_t = 3)]
    size: usize,

    /// Worker threads for the parallel solver
    #[arg(long, default_value_t = 2)]
    workers: usize,

    /// Use the single-threaded solver (optimal paths, no worker races)
    #[arg(long)]
    sequential: bool,

    /// RNG seed for a reproducible scramble
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between replayed moves after auto-solve
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Generate and solve many scrambles, reporting aggregate stats
    Batch {
        /// Number of scrambles to solve
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Grid side length
        #[arg(long, default_value_t = 3)]
        size: usize,
        /// Worker threads per solve
        #[arg(long, default_value_t = 2)]
        workers: usize,
        /// Use the single-threaded solver
        #[arg(long)]
        sequential: bool,
        /// Base RNG seed for reproducible scrambles
        #[arg(long)]
        seed: Option<u64>,
        /// Suppress the progress bar
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.cmd {
        Some(Cmd::Batch {
            count,
            size,
            workers,
            sequential,
            seed,
            quiet,
        }) => run_batch(count, size, workers, sequential, seed, quiet),
        None => run_interactive(&args),
    }
}

fn run_interactive(args: &Args) -> Result<()> {
    anyhow::ensure!(
        (MIN_SIDE..=MAX_SIDE).contains(&args.size),
        "--size must be within {MIN_SIDE}..={MAX_SIDE}"
    );
    let goal = Goal::standard(args.size);
    let mut board = match args.seed {
        Some(seed) => Board::shuffled(args.size, &mut StdRng::seed_from_u64(seed)),
        None => Board::shuffled(args.size, &mut rand::thread_rng()),
    };
    println!("{board}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("move [u/d/l/r], `solve`, or `quit`: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let input = line?.trim().to_lowercase();
        match input.as_str() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "solve" | "auto solve" => {
                auto_solve(&mut board, &goal, args)?;
                break;
            }
            other => match other.parse::<Move>() {
                Ok(mv) => match board.apply(mv) {
                    Some(next) => {
                        board = next;
                        println!("{board}");
                        if goal.distance_from(&board) == 0 {
                            println!("Congratulations, you have completed the game");
                            break;
                        }
                    }
                    None => println!("the blank cannot move {mv} from here"),
                },
                Err(_) => println!("invalid action, try again"),
            },
        }
    }
    Ok(())
}

fn auto_solve(board: &mut Board, goal: &Goal, args: &Args) -> Result<()> {
    println!("running auto solve");
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {elapsed_precise} | searching")?
            .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let started = Instant::now();
    let (outcome, stats) = solve_once(board, goal, args.workers, args.sequential);
    pb.finish_and_clear();

    let steps = match outcome {
        Ok(steps) => steps,
        Err(SolveError::Exhausted) => {
            println!("No path found!");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "found {} steps in {:.2?} ({} nodes expanded), starting steps",
        steps.len(),
        started.elapsed(),
        stats.expanded
    );
    for mv in steps {
        thread::sleep(Duration::from_millis(args.delay_ms));
        println!("move = {mv}");
        *board = board.apply(mv).expect("solver returned an illegal move");
        println!("{board}");
    }
    if goal.distance_from(board) == 0 {
        println!("Congratulations, you have completed the game");
    }
    Ok(())
}

fn solve_once(
    board: &Board,
    goal: &Goal,
    workers: usize,
    sequential: bool,
) -> (Result<Vec<Move>, SolveError>, SearchStats) {
    if sequential {
        let mut solver = Astar::new();
        let outcome = solver.solve(board, goal);
        (outcome, solver.last_stats())
    } else {
        let mut solver = AstarParallel::with_config(SearchConfig { workers });
        let outcome = solver.solve(board, goal);
        (outcome, solver.last_stats())
    }
}

fn run_batch(
    count: usize,
    size: usize,
    workers: usize,
    sequential: bool,
    seed: Option<u64>,
    quiet: bool,
) -> Result<()> {
    anyhow::ensure!(
        (MIN_SIDE..=MAX_SIDE).contains(&size),
        "--size must be within {MIN_SIDE}..={MAX_SIDE}"
    );
    let goal = Goal::standard(size);
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let started = Instant::now();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(count as u64)
    };
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} solving scrambles",
        )?
        .progress_chars("##-"),
    );

    let results: Vec<(usize, SearchStats)> = (0..count)
        .into_par_iter()
        .map(|i| -> Result<(usize, SearchStats)> {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let board = Board::shuffled(size, &mut rng);
            let (outcome, stats) = solve_once(&board, &goal, workers, sequential);
            let steps = outcome?;
            pb.inc(1);
            Ok((steps.len(), stats))
        })
        .collect::<Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let solved = results.len();
    let total_steps: usize = results.iter().map(|(steps, _)| steps).sum();
    let max_steps = results.iter().map(|(steps, _)| *steps).max().unwrap_or(0);
    let total_expanded: u64 = results.iter().map(|(_, s)| s.expanded).sum();
    let max_expanded = results.iter().map(|(_, s)| s.expanded).max().unwrap_or(0);
    println!(
        "solved {solved} {size}x{size} scrambles in {:.2?} (seed {base_seed})",
        started.elapsed()
    );
    println!(
        "steps: avg {:.1}, max {max_steps}",
        total_steps as f64 / solved.max(1) as f64
    );
    println!(
        "nodes expanded: avg {:.1}, max {max_expanded}",
        total_expanded as f64 / solved.max(1) as f64
    );
    Ok(())
}
