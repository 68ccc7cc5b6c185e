//! Count the action tree below a position, ply by ply.
//!
//! - Every path is a distinct node (transpositions are not merged)
//! - Unique positions are counted per ply by canonical board
//! - Terminal nodes (side to move trapped) are counted but not expanded

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use lgame_core::{Board, GameState, Player};
use lgame_solver::stats::{format_bytes, get_memory_usage};

/// Count nodes and unique positions per ply
#[derive(Parser, Debug)]
#[command(name = "perft")]
#[command(about = "Count the L-Game action tree", long_about = None)]
struct Args {
    /// Plies to expand
    #[arg(short, long, default_value_t = 3)]
    depth: usize,

    /// Start position as "x1 y1 O1 a b c d x2 y2 O2" (defaults to the opening)
    #[arg(long)]
    state: Option<String>,

    /// Side to move (1 or 2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    turn: u8,

    /// Seconds between progress lines
    #[arg(long, default_value_t = 5)]
    log_interval: u64,
}

/// Stack frame for iterative DFS.
struct Frame {
    /// Children not yet visited
    children: Vec<GameState>,
    /// Index of next child to explore
    child_idx: usize,
}

/// Per-ply totals.
#[derive(Default, Clone)]
struct PlyCount {
    nodes: u64,
    terminals: u64,
    unique: HashSet<Board>,
}

struct Progress {
    start_time: Instant,
    last_log_time: Instant,
    last_log_nodes: u64,
}

impl Progress {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            last_log_nodes: 0,
        }
    }

    fn log(&mut self, plies: &[PlyCount], stack_len: usize) {
        let nodes: u64 = plies.iter().map(|p| p.nodes).sum();
        let elapsed_total = self.start_time.elapsed().as_secs();
        let elapsed_since_log = self.last_log_time.elapsed().as_secs_f64();
        let rate = if elapsed_since_log > 0.0 {
            (nodes - self.last_log_nodes) as f64 / elapsed_since_log
        } else {
            0.0
        };
        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] nodes={} rate={:.0}/s stack={}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            nodes,
            rate,
            stack_len,
            mem_str,
        );

        self.last_log_time = Instant::now();
        self.last_log_nodes = nodes;
    }
}

fn children(state: &GameState) -> Vec<GameState> {
    state.successors().into_iter().map(|(_, next)| next).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let turn = Player::from_bits(args.turn).unwrap_or(Player::One);
    let root = match &args.state {
        Some(text) => GameState::from_notation(text, turn)?,
        None => GameState::opening().with_turn(turn),
    };

    println!("L-Game Tree Counter");
    println!("===================");
    println!("Root: {} (player {} to move)", root.notation(), root.turn());
    println!("Depth: {}", args.depth);
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut plies = vec![PlyCount::default(); args.depth + 1];
    plies[0].nodes = 1;
    plies[0].unique.insert(root.board().canonical());
    if root.is_terminal() {
        plies[0].terminals = 1;
    }

    let mut stack: Vec<Frame> = Vec::new();
    if args.depth > 0 {
        stack.push(Frame {
            children: children(&root),
            child_idx: 0,
        });
    }

    let mut progress = Progress::new();

    while let Some(frame) = stack.last_mut() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        if frame.child_idx < frame.children.len() {
            let child = frame.children[frame.child_idx];
            frame.child_idx += 1;

            let ply = stack.len();
            let count = &mut plies[ply];
            count.nodes += 1;
            count.unique.insert(child.board().canonical());

            if ply < args.depth {
                let grandchildren = children(&child);
                if grandchildren.is_empty() {
                    count.terminals += 1;
                } else {
                    stack.push(Frame {
                        children: grandchildren,
                        child_idx: 0,
                    });
                }
            } else if child.is_terminal() {
                count.terminals += 1;
            }
        } else {
            stack.pop();
        }

        if progress.last_log_time.elapsed().as_secs() >= args.log_interval {
            progress.log(&plies, stack.len());
        }
    }

    let complete = running.load(Ordering::SeqCst);
    println!();
    println!("{:>4} {:>14} {:>10} {:>10}", "ply", "nodes", "unique", "terminal");
    for (ply, count) in plies.iter().enumerate() {
        println!(
            "{:>4} {:>14} {:>10} {:>10}",
            ply,
            count.nodes,
            count.unique.len(),
            count.terminals
        );
    }
    println!();
    if !complete {
        println!("Interrupted; counts are partial.");
    }
    println!("Time: {:.2}s", progress.start_time.elapsed().as_secs_f64());
    Ok(())
}
