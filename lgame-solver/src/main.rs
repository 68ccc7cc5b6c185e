//! L-Game command line.
//!
//! Position inspection and move listing, plus the search agent for a single
//! decision or a full AI-versus-AI game.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use lgame_core::{evaluate, Action, GameState, LGameError, Player, Score};
use lgame_solver::{Agent, Decision, SearchConfig};

#[derive(Parser)]
#[command(name = "lgame")]
#[command(about = "Rules engine and minimax agent for the L game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a position.
    Show {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// List the legal moves for the side to move.
    Moves {
        #[command(flatten)]
        position: PositionArgs,

        /// Print JSON instead of one move per line.
        #[arg(long)]
        json: bool,
    },

    /// Mobility evaluation from the mover's side.
    Eval {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Search for the best move.
    Best {
        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Print the decision as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Let the agent play both sides.
    Selfplay {
        #[command(flatten)]
        position: PositionArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Stop after this many plies.
        #[arg(long, default_value_t = 100)]
        max_plies: usize,
    },
}

#[derive(Args)]
struct PositionArgs {
    /// Position as "x1 y1 O1 a b c d x2 y2 O2" (1-indexed). Defaults to the opening.
    #[arg(long)]
    state: Option<String>,

    /// Side to move.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    turn: u8,
}

impl PositionArgs {
    fn resolve(&self) -> Result<GameState, LGameError> {
        let turn = Player::from_bits(self.turn).unwrap_or(Player::One);
        match &self.state {
            Some(text) => GameState::from_notation(text, turn),
            None => Ok(GameState::opening().with_turn(turn)),
        }
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Lookahead in plies.
    #[arg(short, long, default_value_t = 2)]
    depth: u32,

    /// Seed for tie-breaking.
    #[arg(long)]
    seed: Option<u64>,

    /// Always take the first best move instead of sampling among ties.
    #[arg(long)]
    deterministic: bool,

    /// Print search progress every N seconds.
    #[arg(long)]
    log_interval: Option<u64>,

    /// Print search statistics after each decision.
    #[arg(short, long)]
    verbose: bool,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            seed: self.seed,
            randomize_ties: !self.deterministic,
            log_interval_secs: self.log_interval,
        }
    }
}

#[derive(Serialize)]
struct MoveEntry {
    notation: String,
    action: Action,
}

#[derive(Serialize)]
struct MovesReport {
    state: String,
    turn: Player,
    count: usize,
    moves: Vec<MoveEntry>,
}

#[derive(Serialize)]
struct DecisionReport<'a> {
    state: String,
    turn: Player,
    config: &'a SearchConfig,
    notation: Option<String>,
    decision: Option<Decision>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { position } => {
            let state = position.resolve()?;
            show(&state);
        }
        Commands::Moves { position, json } => {
            let state = position.resolve()?;
            moves(&state, json)?;
        }
        Commands::Eval { position } => {
            let state = position.resolve()?;
            let opponent = state.with_turn(state.turn().opponent());
            println!("Side to move: player {}", state.turn());
            println!("Mover moves: {}", state.legal_action_count());
            println!("Opponent moves: {}", opponent.legal_action_count());
            println!("Evaluation: {}", evaluate(&state));
        }
        Commands::Best {
            position,
            search,
            json,
        } => {
            let state = position.resolve()?;
            best(&state, &search, json)?;
        }
        Commands::Selfplay {
            position,
            search,
            max_plies,
        } => {
            let state = position.resolve()?;
            selfplay(state, &search, max_plies)?;
        }
    }

    Ok(())
}

fn show(state: &GameState) {
    println!("{}", state.board());
    println!("State: {}", state.notation());
    println!("To move: player {}", state.turn());
}

fn moves(state: &GameState, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let actions = state.legal_actions();
    if json {
        let report = MovesReport {
            state: state.notation(),
            turn: state.turn(),
            count: actions.len(),
            moves: actions
                .into_iter()
                .map(|action| MoveEntry {
                    notation: action.to_string(),
                    action,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for action in &actions {
            println!("{}", action);
        }
        println!("{} legal moves for player {}", actions.len(), state.turn());
    }
    Ok(())
}

fn best(state: &GameState, search: &SearchArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut agent = Agent::new(search.config())?;
    let start = Instant::now();
    let decision = agent.choose(state);
    let elapsed = start.elapsed();

    if json {
        let report = DecisionReport {
            state: state.notation(),
            turn: state.turn(),
            config: agent.config(),
            notation: decision.map(|d| d.action.to_string()),
            decision,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match decision {
            Some(d) => {
                println!("Best move: {}", d.action);
                println!("Score: {} ({:?}, {} tied)", d.score, d.source, d.tied);
            }
            None => println!(
                "Player {} has no legal move; player {} wins.",
                state.turn(),
                state.turn().opponent()
            ),
        }
        println!("Time: {:.3}s", elapsed.as_secs_f64());
    }

    if search.verbose {
        println!();
        agent.engine().stats.print_summary(agent.engine().unique_positions());
    }
    Ok(())
}

fn selfplay(
    mut state: GameState,
    search: &SearchArgs,
    max_plies: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut agent = Agent::new(search.config())?;

    // Finish the current ply, then stop
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, stopping after this move...");
        r.store(false, Ordering::SeqCst);
    })?;

    println!("L-Game self-play");
    println!("================");
    println!("Depth: {}  Max plies: {}", search.depth, max_plies);
    println!();
    show(&state);

    let start = Instant::now();
    let mut plies = 0;
    while plies < max_plies && running.load(Ordering::SeqCst) {
        let Some(decision) = agent.choose(&state) else {
            break;
        };
        plies += 1;
        println!(
            "\nPly {}: player {} plays {}  (score {}, {:?})",
            plies,
            state.turn(),
            decision.action,
            decision.score,
            decision.source
        );
        if search.verbose {
            agent.engine().stats.print_summary(agent.engine().unique_positions());
        }
        state = state.play(&decision.action)?;
        println!("{}", state.board());
    }

    println!("\n================");
    match state.winner() {
        Some(winner) => println!("Player {} wins after {} plies.", winner, plies),
        None if !running.load(Ordering::SeqCst) => println!("Stopped after {} plies.", plies),
        None => println!("No winner after {} plies.", plies),
    }
    println!("Final evaluation for player {}: {}", state.turn(), score_label(evaluate(&state)));
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn score_label(score: Score) -> String {
    match score {
        Score::NegInfinity => "lost".to_string(),
        Score::Infinity => "won".to_string(),
        Score::Finite(v) => v.to_string(),
    }
}
