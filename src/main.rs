use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use ttt_search::traversal::{self, Graph, SearchOutcome, VisitOrder};
use ttt_search::{
    play_game, Agent, Formulation, HumanAgent, MinimaxAgent, Player, RandomAgent, Scoring, Search,
    TicTacToe,
};

#[derive(Parser)]
#[command(name = "ttt-search", about = "Tic-tac-toe against a minimax opponent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a game between two agents
    Play(PlayArgs),
    /// Print the value of every move on a board, e.g. "XX./OO./..."
    Solve(SolveArgs),
    /// Show depth-first visit orders on a small example graph
    Dfs,
}

#[derive(Args)]
struct EngineArgs {
    #[arg(long, value_enum, default_value_t = Scoring::DepthWeighted)]
    scoring: Scoring,

    #[arg(long, value_enum, default_value_t = Formulation::Merged)]
    formulation: Formulation,

    /// Search every node with the full window
    #[arg(long)]
    no_pruning: bool,
}

impl EngineArgs {
    fn search(&self) -> Search {
        Search::new()
            .scoring(self.scoring)
            .formulation(self.formulation)
            .pruning(!self.no_pruning)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AgentKind {
    Human,
    Minimax,
    Random,
}

#[derive(Args)]
struct PlayArgs {
    /// Who plays X (moves first)
    #[arg(short = 'x', long = "x-agent", value_enum, default_value_t = AgentKind::Human)]
    x: AgentKind,

    /// Who plays O
    #[arg(short = 'o', long = "o-agent", value_enum, default_value_t = AgentKind::Minimax)]
    o: AgentKind,

    /// Seed for the random agent
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args)]
struct SolveArgs {
    board: String,

    /// Override the player to move, otherwise read from the mark counts
    #[arg(long)]
    to_move: Option<Player>,

    #[command(flatten)]
    engine: EngineArgs,
}

fn make_agent(kind: AgentKind, args: &PlayArgs, seed: Option<u64>) -> Box<dyn Agent> {
    match kind {
        AgentKind::Human => Box::new(HumanAgent::stdio()),
        AgentKind::Minimax => Box::new(MinimaxAgent::new(args.engine.search())),
        AgentKind::Random => Box::new(RandomAgent::new(seed)),
    }
}

/// Per-side seeds, so two random agents don't mirror each other.
fn side_seeds(seed: Option<u64>) -> (Option<u64>, Option<u64>) {
    (seed, seed.map(|seed| seed.wrapping_add(1)))
}

fn play(args: PlayArgs) -> Result<()> {
    let (x_seed, o_seed) = side_seeds(args.seed);
    let mut x = make_agent(args.x, &args, x_seed);
    let mut o = make_agent(args.o, &args, o_seed);

    let board = TicTacToe::new();
    println!("{}", board);
    let record = play_game(board, x.as_mut(), o.as_mut(), |board| println!("{}", board))?;

    match (record.winner, record.winning_line) {
        (Some(winner), Some(line)) => println!(
            "Player {} wins! ({} to {})",
            winner,
            line.start().index(),
            line.end().index()
        ),
        _ => println!("Draw!"),
    }
    Ok(())
}

fn solve(args: SolveArgs) -> Result<()> {
    let mut board: TicTacToe = args
        .board
        .parse()
        .with_context(|| format!("could not read board '{}'", args.board))?;
    if let Some(player) = args.to_move {
        board = board.with_to_move(player);
    }
    println!("{}", board);

    let mut search = args.engine.search();
    let Some(decision) = search.decide(&board) else {
        match board.winner() {
            Some(winner) => println!("Game over: {} has won", winner),
            None => println!("Game over: draw"),
        }
        return Ok(());
    };

    for square in board.legal_moves() {
        let next = board.result(square)?;
        let value = search.evaluate(&next);
        println!("  {:<10} value {:>3}", square.to_string(), value);
    }
    println!(
        "{} plays {} (value {}, {} nodes)",
        board.to_move(),
        decision.action,
        decision.value,
        decision.nodes
    );
    Ok(())
}

fn dfs() {
    let graph = Graph::new()
        .with_children("S", ["A", "B"])
        .with_children("A", ["C", "D"])
        .with_children("B", ["E", "F"]);
    let show = |nodes: Vec<&str>| nodes.join(" ");

    println!("graph: S -> [A, B], A -> [C, D], B -> [E, F]");
    println!(
        "recursive:            {}",
        show(traversal::dfs_recursive(&graph, &"S", VisitOrder::Expansion))
    );
    println!(
        "stack, reversed push: {}",
        show(traversal::dfs_stack(&graph, &"S", VisitOrder::Expansion))
    );
    println!(
        "stack, naive push:    {}",
        show(traversal::dfs_stack_naive(&graph, &"S"))
    );
    for limit in 0..3 {
        let outcome =
            traversal::depth_limited_search(&graph, &"S", &"F", limit, VisitOrder::Expansion);
        let shown = match outcome {
            SearchOutcome::Found(path) => format!("found {}", show(path)),
            SearchOutcome::Cutoff => "cutoff".to_string(),
            SearchOutcome::Failure => "failure".to_string(),
        };
        println!("depth-limited search for F, limit {}: {}", limit, shown);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => {
            info!("starting a game: X is {:?}, O is {:?}", args.x, args.o);
            play(args)
        }
        Command::Solve(args) => solve(args),
        Command::Dfs => {
            dfs();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_seeds_differ() {
        assert_eq!(side_seeds(None), (None, None));
        assert_eq!(side_seeds(Some(7)), (Some(7), Some(8)));
        assert_eq!(side_seeds(Some(u64::MAX)), (Some(u64::MAX), Some(0)));
    }
}
