//! Tic-tac-toe with an exhaustive minimax / alpha-beta opponent, plus a few
//! depth-first traversal utilities.

pub mod agent;
pub mod error;
pub mod game;
pub mod search;
pub mod tic_tac_toe;
pub mod traversal;

pub use agent::{play_game, Agent, GameRecord, HumanAgent, MinimaxAgent, RandomAgent};
pub use error::Error;
pub use game::Game;
pub use search::{Decision, Evaluation, Formulation, Scoring, Search};
pub use tic_tac_toe::{Line, Outcome, Player, Spot, Square, TicTacToe};
