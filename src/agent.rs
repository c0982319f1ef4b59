//! Move sources for a game of tic-tac-toe, and a driver that plays them
//! against each other.

use std::io::{self, BufRead, Stdout, Write};

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::search::Search;
use crate::tic_tac_toe::{Line, Player, Square, TicTacToe};

pub trait Agent {
    fn name(&self) -> &str;

    /// Pick a legal move on a board that is still in play.
    fn select_move(&mut self, board: &TicTacToe) -> Result<Square>;
}

pub struct MinimaxAgent {
    search: Search,
}

impl MinimaxAgent {
    pub fn new(search: Search) -> Self {
        Self { search }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        "minimax"
    }

    fn select_move(&mut self, board: &TicTacToe) -> Result<Square> {
        let decision = self
            .search
            .decide(board)
            .ok_or_else(|| anyhow!("no move available: the game is over"))?;
        info!(
            "minimax picked {} (value {}, {} nodes)",
            decision.action, decision.value, decision.nodes
        );
        Ok(decision.action)
    }
}

pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn select_move(&mut self, board: &TicTacToe) -> Result<Square> {
        board
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow!("no move available: the game is over"))
    }
}

/// A source of input lines.
pub trait ReadLine {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl<R: BufRead> ReadLine for R {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Standard input, locked only while a line is read, so two human agents can
/// share one terminal.
pub struct SharedStdin;

impl ReadLine for SharedStdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        io::stdin().read_line(buf)
    }
}

/// Reads moves from a line-oriented input, re-prompting until it gets a legal one.
pub struct HumanAgent<R, W> {
    input: R,
    output: W,
}

impl HumanAgent<SharedStdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(SharedStdin, io::stdout())
    }
}

impl<R: ReadLine, W: Write> HumanAgent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: ReadLine, W: Write> Agent for HumanAgent<R, W> {
    fn name(&self) -> &str {
        "human"
    }

    fn select_move(&mut self, board: &TicTacToe) -> Result<Square> {
        let legal = board.legal_moves();
        if legal.is_empty() {
            bail!("no move available: the game is over");
        }
        loop {
            write!(
                self.output,
                "{} to move, enter `row col` or a square 0-8: ",
                board.to_move()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("input closed before a move was entered");
            }
            match parse_square(&line) {
                Ok(square) if legal.contains(&square) => return Ok(square),
                Ok(square) => writeln!(self.output, "square {} is taken", square)?,
                Err(err) => writeln!(self.output, "{:#}", err)?,
            }
        }
    }
}

/// Accepts either a flat index (`4`) or a row and column (`1 1`).
pub fn parse_square(input: &str) -> Result<Square> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let square = match parts.as_slice() {
        [index] => {
            let index: usize = index
                .parse()
                .with_context(|| format!("'{}' is not a square number", index))?;
            Square::new(index)?
        }
        [row, col] => {
            let row: usize = row
                .parse()
                .with_context(|| format!("'{}' is not a row number", row))?;
            let col: usize = col
                .parse()
                .with_context(|| format!("'{}' is not a column number", col))?;
            Square::at(row, col)?
        }
        _ => bail!("expected `row col` or a single square number"),
    };
    Ok(square)
}

/// How a game went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub moves: Vec<Square>,
    pub winner: Option<Player>,
    pub winning_line: Option<Line>,
    pub board: TicTacToe,
}

/// Plays `board` out to the end, asking `x` or `o` for each move.
/// `on_move` sees the board after every move.
pub fn play_game(
    mut board: TicTacToe,
    x: &mut dyn Agent,
    o: &mut dyn Agent,
    mut on_move: impl FnMut(&TicTacToe),
) -> Result<GameRecord> {
    let mut moves = Vec::new();
    while !board.is_terminal() {
        let mover = board.to_move();
        let agent: &mut dyn Agent = match mover {
            Player::X => &mut *x,
            Player::O => &mut *o,
        };
        let square = agent.select_move(&board)?;
        board
            .apply(square)
            .with_context(|| format!("{} agent played an illegal move", agent.name()))?;
        info!("{} ({}) plays {}", mover, agent.name(), square);
        moves.push(square);
        on_move(&board);
    }

    Ok(GameRecord {
        moves,
        winner: board.winner(),
        winning_line: board.winning_line(),
        board,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sq(index: usize) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("4\n").unwrap(), sq(4));
        assert_eq!(parse_square(" 2 1 ").unwrap(), sq(7));
        assert!(parse_square("9").is_err());
        assert!(parse_square("1 3").is_err());
        assert!(parse_square("a b").is_err());
        assert!(parse_square("").is_err());
        assert!(parse_square("1 1 1").is_err());
    }

    #[test]
    fn test_human_reprompts_until_legal() {
        let board: TicTacToe = "X.. ... ...".parse().unwrap();
        let input = Cursor::new("nonsense\n0 0\n12\n1 1\n");
        let mut output = Vec::new();
        let square = HumanAgent::new(input, &mut output)
            .select_move(&board)
            .unwrap();
        assert_eq!(square, sq(4));

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("O to move").count(), 4);
        assert!(output.contains("is taken"));
    }

    #[test]
    fn test_human_reprompts_after_huge_coordinates() {
        let input = Cursor::new("18446744073709551615 0\n0 18446744073709551615\n4\n");
        let mut output = Vec::new();
        let square = HumanAgent::new(input, &mut output)
            .select_move(&TicTacToe::new())
            .unwrap();
        assert_eq!(square, sq(4));

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("X to move").count(), 3);
        assert_eq!(output.matches("off the board").count(), 2);
    }

    #[test]
    fn test_human_eof_is_an_error() {
        let board = TicTacToe::new();
        let mut agent = HumanAgent::new(Cursor::new(""), Vec::new());
        assert!(agent.select_move(&board).is_err());
    }

    #[test]
    fn test_agents_refuse_finished_board() {
        let board: TicTacToe = "XXX OO. ...".parse().unwrap();
        assert!(MinimaxAgent::new(Search::new()).select_move(&board).is_err());
        assert!(RandomAgent::new(Some(1)).select_move(&board).is_err());
    }

    #[test]
    fn test_random_agent_is_legal_and_seeded() {
        let board: TicTacToe = "XO. .X. ..O".parse().unwrap();
        let mut a = RandomAgent::new(Some(9));
        let mut b = RandomAgent::new(Some(9));
        for _ in 0..20 {
            let square = a.select_move(&board).unwrap();
            assert!(board.legal_moves().contains(&square));
            assert_eq!(b.select_move(&board).unwrap(), square);
        }
    }

    #[test]
    fn test_minimax_self_play_draws() {
        let mut x = MinimaxAgent::new(Search::new());
        let mut o = MinimaxAgent::new(Search::new());
        let mut seen = 0;
        let record = play_game(TicTacToe::new(), &mut x, &mut o, |_| seen += 1).unwrap();
        assert_eq!(record.winner, None);
        assert_eq!(record.winning_line, None);
        assert_eq!(record.moves.len(), 9);
        assert_eq!(seen, 9);
        assert!(record.board.is_full());
    }

    #[test]
    fn test_minimax_never_loses_to_random() {
        for seed in 0..10 {
            let mut minimax = MinimaxAgent::new(Search::new());
            let mut random = RandomAgent::new(Some(seed));
            let record = play_game(TicTacToe::new(), &mut minimax, &mut random, |_| {}).unwrap();
            assert_ne!(record.winner, Some(Player::O));

            let mut minimax = MinimaxAgent::new(Search::new());
            let mut random = RandomAgent::new(Some(seed));
            let record = play_game(TicTacToe::new(), &mut random, &mut minimax, |_| {}).unwrap();
            assert_ne!(record.winner, Some(Player::X));
        }
    }

    #[test]
    fn test_game_record_keeps_winning_line() {
        let board: TicTacToe = "XX. OO. ...".parse().unwrap();
        let mut x = MinimaxAgent::new(Search::new());
        let mut o = MinimaxAgent::new(Search::new());
        let record = play_game(board, &mut x, &mut o, |_| {}).unwrap();
        assert_eq!(record.moves, vec![sq(2)]);
        assert_eq!(record.winner, Some(Player::X));
        assert_eq!(record.winning_line.map(|line| line.start()), Some(sq(0)));
    }
}
