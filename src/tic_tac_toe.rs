use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::game::Game;
use crate::search::Scoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

impl FromStr for Player {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "x" | "X" => Ok(Player::X),
            "o" | "O" => Ok(Player::O),
            other => Err(Error::InvalidPlayer(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spot {
    Empty,
    Filled(Player),
}

/// A cell of the board, stored as a flat index: `row = index / 3`, `col = index % 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(index: usize) -> Result<Self> {
        if index < 9 {
            Ok(Square(index as u8))
        } else {
            Err(Error::OutOfRange { index })
        }
    }

    pub fn at(row: usize, col: usize) -> Result<Self> {
        if row < 3 && col < 3 {
            Ok(Square((row * 3 + col) as u8))
        } else {
            Err(Error::OutOfGrid { row, col })
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / 3
    }

    pub fn col(self) -> usize {
        self.index() % 3
    }

    fn all() -> impl Iterator<Item = Square> {
        (0..9u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}, {})", self.index(), self.row(), self.col())
    }
}

// Rows, then columns, then the two diagonals.
const LINES: [[u8; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Three in a row, kept for renderers that want to strike it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    squares: [Square; 3],
    player: Player,
}

impl Line {
    pub fn squares(&self) -> [Square; 3] {
        self.squares
    }

    pub fn start(&self) -> Square {
        self.squares[0]
    }

    pub fn end(&self) -> Square {
        self.squares[2]
    }

    pub fn player(&self) -> Player {
        self.player
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicTacToe {
    spots: [Spot; 9],
    to_move: Player,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            spots: [Spot::Empty; 9],
            to_move: Player::X,
        }
    }

    /// Overrides the player to move, for positions whose turn can't be read
    /// off the mark counts.
    pub fn with_to_move(mut self, player: Player) -> Self {
        self.to_move = player;
        self
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn cell(&self, square: Square) -> Spot {
        self.spots[square.index()]
    }

    pub fn count(&self, player: Player) -> usize {
        self.spots
            .iter()
            .filter(|&&spot| spot == Spot::Filled(player))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.spots.iter().filter(|&&spot| spot == Spot::Empty).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Empty squares in ascending index order, or none once someone has won.
    pub fn legal_moves(&self) -> Vec<Square> {
        if self.winner().is_some() {
            return Vec::new();
        }
        Square::all()
            .filter(|&square| self.cell(square) == Spot::Empty)
            .collect()
    }

    /// Place the mark of the player to move and pass the turn.
    pub fn apply(&mut self, square: Square) -> Result<()> {
        if self.winner().is_some() {
            return Err(Error::GameOver);
        }
        self.place(square, self.to_move)?;
        self.to_move = self.to_move.opponent();
        Ok(())
    }

    /// Place `player`'s mark without touching the turn.
    pub fn place(&mut self, square: Square, player: Player) -> Result<()> {
        match self.spots[square.index()] {
            Spot::Empty => {
                self.spots[square.index()] = Spot::Filled(player);
                Ok(())
            }
            Spot::Filled(_) => Err(Error::Occupied {
                index: square.index(),
            }),
        }
    }

    pub fn undo(&mut self, square: Square) {
        debug_assert!(
            matches!(self.spots[square.index()], Spot::Filled(_)),
            "undo of empty square {square}"
        );
        self.spots[square.index()] = Spot::Empty;
        self.to_move = self.to_move.opponent();
    }

    /// The board after `square` is played; `self` is left as it was.
    pub fn result(&self, square: Square) -> Result<Self> {
        let mut next = self.clone();
        next.apply(square)?;
        Ok(next)
    }

    pub fn winning_line(&self) -> Option<Line> {
        LINES.iter().find_map(|&[a, b, c]| {
            let Spot::Filled(player) = self.spots[a as usize] else {
                return None;
            };
            let owner = Spot::Filled(player);
            (self.spots[b as usize] == owner && self.spots[c as usize] == owner).then_some(Line {
                squares: [Square(a), Square(b), Square(c)],
                player,
            })
        })
    }

    pub fn winner(&self) -> Option<Player> {
        self.winning_line().map(|line| line.player())
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(player) => Some(Outcome::Win(player)),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }

    /// Score of a finished board from `perspective`'s side.
    pub fn utility(&self, perspective: Player, scoring: Scoring) -> Result<i32> {
        let value = scoring.terminal_value(self).ok_or(Error::NotTerminal)?;
        Ok(match perspective {
            Player::X => value,
            Player::O => -value,
        })
    }
}

impl Game for TicTacToe {
    type Action = Square;
    type Player = Player;

    fn apply(&mut self, action: Square) -> Result<()> {
        TicTacToe::apply(self, action)
    }

    fn undo(&mut self, action: Square) {
        TicTacToe::undo(self, action)
    }

    fn legal_moves(&self) -> Vec<Square> {
        TicTacToe::legal_moves(self)
    }

    fn to_move(&self) -> Player {
        self.to_move
    }

    fn winner(&self) -> Option<Player> {
        TicTacToe::winner(self)
    }

    fn is_terminal(&self) -> bool {
        TicTacToe::is_terminal(self)
    }

    fn empty_count(&self) -> usize {
        TicTacToe::empty_count(self)
    }

    fn maximizer() -> Player {
        Player::X
    }
}

impl FromStr for TicTacToe {
    type Err = Error;

    /// Parses nine cells of `X`, `O` and `.` (or `_`, `-`), ignoring
    /// whitespace, `|` and `/`. The player to move is derived from the counts.
    fn from_str(s: &str) -> Result<Self> {
        let mut spots = Vec::with_capacity(9);
        for character in s.chars() {
            let spot = match character {
                c if c.is_whitespace() || c == '|' || c == '/' => continue,
                'X' | 'x' => Spot::Filled(Player::X),
                'O' | 'o' => Spot::Filled(Player::O),
                '.' | '_' | '-' => Spot::Empty,
                character => {
                    return Err(Error::InvalidCellCharacter {
                        character,
                        context: s.to_string(),
                    })
                }
            };
            spots.push(spot);
        }
        let spots: [Spot; 9] = spots.try_into().map_err(|spots: Vec<Spot>| {
            Error::InvalidBoardLength {
                got: spots.len(),
                context: s.to_string(),
            }
        })?;

        let mut board = Self {
            spots,
            to_move: Player::X,
        };
        if board.count(Player::X) > board.count(Player::O) {
            board.to_move = Player::O;
        }
        Ok(board)
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.spots.chunks(3) {
            for spot in row {
                let symbol = match spot {
                    Spot::Empty => ".",
                    Spot::Filled(Player::X) => "X",
                    Spot::Filled(Player::O) => "O",
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
