//! Exhaustive minimax search with alpha-beta pruning.
//!
//! Values are always reported from the maximizer's point of view (X in
//! tic-tac-toe): positive means the maximizer wins under perfect play.
//! The search never cuts off on depth; every line is played out to a
//! terminal position before it is scored.

use std::ops::{Deref, DerefMut};

use log::{debug, error, trace};

use crate::game::Game;

pub type Evaluation = i32;

// Both bounds negate to each other.
pub const BEST_EVAL: Evaluation = i32::MAX;
pub const WORST_EVAL: Evaluation = -BEST_EVAL;

/// How terminal positions are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Scoring {
    /// +1 for a maximizer win, -1 for a loss, 0 for a draw.
    Flat,
    /// Wins and losses are scaled by `empty_cells + 1`, so faster wins and
    /// slower losses score further from zero.
    #[default]
    DepthWeighted,
}

impl Scoring {
    /// Value of `game` if it is finished, `None` while it is still in play.
    ///
    /// A winner is checked before the board is checked for empty cells.
    pub fn terminal_value<G: Game>(self, game: &G) -> Option<Evaluation> {
        if let Some(winner) = game.winner() {
            let magnitude = match self {
                Scoring::Flat => 1,
                Scoring::DepthWeighted => game.empty_count() as Evaluation + 1,
            };
            return Some(if winner == G::maximizer() {
                magnitude
            } else {
                -magnitude
            });
        }
        game.is_terminal().then_some(0)
    }
}

/// Which shape of the recursion to run. Both return the same move and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Formulation {
    /// A single `minimax` function parameterised by role.
    #[default]
    Merged,
    /// Mutually recursive `max_value` and `min_value`, each returning a move.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Max,
    Min,
}

impl Role {
    fn of<G: Game>(player: G::Player) -> Self {
        if player == G::maximizer() {
            Role::Max
        } else {
            Role::Min
        }
    }

    fn flip(self) -> Self {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    fn worst(self) -> Evaluation {
        match self {
            Role::Max => WORST_EVAL,
            Role::Min => BEST_EVAL,
        }
    }

    // Strict, so the first of several equal moves is kept.
    fn improves(self, value: Evaluation, best: Evaluation) -> bool {
        match self {
            Role::Max => value > best,
            Role::Min => value < best,
        }
    }
}

/// An action applied for the lifetime of the guard. Dropping the guard takes
/// the action back, on every exit path out of the scope that owns it.
struct Applied<'a, G: Game> {
    game: &'a mut G,
    action: G::Action,
}

impl<'a, G: Game> Applied<'a, G> {
    fn new(game: &'a mut G, action: G::Action) -> crate::error::Result<Self> {
        game.apply(action)?;
        Ok(Self { game, action })
    }
}

impl<G: Game> Deref for Applied<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.game
    }
}

impl<G: Game> DerefMut for Applied<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.game
    }
}

impl<G: Game> Drop for Applied<'_, G> {
    fn drop(&mut self) {
        self.game.undo(self.action);
    }
}

/// The move picked for a position, with its value and the work it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision<A> {
    pub action: A,
    pub value: Evaluation,
    pub nodes: u64,
}

#[derive(Debug, Clone)]
pub struct Search {
    scoring: Scoring,
    formulation: Formulation,
    pruning: bool,
    nodes: u64,
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self {
            scoring: Scoring::default(),
            formulation: Formulation::default(),
            pruning: true,
            nodes: 0,
        }
    }

    pub fn scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    /// With pruning off every node is searched with the full window.
    pub fn pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    /// Nodes visited by the most recent call.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// The optimal move for the player to move, or `None` if the game is over.
    pub fn choose_move<G: Game>(&mut self, game: &G) -> Option<G::Action> {
        self.decide(game).map(|decision| decision.action)
    }

    /// Like [`Search::choose_move`], but also reports the value and node count.
    pub fn decide<G: Game>(&mut self, game: &G) -> Option<Decision<G::Action>> {
        let mut scratch = game.clone();
        self.decide_in_place(&mut scratch)
    }

    /// Searches directly on `game`. Every action explored is undone before
    /// this returns, so `game` comes back unchanged.
    pub fn decide_in_place<G: Game>(&mut self, game: &mut G) -> Option<Decision<G::Action>> {
        self.nodes = 0;
        if game.is_terminal() {
            debug!("no move to choose on a finished game");
            return None;
        }
        let role = Role::of::<G>(game.to_move());
        let (value, action) = match (self.formulation, role) {
            (Formulation::Merged, role) => self.minimax_root(game, role),
            (Formulation::Split, Role::Max) => self.max_value(game, WORST_EVAL, BEST_EVAL),
            (Formulation::Split, Role::Min) => self.min_value(game, WORST_EVAL, BEST_EVAL),
        };
        let action = action?;
        debug!(
            "{:?} to move: chose {:?} with value {} ({:?}, pruning {}, {} nodes)",
            game.to_move(),
            action,
            value,
            self.formulation,
            self.pruning,
            self.nodes
        );
        Some(Decision {
            action,
            value,
            nodes: self.nodes,
        })
    }

    /// Game-theoretic value of `game` under perfect play.
    pub fn evaluate<G: Game>(&mut self, game: &G) -> Evaluation {
        self.nodes = 0;
        let mut scratch = game.clone();
        let role = Role::of::<G>(game.to_move());
        match self.formulation {
            Formulation::Merged => self.minimax(&mut scratch, 0, role, WORST_EVAL, BEST_EVAL),
            Formulation::Split => match role {
                Role::Max => self.max_value(&mut scratch, WORST_EVAL, BEST_EVAL).0,
                Role::Min => self.min_value(&mut scratch, WORST_EVAL, BEST_EVAL).0,
            },
        }
    }

    fn minimax_root<G: Game>(
        &mut self,
        game: &mut G,
        role: Role,
    ) -> (Evaluation, Option<G::Action>) {
        self.nodes += 1;
        let (mut alpha, mut beta) = (WORST_EVAL, BEST_EVAL);
        let mut best = role.worst();
        let mut best_action = None;
        for action in game.legal_moves() {
            let value = {
                let Some(mut child) = self.enter(game, action) else {
                    continue;
                };
                self.minimax(&mut *child, 1, role.flip(), alpha, beta)
            };
            if best_action.is_none() || role.improves(value, best) {
                best = value;
                best_action = Some(action);
            }
            if self.pruning {
                match role {
                    Role::Max => alpha = alpha.max(best),
                    Role::Min => beta = beta.min(best),
                }
            }
        }
        (best, best_action)
    }

    fn minimax<G: Game>(
        &mut self,
        game: &mut G,
        depth: usize,
        role: Role,
        mut alpha: Evaluation,
        mut beta: Evaluation,
    ) -> Evaluation {
        debug_assert!(alpha <= beta);
        self.nodes += 1;
        if let Some(value) = self.scoring.terminal_value(&*game) {
            trace!("terminal at depth {}: {}", depth, value);
            return value;
        }

        let mut best = role.worst();
        for action in game.legal_moves() {
            let value = {
                let Some(mut child) = self.enter(game, action) else {
                    continue;
                };
                self.minimax(&mut *child, depth + 1, role.flip(), alpha, beta)
            };
            match role {
                Role::Max => best = best.max(value),
                Role::Min => best = best.min(value),
            }
            if !self.pruning {
                continue;
            }
            match role {
                Role::Max if best >= beta => break,
                Role::Min if best <= alpha => break,
                Role::Max => alpha = alpha.max(best),
                Role::Min => beta = beta.min(best),
            }
        }
        best
    }

    fn max_value<G: Game>(
        &mut self,
        game: &mut G,
        mut alpha: Evaluation,
        beta: Evaluation,
    ) -> (Evaluation, Option<G::Action>) {
        debug_assert!(alpha <= beta);
        self.nodes += 1;
        if let Some(value) = self.scoring.terminal_value(&*game) {
            return (value, None);
        }

        let mut best = WORST_EVAL;
        let mut best_action = None;
        for action in game.legal_moves() {
            let (value, _) = {
                let Some(mut child) = self.enter(game, action) else {
                    continue;
                };
                self.min_value(&mut *child, alpha, beta)
            };
            if best_action.is_none() || value > best {
                best = value;
                best_action = Some(action);
            }
            if self.pruning {
                if best >= beta {
                    return (best, best_action);
                }
                alpha = alpha.max(best);
            }
        }
        (best, best_action)
    }

    fn min_value<G: Game>(
        &mut self,
        game: &mut G,
        alpha: Evaluation,
        mut beta: Evaluation,
    ) -> (Evaluation, Option<G::Action>) {
        debug_assert!(alpha <= beta);
        self.nodes += 1;
        if let Some(value) = self.scoring.terminal_value(&*game) {
            return (value, None);
        }

        let mut best = BEST_EVAL;
        let mut best_action = None;
        for action in game.legal_moves() {
            let (value, _) = {
                let Some(mut child) = self.enter(game, action) else {
                    continue;
                };
                self.max_value(&mut *child, alpha, beta)
            };
            if best_action.is_none() || value < best {
                best = value;
                best_action = Some(action);
            }
            if self.pruning {
                if best <= alpha {
                    return (best, best_action);
                }
                beta = beta.min(best);
            }
        }
        (best, best_action)
    }

    // Legal moves always apply; a failure here means the game's move
    // generator and its rules disagree.
    fn enter<'a, G: Game>(&self, game: &'a mut G, action: G::Action) -> Option<Applied<'a, G>> {
        match Applied::new(game, action) {
            Ok(child) => Some(child),
            Err(err) => {
                error!("skipping move {:?} that failed to apply: {}", action, err);
                debug_assert!(false, "legal move {:?} failed to apply", action);
                None
            }
        }
    }
}
