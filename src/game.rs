use std::hash::Hash;

use crate::error::Result;

/// A two-player, perfect-information game the search engine can explore.
///
/// Exploration mutates the state in place: every `apply` made during search
/// is paired with an `undo` of the same action before the search returns.
pub trait Game: Clone + std::fmt::Display {
    type Action: std::fmt::Debug + Hash + PartialEq + Eq + Copy;
    type Player: PartialEq + std::fmt::Debug + Copy;

    /// Play `action` for the player to move. Fails without mutating the state.
    fn apply(&mut self, action: Self::Action) -> Result<()>;

    /// Take back `action`, which must be the last action applied.
    fn undo(&mut self, action: Self::Action);

    /// Legal actions in a fixed, deterministic order.
    fn legal_moves(&self) -> Vec<Self::Action>;

    fn to_move(&self) -> Self::Player;

    fn winner(&self) -> Option<Self::Player>;

    fn is_terminal(&self) -> bool;

    fn empty_count(&self) -> usize;

    /// The player whose wins score positive.
    fn maximizer() -> Self::Player;
}
