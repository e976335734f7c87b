//! Game representation.
//!
//! A [`Game`] is either a table (strategic form) or a tree (extensive form).
//! Both share players, outcomes and pure strategies; trees add nodes,
//! information sets and actions, and derive each player's pure strategies
//! from the actions at the player's information sets.
//!
//! Every structural edit advances a version counter, and every change to
//! payoff-relevant content advances a second one. Profiles snapshot both
//! and refuse to compute once the game has moved on.

mod arena;
mod data;
mod error;
mod handles;
mod index;
mod number;
mod structure;
mod writer;

pub(crate) use data::{contingency_count, decode, GameData, Stamp};
pub(crate) use handles::{Handle, Shared, WeakShared};

pub(crate) use arena::Key;
pub use error::{GameError, Result};
pub use handles::{Action, Infoset, Node, Outcome, Player, Strategy};
pub use index::{Contingency, Element};
pub use number::{Number, Rational};
pub use structure::Game;
