//! # Finite Games
//!
//! Finite games in strategic (table) and extensive (tree) form, with mixed
//! strategy and mixed behavior profiles that detect when the game they were
//! created for has changed.
//!
//! ## Features
//!
//! - **Two Representations**: N-player tables and game trees with chance
//!   moves and information sets, behind one [`Game`] handle
//! - **Exact Payoffs**: integers, fractions and decimals are kept exactly,
//!   alongside their floating-point reading
//! - **Uniform Indexing**: address cells by positions, labels or strategy
//!   handles, with a precise error for each way an index can be wrong
//! - **Versioned Profiles**: payoffs and Liapunov values in `f64` or exact
//!   rationals, refusing to compute once the game has been edited
//! - **Array Conversion**: build tables from payoff arrays and back
//!
//! ## Quick Start
//!
//! ```
//! use finite_games::{Game, GameError};
//!
//! // 1. Build a game
//! let game = Game::new_table(&[2, 2]);
//! let row = game.player(0).unwrap();
//! game.outcome_at((0, 0)).unwrap().unwrap().set_payoff(&row, 3).unwrap();
//!
//! // 2. Create a profile
//! let profile = game.mixed_strategy_profile::<f64>().unwrap();
//! assert_eq!(profile.payoff(&row).unwrap(), 0.75);
//!
//! // 3. Edit the game: the profile notices
//! let strategy = row.strategy(1).unwrap();
//! game.delete_strategy(&strategy).unwrap();
//! assert_eq!(profile.payoff(&row), Err(GameError::StructureChanged));
//! ```
//!
//! ## Modules
//!
//! - [`game`]: Game structure, handles, indexing and versioning
//! - [`profile`]: Mixed strategy and behavior profiles
//! - [`convert`]: Conversion to and from payoff arrays
//! - [`games`]: Ready-made games (prisoner's dilemma, Kuhn Poker, etc.)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Game (Rc<RefCell>)                      │
//! │  - Players, strategies, outcomes    - Structure/content version │
//! │  - Nodes, infosets, actions         - Arena keys, never reused  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ weak reference + version snapshot
//!         ┌─────────────────────┼─────────────────────┐
//!         │                     │                     │
//!    ┌─────────┐         ┌───────────┐         ┌───────────┐
//!    │ Handles │         │ Strategy  │         │ Behavior  │
//!    │ (stale  │         │ profiles  │         │ profiles  │
//!    │ checks) │         │           │         │  (trees)  │
//!    └─────────┘         └───────────┘         └───────────┘
//! ```

#![warn(missing_docs)]

/// Game structure module.
///
/// Tables, trees, handles to their parts, and cell indexing.
pub mod game;

/// Profile module.
///
/// Mixed strategy and behavior profiles with payoff and Liapunov evaluation.
pub mod profile;

/// Array conversion module.
pub mod convert;

/// Game implementations module.
///
/// Contains example games like Kuhn Poker for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use convert::PayoffArray;
pub use game::{
    Action, Contingency, Element, Game, GameError, Infoset, Node, Number, Outcome, Player,
    Rational, Result, Strategy,
};
pub use profile::{
    BehaviorProfileExport, ConfigError, LiapConfig, MixedBehaviorProfile, MixedStrategyProfile,
    Scalar, StrategyProfileExport,
};
