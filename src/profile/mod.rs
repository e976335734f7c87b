//! Mixed strategy and mixed behavior profiles.
//!
//! A profile assigns probabilities to a game's strategies (or, in a tree,
//! to the actions at each information set). It keeps only a weak reference
//! to the game plus a snapshot of the game's version counters. Each
//! computation re-checks the snapshot, so a profile created before the game
//! was edited fails with [`GameError::StructureChanged`] instead of quietly
//! computing with stale data.
//!
//! Profiles are generic over the [`Scalar`] they compute in:
//!
//! ```
//! use finite_games::{Game, Rational};
//!
//! let game = Game::new_table(&[2, 2]);
//! let float = game.mixed_strategy_profile::<f64>().unwrap();
//! let exact = game.mixed_strategy_profile::<Rational>().unwrap();
//! let player = game.player(0).unwrap();
//! assert_eq!(float.payoff(&player).unwrap(), 0.0);
//! assert_eq!(exact.liap_value().unwrap(), Rational::from_integer(0.into()));
//! ```

mod behavior;
mod config;
mod scalar;
mod strategy;

use std::rc::Weak;

use crate::game::{GameError, Handle, Player, Result, Shared, Stamp, WeakShared};

pub use behavior::{BehaviorProfileExport, MixedBehaviorProfile};
pub use config::{ConfigError, LiapConfig};
pub use scalar::Scalar;
pub use strategy::{MixedStrategyProfile, StrategyProfileExport};

/// Upgrades the profile's game reference and checks the snapshot.
fn checked(game: &WeakShared, stamp: Stamp) -> Result<Shared> {
    let shared = game.upgrade().ok_or(GameError::GameDropped("profile"))?;
    let current = shared.borrow().stamp();
    if current != stamp {
        log::debug!(
            "profile created at {:?} used at {:?}",
            stamp,
            current
        );
        return Err(GameError::StructureChanged);
    }
    Ok(shared)
}

/// Position of `player` in the game the profile refers to.
fn player_index(shared: &Shared, game: &WeakShared, player: &Player) -> Result<usize> {
    if !Weak::ptr_eq(player.weak(), game) {
        return Err(GameError::LookupBounds(
            "player belongs to a different game".to_string(),
        ));
    }
    let data = shared.borrow();
    data.player(player.key())?;
    data.player_position(player.key())
        .ok_or_else(|| GameError::LookupBounds("the chance player has no payoff".to_string()))
}

fn foreign<H: Handle>(_: &H) -> GameError {
    GameError::LookupBounds(format!("{} is not part of this profile", H::KIND))
}
