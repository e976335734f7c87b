//! Kuhn Poker as a game tree.
//!
//! Kuhn Poker is a simplified poker game with a known family of Nash
//! equilibria, which makes it a good end-to-end check for behavior
//! profiles on trees with chance moves and imperfect information.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack (0), Queen (1), King (2)
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 1 acts first: Pass or Bet (1 chip)
//! - Player 2 responds based on P1's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! Chance (6 deals, 1/6 each)
//! └── P1
//!     ├── Pass
//!     │   └── P2
//!     │       ├── Pass → Showdown (pot = 2)
//!     │       └── Bet
//!     │           └── P1
//!     │               ├── Pass → P2 wins (pot = 3)
//!     │               └── Bet → Showdown (pot = 4)
//!     └── Bet
//!         └── P2
//!             ├── Pass → P1 wins (pot = 3)
//!             └── Bet → Showdown (pot = 4)
//! ```
//!
//! Information sets are labelled `"<card>:<history>"`, e.g. `"0:pb"` is a
//! Jack holder facing a bet after passing.
//!
//! ## Known Nash Equilibrium
//!
//! For any α in [0, 1/3]:
//!
//! - **Player 1 with Jack**: Bet with probability α
//! - **Player 1 with Queen**: Always Pass; call a bet with probability α + 1/3
//! - **Player 1 with King**: Bet with probability 3α; always call
//! - **Player 2 facing Bet**: Jack folds, Queen calls 1/3, King calls
//! - **Player 2 after Pass**: Jack bets 1/3, Queen passes, King bets
//!
//! **Expected Value**: Player 1 EV = -1/18 ≈ -0.0556

use std::fmt;

use rustc_hash::FxHashMap;

use crate::game::{Game, Infoset, Node, Player, Result};
use crate::profile::{MixedBehaviorProfile, Scalar};

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl KuhnAction {
    /// Both actions, in the order they appear at every infoset.
    pub const ALL: [KuhnAction; 2] = [KuhnAction::Pass, KuhnAction::Bet];

    /// History character of the action.
    pub fn symbol(self) -> char {
        match self {
            KuhnAction::Pass => 'p',
            KuhnAction::Bet => 'b',
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Get card name for display.
pub fn card_name(card: u8) -> &'static str {
    match card {
        0 => "Jack",
        1 => "Queen",
        2 => "King",
        _ => "Unknown",
    }
}

/// Label of the infoset where the holder of `card` acts after `history`.
pub fn infoset_label(card: u8, history: &str) -> String {
    format!("{}:{}", card, history)
}

/// Player to act after `history`, or `None` once the hand is over.
fn to_act(history: &str) -> Option<usize> {
    match history {
        "" | "pb" => Some(0),
        "p" | "b" => Some(1),
        _ => None,
    }
}

/// Payoff to player 1 at a terminal history.
pub fn payoff(history: &str, cards: [u8; 2]) -> i64 {
    let showdown = if cards[0] > cards[1] { 1 } else { -1 };
    match history {
        // Showdown after both pass - pot is 2 (1+1 ante)
        "pp" => showdown,
        // Player 2 folded to a bet
        "bp" => 1,
        // Player 1 folded to a bet after passing
        "pbp" => -1,
        // Showdown after bet-call - pot is 4 (2+2)
        "bb" | "pbb" => 2 * showdown,
        _ => 0,
    }
}

struct Builder {
    game: Game,
    players: [Player; 2],
    infosets: FxHashMap<String, Infoset>,
}

impl Builder {
    fn expand(&mut self, node: &Node, cards: [u8; 2], history: &str) -> Result<()> {
        let Some(actor) = to_act(history) else {
            let outcome = self.game.add_outcome(history)?;
            let value = payoff(history, cards);
            outcome.set_payoff(&self.players[0], value)?;
            outcome.set_payoff(&self.players[1], -value)?;
            return self.game.set_outcome(node, Some(&outcome));
        };

        let label = infoset_label(cards[actor], history);
        match self.infosets.get(&label) {
            Some(infoset) => self.game.append_infoset(node, infoset)?,
            None => {
                let infoset = self.game.append_move(
                    node,
                    &self.players[actor],
                    KuhnAction::ALL.iter().map(ToString::to_string),
                )?;
                infoset.set_label(label.clone())?;
                self.infosets.insert(label, infoset);
            }
        }

        for (child, action) in node.children()?.iter().zip(KuhnAction::ALL) {
            let next = format!("{}{}", history, action.symbol());
            self.expand(child, cards, &next)?;
        }
        Ok(())
    }
}

/// Builds Kuhn Poker as a tree game.
///
/// The root is a chance move over the six deals, labelled by card pair
/// (player 1's card first).
pub fn kuhn_poker() -> Result<Game> {
    let game = Game::new_tree();
    game.set_title("Kuhn poker");
    let players = [game.add_player("Player 1")?, game.add_player("Player 2")?];

    let deals: Vec<[u8; 2]> = (0..3u8)
        .flat_map(|a| (0..3u8).filter(move |&b| b != a).map(move |b| [a, b]))
        .collect();
    let root = game.root()?;
    game.append_move(
        &root,
        &game.chance()?,
        deals
            .iter()
            .map(|[a, b]| format!("{}{}", &card_name(*a)[..1], &card_name(*b)[..1])),
    )?;

    let mut builder = Builder {
        game: game.clone(),
        players,
        infosets: FxHashMap::default(),
    };
    for (child, cards) in root.children()?.iter().zip(deals) {
        builder.expand(child, cards, "")?;
    }
    log::debug!(
        "built Kuhn poker with {} infosets",
        builder.infosets.len()
    );
    Ok(game)
}

/// The equilibrium with Jack-bluffing frequency `alpha` (which should lie
/// in [0, 1/3]).
pub fn equilibrium<T: Scalar>(game: &Game, alpha: T) -> Result<MixedBehaviorProfile<T>> {
    let third = T::ratio(1, 3);
    let bets = [
        // Player 1
        ("0:", alpha.clone()),
        ("1:", T::zero()),
        ("2:", alpha.clone() * T::ratio(3, 1)),
        ("0:pb", T::zero()),
        ("1:pb", alpha + third.clone()),
        ("2:pb", T::one()),
        // Player 2
        ("0:p", third.clone()),
        ("1:p", T::zero()),
        ("2:p", T::one()),
        ("0:b", T::zero()),
        ("1:b", third),
        ("2:b", T::one()),
    ];
    let by_label: FxHashMap<&str, T> = bets.into_iter().collect();

    let mut profile = game.mixed_behavior_profile::<T>()?;
    for player in game.players()? {
        for infoset in player.infosets()? {
            let label = infoset.label()?;
            let Some(bet) = by_label.get(label.as_str()) else {
                continue;
            };
            profile.set_action_prob(&infoset.action(0)?, T::one() - bet.clone())?;
            profile.set_action_prob(&infoset.action(1)?, bet.clone())?;
        }
    }
    Ok(profile)
}
