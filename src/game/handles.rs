//! Handles to the objects inside a game.
//!
//! A handle is a non-owning reference: it stores a weak pointer to the game
//! and the arena key of the object. Holding a handle never keeps a game
//! alive. Every accessor re-resolves the key, so a handle whose object was
//! removed by a later mutation fails with [`GameError::StaleHandle`].

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::game::arena::Key;
use crate::game::data::GameData;
use crate::game::error::{GameError, Result};
use crate::game::number::Number;
use crate::game::Game;

pub(crate) type Shared = Rc<RefCell<GameData>>;
pub(crate) type WeakShared = Weak<RefCell<GameData>>;

/// Common plumbing of all handle types.
pub(crate) trait Handle {
    const KIND: &'static str;

    fn weak(&self) -> &WeakShared;
    fn key(&self) -> Key;

    fn shared(&self) -> Result<Shared> {
        self.weak().upgrade().ok_or(GameError::GameDropped(Self::KIND))
    }

    fn belongs_to(&self, game: &Shared) -> bool {
        std::ptr::eq(self.weak().as_ptr(), Rc::as_ptr(game))
    }

    fn read<T>(&self, f: impl FnOnce(&GameData) -> Result<T>) -> Result<T> {
        let game = self.shared()?;
        let data = game.borrow();
        f(&data)
    }

    fn write<T>(&self, f: impl FnOnce(&mut GameData) -> Result<T>) -> Result<T> {
        let game = self.shared()?;
        let mut data = game.borrow_mut();
        f(&mut data)
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            game: WeakShared,
            key: Key,
        }

        impl $name {
            pub(crate) fn new(game: WeakShared, key: Key) -> Self {
                Self { game, key }
            }

            /// The game this object belongs to.
            pub fn game(&self) -> Result<Game> {
                Ok(Game::from_shared(self.shared()?))
            }
        }

        impl Handle for $name {
            const KIND: &'static str = $kind;

            fn weak(&self) -> &WeakShared {
                &self.game
            }

            fn key(&self) -> Key {
                self.key
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key && Weak::ptr_eq(&self.game, &other.game)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key.hash(state);
                self.game.as_ptr().hash(state);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).field("key", &self.key).finish()
            }
        }
    };
}

handle!(
    /// A player, or the chance player of a tree game.
    Player,
    "player"
);
handle!(
    /// A pure strategy of a player.
    Strategy,
    "strategy"
);
handle!(
    /// A payoff vector with one entry per player.
    Outcome,
    "outcome"
);
handle!(
    /// A node of a game tree.
    Node,
    "node"
);
handle!(
    /// An information set: decision nodes one player cannot tell apart.
    Infoset,
    "infoset"
);
handle!(
    /// An action available at an information set.
    Action,
    "action"
);

fn label_error(position: usize) -> GameError {
    GameError::LookupBounds(format!("no entry at position {}", position))
}

impl Player {
    /// The player's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.player(self.key)?.label.clone()))
    }

    /// Relabels the player.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.player(self.key)?;
            if let Some(p) = d.player_arena.get_mut(self.key) {
                p.label = label;
            }
            Ok(())
        })
    }

    /// 0-based position among the game's players.
    pub fn number(&self) -> Result<usize> {
        self.read(|d| {
            d.player(self.key)?;
            d.player_position(self.key)
                .ok_or_else(|| GameError::InvalidArgument("the chance player has no number".to_string()))
        })
    }

    /// Returns true for the chance player of a tree game.
    pub fn is_chance(&self) -> Result<bool> {
        self.read(|d| {
            d.player(self.key)?;
            Ok(d.chance() == Some(self.key))
        })
    }

    /// The player's pure strategies. In tree games these are derived from
    /// the player's infosets and replaced after every structural change.
    pub fn strategies(&self) -> Result<Vec<Strategy>> {
        self.write(|d| {
            d.ensure_strategies();
            Ok(d.player(self.key)?
                .strategies
                .iter()
                .map(|&s| Strategy::new(self.game.clone(), s))
                .collect())
        })
    }

    /// The strategy at `index`.
    pub fn strategy(&self, index: usize) -> Result<Strategy> {
        self.strategies()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| label_error(index))
    }

    /// The player's information sets (tree games only; empty otherwise).
    pub fn infosets(&self) -> Result<Vec<Infoset>> {
        self.read(|d| {
            Ok(d.player(self.key)?
                .infosets
                .iter()
                .map(|&i| Infoset::new(self.game.clone(), i))
                .collect())
        })
    }

    /// The information set at `index`.
    pub fn infoset(&self, index: usize) -> Result<Infoset> {
        self.infosets()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| label_error(index))
    }
}

impl Strategy {
    /// The strategy's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.strategy(self.key)?.label.clone()))
    }

    /// Relabels the strategy.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.strategy(self.key)?;
            if let Some(s) = d.strategy_arena.get_mut(self.key) {
                s.label = label;
            }
            Ok(())
        })
    }

    /// The player owning this strategy.
    pub fn player(&self) -> Result<Player> {
        self.read(|d| Ok(Player::new(self.game.clone(), d.strategy(self.key)?.player)))
    }

    /// 0-based position among the owning player's strategies.
    pub fn number(&self) -> Result<usize> {
        self.read(|d| {
            let player = d.strategy(self.key)?.player;
            d.player(player)?
                .strategies
                .iter()
                .position(|&s| s == self.key)
                .ok_or(GameError::StaleHandle("strategy"))
        })
    }
}

impl Outcome {
    /// The outcome's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.outcome(self.key)?.label.clone()))
    }

    /// Relabels the outcome.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.outcome(self.key)?;
            if let Some(o) = d.outcome_arena.get_mut(self.key) {
                o.label = label;
            }
            Ok(())
        })
    }

    /// 0-based position in the game's outcome list.
    pub fn number(&self) -> Result<usize> {
        self.read(|d| {
            d.outcome(self.key)?;
            d.outcomes
                .iter()
                .position(|&o| o == self.key)
                .ok_or(GameError::StaleHandle("outcome"))
        })
    }

    /// All payoffs, in player order.
    pub fn payoffs(&self) -> Result<Vec<Number>> {
        self.read(|d| Ok(d.outcome(self.key)?.payoffs.clone()))
    }

    /// Payoff to `player`.
    pub fn payoff(&self, player: &Player) -> Result<Number> {
        let position = self.position_of(player)?;
        self.read(|d| Ok(d.outcome(self.key)?.payoffs[position].clone()))
    }

    /// Sets the payoff to `player`. Accepts integers, floats, rationals and
    /// text (`"3"`, `"1/4"`, `"3.14159265"`).
    ///
    /// Profiles created before the edit stop computing.
    pub fn set_payoff<V>(&self, player: &Player, value: V) -> Result<()>
    where
        V: TryInto<Number>,
        GameError: From<V::Error>,
    {
        let value = value.try_into()?;
        let position = self.position_of(player)?;
        self.write(|d| d.set_payoff(self.key, position, value))
    }

    fn position_of(&self, player: &Player) -> Result<usize> {
        let game = self.shared()?;
        if !player.belongs_to(&game) {
            return Err(GameError::LookupBounds(
                "player belongs to a different game".to_string(),
            ));
        }
        let data = game.borrow();
        data.player(player.key)?;
        data.player_position(player.key)
            .ok_or_else(|| GameError::LookupBounds("the chance player has no payoff".to_string()))
    }
}

impl Node {
    /// The node's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.node(self.key)?.label.clone()))
    }

    /// Relabels the node.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.node(self.key)?;
            if let Some(n) = d.node_arena.get_mut(self.key) {
                n.label = label;
            }
            Ok(())
        })
    }

    /// The parent node; `None` at the root.
    pub fn parent(&self) -> Result<Option<Node>> {
        self.read(|d| {
            Ok(d.node(self.key)?
                .parent
                .map(|p| Node::new(self.game.clone(), p)))
        })
    }

    /// Children, in action order.
    pub fn children(&self) -> Result<Vec<Node>> {
        self.read(|d| {
            Ok(d.node(self.key)?
                .children
                .iter()
                .map(|&c| Node::new(self.game.clone(), c))
                .collect())
        })
    }

    /// The child reached by the action at `index`.
    pub fn child(&self, index: usize) -> Result<Node> {
        self.children()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| label_error(index))
    }

    /// Returns true if no move is made at this node.
    pub fn is_terminal(&self) -> Result<bool> {
        self.read(|d| Ok(d.node(self.key)?.children.is_empty()))
    }

    /// The information set the node belongs to; `None` at terminal nodes.
    pub fn infoset(&self) -> Result<Option<Infoset>> {
        self.read(|d| {
            Ok(d.node(self.key)?
                .infoset
                .map(|i| Infoset::new(self.game.clone(), i)))
        })
    }

    /// The player moving at this node.
    pub fn player(&self) -> Result<Option<Player>> {
        self.read(|d| match d.node(self.key)?.infoset {
            Some(infoset) => Ok(Some(Player::new(self.game.clone(), d.infoset(infoset)?.player))),
            None => Ok(None),
        })
    }

    /// The outcome attached to this node.
    pub fn outcome(&self) -> Result<Option<Outcome>> {
        self.read(|d| {
            Ok(d.node(self.key)?
                .outcome
                .map(|o| Outcome::new(self.game.clone(), o)))
        })
    }

    /// The action leading from the parent to this node.
    pub fn prior_action(&self) -> Result<Option<Action>> {
        self.read(|d| {
            let Some(parent) = d.node(self.key)?.parent else {
                return Ok(None);
            };
            let parent = d.node(parent)?;
            let position = parent.children.iter().position(|&c| c == self.key);
            Ok(match (parent.infoset, position) {
                (Some(infoset), Some(position)) => d
                    .infoset(infoset)?
                    .actions
                    .get(position)
                    .map(|&a| Action::new(self.game.clone(), a)),
                _ => None,
            })
        })
    }
}

impl Infoset {
    /// The infoset's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.infoset(self.key)?.label.clone()))
    }

    /// Relabels the infoset.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.infoset(self.key)?;
            if let Some(i) = d.infoset_arena.get_mut(self.key) {
                i.label = label;
            }
            Ok(())
        })
    }

    /// The player moving at this infoset.
    pub fn player(&self) -> Result<Player> {
        self.read(|d| Ok(Player::new(self.game.clone(), d.infoset(self.key)?.player)))
    }

    /// Returns true if chance moves here.
    pub fn is_chance(&self) -> Result<bool> {
        self.read(|d| Ok(d.chance() == Some(d.infoset(self.key)?.player)))
    }

    /// 0-based position among the owning player's infosets.
    pub fn number(&self) -> Result<usize> {
        self.read(|d| {
            let player = d.infoset(self.key)?.player;
            d.player(player)?
                .infosets
                .iter()
                .position(|&i| i == self.key)
                .ok_or(GameError::StaleHandle("infoset"))
        })
    }

    /// Actions available here.
    pub fn actions(&self) -> Result<Vec<Action>> {
        self.read(|d| {
            Ok(d.infoset(self.key)?
                .actions
                .iter()
                .map(|&a| Action::new(self.game.clone(), a))
                .collect())
        })
    }

    /// The action at `index`.
    pub fn action(&self, index: usize) -> Result<Action> {
        self.actions()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| label_error(index))
    }

    /// Member nodes.
    pub fn members(&self) -> Result<Vec<Node>> {
        self.read(|d| {
            Ok(d.infoset(self.key)?
                .members
                .iter()
                .map(|&n| Node::new(self.game.clone(), n))
                .collect())
        })
    }
}

impl Action {
    /// The action's label.
    pub fn label(&self) -> Result<String> {
        self.read(|d| Ok(d.action(self.key)?.label.clone()))
    }

    /// Relabels the action.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        self.write(|d| {
            d.action(self.key)?;
            if let Some(a) = d.action_arena.get_mut(self.key) {
                a.label = label;
            }
            Ok(())
        })
    }

    /// The infoset offering this action.
    pub fn infoset(&self) -> Result<Infoset> {
        self.read(|d| Ok(Infoset::new(self.game.clone(), d.action(self.key)?.infoset)))
    }

    /// 0-based position among the infoset's actions.
    pub fn number(&self) -> Result<usize> {
        self.read(|d| {
            let infoset = d.action(self.key)?.infoset;
            d.infoset(infoset)?
                .actions
                .iter()
                .position(|&a| a == self.key)
                .ok_or(GameError::StaleHandle("action"))
        })
    }

    /// Probability of a chance action; `None` for personal actions.
    pub fn prob(&self) -> Result<Option<Number>> {
        self.read(|d| Ok(d.action(self.key)?.prob.clone()))
    }
}
