//! Owned state behind a [`Game`](crate::game::Game) handle.
//!
//! All players, strategies, outcomes, nodes, infosets and actions live in
//! arenas owned by [`GameData`]. Public handles refer to them by [`Key`].
//!
//! Two counters describe the state of the game at any time:
//! - the structural version moves whenever players, strategies, nodes,
//!   infosets or actions are added or removed;
//! - the content version moves whenever a payoff-relevant value changes
//!   without changing the shape (payoff edits, outcome attachment, chance
//!   probabilities).
//!
//! Profiles remember both and refuse to compute once either has moved.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;

use crate::game::arena::{Arena, Key};
use crate::game::error::{GameError, Result};
use crate::game::number::{Number, Rational};

/// Snapshot of both version counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stamp {
    pub(crate) structure: u64,
    pub(crate) content: u64,
}

#[derive(Debug, Clone)]
pub(crate) enum Form {
    /// Strategic form. `results[i]` is the outcome of contingency `i`, with
    /// the first player's strategy index varying fastest.
    Table { results: Vec<Option<Key>> },
    /// Extensive form. Strategies are derived from infosets on demand.
    Tree {
        root: Key,
        chance: Key,
        strategies_built: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PlayerData {
    pub(crate) label: String,
    pub(crate) strategies: Vec<Key>,
    pub(crate) infosets: Vec<Key>,
}

#[derive(Debug, Clone)]
pub(crate) struct StrategyData {
    pub(crate) label: String,
    pub(crate) player: Key,
    /// Tree form only: chosen action index at each of the player's infosets.
    pub(crate) choices: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct OutcomeData {
    pub(crate) label: String,
    pub(crate) payoffs: Vec<Number>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NodeData {
    pub(crate) label: String,
    pub(crate) parent: Option<Key>,
    pub(crate) children: Vec<Key>,
    pub(crate) infoset: Option<Key>,
    pub(crate) outcome: Option<Key>,
}

#[derive(Debug, Clone)]
pub(crate) struct InfosetData {
    pub(crate) label: String,
    pub(crate) player: Key,
    pub(crate) actions: Vec<Key>,
    pub(crate) members: Vec<Key>,
}

#[derive(Debug, Clone)]
pub(crate) struct ActionData {
    pub(crate) label: String,
    pub(crate) infoset: Key,
    /// Chance actions only.
    pub(crate) prob: Option<Number>,
}

#[derive(Debug, Default)]
pub(crate) struct GameData {
    pub(crate) title: String,
    pub(crate) comment: String,
    pub(crate) form: Option<Form>,
    pub(crate) players: Vec<Key>,
    pub(crate) outcomes: Vec<Key>,
    pub(crate) player_arena: Arena<PlayerData>,
    pub(crate) strategy_arena: Arena<StrategyData>,
    pub(crate) outcome_arena: Arena<OutcomeData>,
    pub(crate) node_arena: Arena<NodeData>,
    pub(crate) infoset_arena: Arena<InfosetData>,
    pub(crate) action_arena: Arena<ActionData>,
    version: u64,
    outcome_version: u64,
}

/// Number of pure strategy profiles for the given strategy counts.
pub(crate) fn contingency_count(counts: &[usize]) -> usize {
    counts.iter().product()
}

/// Splits a contingency index into per-player positions, first player fastest.
pub(crate) fn decode(mut index: usize, counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .map(|&n| {
            let position = index % n;
            index /= n;
            position
        })
        .collect()
}

pub(crate) fn encode(positions: &[usize], counts: &[usize]) -> usize {
    positions
        .iter()
        .zip(counts)
        .rev()
        .fold(0, |index, (&position, &n)| index * n + position)
}

impl GameData {
    /// A strategic form game with `sizes[i]` strategies for player `i` and a
    /// fresh outcome in every cell.
    pub(crate) fn table(sizes: &[usize]) -> Self {
        let mut data = Self::default();
        for &count in sizes {
            let player = data.player_arena.insert(PlayerData::default());
            let strategies = (0..count)
                .map(|st| {
                    data.strategy_arena.insert(StrategyData {
                        label: (st + 1).to_string(),
                        player,
                        choices: Vec::new(),
                    })
                })
                .collect();
            if let Some(p) = data.player_arena.get_mut(player) {
                p.strategies = strategies;
            }
            data.players.push(player);
        }

        let results = (0..contingency_count(sizes))
            .map(|_| Some(data.add_outcome(String::new())))
            .collect();
        data.form = Some(Form::Table { results });
        log::trace!("allocated table game with strategy counts {:?}", sizes);
        data
    }

    /// An extensive form game consisting of a single terminal root.
    pub(crate) fn tree() -> Self {
        let mut data = Self::default();
        let root = data.node_arena.insert(NodeData::default());
        let chance = data.player_arena.insert(PlayerData {
            label: "Chance".to_string(),
            ..Default::default()
        });
        data.form = Some(Form::Tree {
            root,
            chance,
            strategies_built: false,
        });
        log::trace!("allocated tree game");
        data
    }

    // ------------------------------------------------------------------
    // Versioning
    // ------------------------------------------------------------------

    pub(crate) fn stamp(&self) -> Stamp {
        Stamp {
            structure: self.version,
            content: self.outcome_version,
        }
    }

    fn bump_structure(&mut self, what: &str) {
        self.version += 1;
        self.discard_tree_strategies();
        log::debug!("{:<24} structure version {}", what, self.version);
    }

    fn bump_content(&mut self, what: &str) {
        self.outcome_version += 1;
        log::debug!("{:<24} content version {}", what, self.outcome_version);
    }

    // ------------------------------------------------------------------
    // Form checks
    // ------------------------------------------------------------------

    pub(crate) fn form(&self) -> Result<&Form> {
        self.form.as_ref().ok_or(GameError::Uninitialized)
    }

    pub(crate) fn is_tree(&self) -> bool {
        matches!(self.form, Some(Form::Tree { .. }))
    }

    pub(crate) fn form_name(&self) -> &'static str {
        match self.form {
            None => "uninitialized",
            Some(Form::Table { .. }) => "table",
            Some(Form::Tree { .. }) => "tree",
        }
    }

    pub(crate) fn require_table(&self, operation: &'static str) -> Result<()> {
        match self.form()? {
            Form::Table { .. } => Ok(()),
            Form::Tree { .. } => Err(GameError::UnsupportedRepresentation {
                operation,
                form: "tree",
            }),
        }
    }

    pub(crate) fn require_tree(&self, operation: &'static str) -> Result<(Key, Key)> {
        match self.form()? {
            Form::Tree { root, chance, .. } => Ok((*root, *chance)),
            Form::Table { .. } => Err(GameError::UnsupportedRepresentation {
                operation,
                form: "table",
            }),
        }
    }

    pub(crate) fn chance(&self) -> Option<Key> {
        match self.form {
            Some(Form::Tree { chance, .. }) => Some(chance),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub(crate) fn player(&self, key: Key) -> Result<&PlayerData> {
        self.player_arena
            .get(key)
            .ok_or(GameError::StaleHandle("player"))
    }

    pub(crate) fn strategy(&self, key: Key) -> Result<&StrategyData> {
        self.strategy_arena
            .get(key)
            .ok_or(GameError::StaleHandle("strategy"))
    }

    pub(crate) fn outcome(&self, key: Key) -> Result<&OutcomeData> {
        self.outcome_arena
            .get(key)
            .ok_or(GameError::StaleHandle("outcome"))
    }

    pub(crate) fn node(&self, key: Key) -> Result<&NodeData> {
        self.node_arena.get(key).ok_or(GameError::StaleHandle("node"))
    }

    pub(crate) fn infoset(&self, key: Key) -> Result<&InfosetData> {
        self.infoset_arena
            .get(key)
            .ok_or(GameError::StaleHandle("infoset"))
    }

    pub(crate) fn action(&self, key: Key) -> Result<&ActionData> {
        self.action_arena
            .get(key)
            .ok_or(GameError::StaleHandle("action"))
    }

    fn node_mut(&mut self, key: Key) -> Result<&mut NodeData> {
        self.node_arena
            .get_mut(key)
            .ok_or(GameError::StaleHandle("node"))
    }

    pub(crate) fn player_position(&self, key: Key) -> Option<usize> {
        self.players.iter().position(|&p| p == key)
    }

    /// Current strategy keys, one list per player.
    pub(crate) fn strategy_lists(&self) -> Vec<Vec<Key>> {
        self.players
            .iter()
            .map(|&p| {
                self.player_arena
                    .get(p)
                    .map(|data| data.strategies.clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub(crate) fn strategy_counts(&self) -> Vec<usize> {
        self.strategy_lists().iter().map(Vec::len).collect()
    }

    /// Maps each personal infoset to (player position, index among the
    /// player's infosets).
    pub(crate) fn infoset_positions(&self) -> FxHashMap<Key, (usize, usize)> {
        let mut positions = FxHashMap::default();
        for (pl, &player) in self.players.iter().enumerate() {
            if let Some(data) = self.player_arena.get(player) {
                for (index, &infoset) in data.infosets.iter().enumerate() {
                    positions.insert(infoset, (pl, index));
                }
            }
        }
        positions
    }

    // ------------------------------------------------------------------
    // Players and strategies
    // ------------------------------------------------------------------

    pub(crate) fn add_player(&mut self, label: String) -> Result<Key> {
        let form = self.form()?.clone();
        let player = self.player_arena.insert(PlayerData {
            label,
            ..Default::default()
        });
        if let Form::Table { .. } = form {
            // A single strategy keeps every contingency index unchanged.
            let strategy = self.strategy_arena.insert(StrategyData {
                label: "1".to_string(),
                player,
                choices: Vec::new(),
            });
            if let Some(p) = self.player_arena.get_mut(player) {
                p.strategies.push(strategy);
            }
        }
        self.players.push(player);
        for &outcome in &self.outcomes {
            if let Some(o) = self.outcome_arena.get_mut(outcome) {
                o.payoffs.push(Number::zero());
            }
        }
        self.bump_structure("add player");
        Ok(player)
    }

    pub(crate) fn add_strategy(&mut self, player: Key, label: String) -> Result<Key> {
        self.require_table("add_strategy")?;
        if self.player_position(player).is_none() {
            return Err(GameError::StaleHandle("player"));
        }
        let old = self.strategy_lists();
        let strategy = self.strategy_arena.insert(StrategyData {
            label,
            player,
            choices: Vec::new(),
        });
        if let Some(p) = self.player_arena.get_mut(player) {
            p.strategies.push(strategy);
        }
        self.rebuild_results(&old);
        self.bump_structure("add strategy");
        Ok(strategy)
    }

    pub(crate) fn delete_strategy(&mut self, strategy: Key) -> Result<()> {
        self.require_table("delete_strategy")?;
        let player = self.strategy(strategy)?.player;
        let old = self.strategy_lists();
        let data = self
            .player_arena
            .get_mut(player)
            .ok_or(GameError::StaleHandle("player"))?;
        if data.strategies.len() <= 1 {
            return Err(GameError::InvalidArgument(
                "cannot delete the only strategy of a player".to_string(),
            ));
        }
        data.strategies.retain(|&s| s != strategy);
        self.strategy_arena.remove(strategy);
        self.rebuild_results(&old);
        self.bump_structure("delete strategy");
        Ok(())
    }

    /// Re-indexes the outcome table after the strategy lists changed.
    /// Cells whose strategies all survive keep their outcome; new cells are empty.
    fn rebuild_results(&mut self, old: &[Vec<Key>]) {
        let rebuilt = {
            let Some(Form::Table { results }) = &self.form else {
                return;
            };
            let old_counts: Vec<usize> = old.iter().map(Vec::len).collect();
            let lists = self.strategy_lists();
            let counts: Vec<usize> = lists.iter().map(Vec::len).collect();
            (0..contingency_count(&counts))
                .map(|index| {
                    let previous: Option<Vec<usize>> = decode(index, &counts)
                        .iter()
                        .enumerate()
                        .map(|(pl, &pos)| {
                            let key = lists[pl][pos];
                            old.get(pl)?.iter().position(|&k| k == key)
                        })
                        .collect();
                    previous.and_then(|p| results.get(encode(&p, &old_counts)).copied().flatten())
                })
                .collect()
        };
        if let Some(Form::Table { results }) = &mut self.form {
            *results = rebuilt;
        }
    }

    /// Derives pure strategies of a tree game from its infosets.
    pub(crate) fn ensure_strategies(&mut self) {
        let Some(Form::Tree {
            strategies_built, ..
        }) = &mut self.form
        else {
            return;
        };
        if *strategies_built {
            return;
        }
        *strategies_built = true;

        for player in self.players.clone() {
            let infosets = self
                .player_arena
                .get(player)
                .map(|p| p.infosets.clone())
                .unwrap_or_default();
            let counts: Vec<usize> = infosets
                .iter()
                .map(|&i| self.infoset_arena.get(i).map_or(0, |s| s.actions.len()))
                .collect();
            let strategies: Vec<Key> = (0..contingency_count(&counts))
                .map(|index| {
                    let choices = decode(index, &counts);
                    let label = choices.iter().map(|c| (c + 1).to_string()).collect();
                    self.strategy_arena.insert(StrategyData {
                        label,
                        player,
                        choices,
                    })
                })
                .collect();
            if let Some(p) = self.player_arena.get_mut(player) {
                p.strategies = strategies;
            }
        }
    }

    fn discard_tree_strategies(&mut self) {
        let Some(Form::Tree {
            strategies_built, ..
        }) = &mut self.form
        else {
            return;
        };
        if !*strategies_built {
            return;
        }
        *strategies_built = false;
        for &player in &self.players {
            if let Some(p) = self.player_arena.get_mut(player) {
                for strategy in p.strategies.drain(..) {
                    self.strategy_arena.remove(strategy);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Outcomes
    // ------------------------------------------------------------------

    pub(crate) fn add_outcome(&mut self, label: String) -> Key {
        let outcome = self.outcome_arena.insert(OutcomeData {
            label,
            payoffs: vec![Number::zero(); self.players.len()],
        });
        self.outcomes.push(outcome);
        outcome
    }

    pub(crate) fn delete_outcome(&mut self, outcome: Key) -> Result<()> {
        self.outcome(outcome)?;
        self.outcome_arena.remove(outcome);
        self.outcomes.retain(|&o| o != outcome);
        if let Some(Form::Table { results }) = &mut self.form {
            for cell in results.iter_mut().filter(|cell| **cell == Some(outcome)) {
                *cell = None;
            }
        }
        let attached: Vec<Key> = self
            .node_keys()
            .into_iter()
            .filter(|&n| self.node_arena.get(n).and_then(|d| d.outcome) == Some(outcome))
            .collect();
        for node in attached {
            if let Some(data) = self.node_arena.get_mut(node) {
                data.outcome = None;
            }
        }
        self.bump_content("delete outcome");
        Ok(())
    }

    pub(crate) fn set_payoff(&mut self, outcome: Key, player: usize, value: Number) -> Result<()> {
        let data = self
            .outcome_arena
            .get_mut(outcome)
            .ok_or(GameError::StaleHandle("outcome"))?;
        let slot = data
            .payoffs
            .get_mut(player)
            .ok_or_else(|| GameError::LookupBounds(format!("no player at position {}", player)))?;
        *slot = value;
        self.bump_content("set payoff");
        Ok(())
    }

    pub(crate) fn set_table_outcome(&mut self, index: usize, outcome: Option<Key>) -> Result<()> {
        if let Some(o) = outcome {
            self.outcome(o)?;
        }
        let Some(Form::Table { results }) = &mut self.form else {
            return Err(GameError::Uninitialized);
        };
        let cell = results
            .get_mut(index)
            .ok_or_else(|| GameError::LookupBounds(format!("no contingency {}", index)))?;
        *cell = outcome;
        self.bump_content("set table outcome");
        Ok(())
    }

    pub(crate) fn set_node_outcome(&mut self, node: Key, outcome: Option<Key>) -> Result<()> {
        self.require_tree("set_outcome")?;
        if let Some(o) = outcome {
            self.outcome(o)?;
        }
        self.node_mut(node)?.outcome = outcome;
        self.bump_content("set node outcome");
        Ok(())
    }

    fn payoff_vector(&self, outcome: Option<Key>) -> Vec<Number> {
        outcome
            .and_then(|o| self.outcome_arena.get(o))
            .map(|o| o.payoffs.clone())
            .unwrap_or_else(|| vec![Number::zero(); self.players.len()])
    }

    // ------------------------------------------------------------------
    // Tree construction
    // ------------------------------------------------------------------

    fn node_keys(&self) -> Vec<Key> {
        let Some(Form::Tree { root, .. }) = self.form else {
            return Vec::new();
        };
        let mut keys = Vec::with_capacity(self.node_arena.len());
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            keys.push(node);
            if let Some(data) = self.node_arena.get(node) {
                stack.extend(data.children.iter().rev());
            }
        }
        keys
    }

    pub(crate) fn append_move(&mut self, node: Key, player: Key, labels: Vec<String>) -> Result<Key> {
        let (_, chance) = self.require_tree("append_move")?;
        if labels.is_empty() {
            return Err(GameError::InvalidArgument(
                "a move needs at least one action".to_string(),
            ));
        }
        if !self.node(node)?.children.is_empty() {
            return Err(GameError::InvalidArgument(
                "moves can only be appended at terminal nodes".to_string(),
            ));
        }
        if player != chance && self.player_position(player).is_none() {
            return Err(GameError::StaleHandle("player"));
        }

        let uniform = Number::from(Rational::new(BigInt::one(), BigInt::from(labels.len())));
        let infoset = self.infoset_arena.insert(InfosetData {
            label: String::new(),
            player,
            actions: Vec::new(),
            members: vec![node],
        });
        let actions: Vec<Key> = labels
            .into_iter()
            .map(|label| {
                self.action_arena.insert(ActionData {
                    label,
                    infoset,
                    prob: (player == chance).then(|| uniform.clone()),
                })
            })
            .collect();
        let children = self.spawn_children(node, actions.len());
        if let Some(data) = self.infoset_arena.get_mut(infoset) {
            data.actions = actions;
        }
        if let Some(data) = self.node_arena.get_mut(node) {
            data.children = children;
            data.infoset = Some(infoset);
        }
        if let Some(data) = self.player_arena.get_mut(player) {
            data.infosets.push(infoset);
        }
        self.bump_structure("append move");
        Ok(infoset)
    }

    pub(crate) fn append_infoset(&mut self, node: Key, infoset: Key) -> Result<()> {
        self.require_tree("append_infoset")?;
        let count = self.infoset(infoset)?.actions.len();
        if !self.node(node)?.children.is_empty() {
            return Err(GameError::InvalidArgument(
                "moves can only be appended at terminal nodes".to_string(),
            ));
        }
        let children = self.spawn_children(node, count);
        if let Some(data) = self.node_arena.get_mut(node) {
            data.children = children;
            data.infoset = Some(infoset);
        }
        if let Some(data) = self.infoset_arena.get_mut(infoset) {
            data.members.push(node);
        }
        self.bump_structure("append infoset member");
        Ok(())
    }

    fn spawn_children(&mut self, parent: Key, count: usize) -> Vec<Key> {
        (0..count)
            .map(|_| {
                self.node_arena.insert(NodeData {
                    parent: Some(parent),
                    ..Default::default()
                })
            })
            .collect()
    }

    pub(crate) fn add_action(&mut self, infoset: Key, label: String) -> Result<Key> {
        let (_, chance) = self.require_tree("add_action")?;
        let data = self.infoset(infoset)?;
        let members = data.members.clone();
        let is_chance = data.player == chance;
        let action = self.action_arena.insert(ActionData {
            label,
            infoset,
            prob: is_chance.then(Number::zero),
        });
        if let Some(data) = self.infoset_arena.get_mut(infoset) {
            data.actions.push(action);
        }
        for member in members {
            let child = self.node_arena.insert(NodeData {
                parent: Some(member),
                ..Default::default()
            });
            self.node_mut(member)?.children.push(child);
        }
        self.bump_structure("add action");
        Ok(action)
    }

    pub(crate) fn delete_action(&mut self, action: Key) -> Result<()> {
        self.require_tree("delete_action")?;
        let infoset = self.action(action)?.infoset;
        let (position, members) = {
            let data = self.infoset(infoset)?;
            if data.actions.len() <= 1 {
                return Err(GameError::InvalidArgument(
                    "cannot delete the only action at an infoset".to_string(),
                ));
            }
            let position = data
                .actions
                .iter()
                .position(|&a| a == action)
                .ok_or(GameError::StaleHandle("action"))?;
            (position, data.members.clone())
        };

        for member in members {
            let Some(data) = self.node_arena.get_mut(member) else {
                continue;
            };
            if position < data.children.len() {
                let child = data.children.remove(position);
                self.remove_subtree(child);
            }
        }
        self.action_arena.remove(action);
        if let Some(data) = self.infoset_arena.get_mut(infoset) {
            data.actions.retain(|&a| a != action);
        }
        self.renormalize_chance(infoset);
        self.bump_structure("delete action");
        Ok(())
    }

    /// Removes everything below `node`, leaving it terminal.
    pub(crate) fn delete_tree(&mut self, node: Key) -> Result<()> {
        self.require_tree("delete_tree")?;
        let (children, infoset) = {
            let data = self.node_mut(node)?;
            (std::mem::take(&mut data.children), data.infoset.take())
        };
        if children.is_empty() && infoset.is_none() {
            return Ok(());
        }
        for child in children {
            self.remove_subtree(child);
        }
        if let Some(infoset) = infoset {
            self.leave_infoset(infoset, node);
        }
        self.bump_structure("delete tree");
        Ok(())
    }

    fn remove_subtree(&mut self, node: Key) {
        let Some(data) = self.node_arena.remove(node) else {
            return;
        };
        for child in data.children {
            self.remove_subtree(child);
        }
        if let Some(infoset) = data.infoset {
            self.leave_infoset(infoset, node);
        }
    }

    /// Drops `node` from the infoset; an infoset left without members is deleted.
    fn leave_infoset(&mut self, infoset: Key, node: Key) {
        let empty = match self.infoset_arena.get_mut(infoset) {
            Some(data) => {
                data.members.retain(|&m| m != node);
                data.members.is_empty()
            }
            None => return,
        };
        if !empty {
            return;
        }
        if let Some(data) = self.infoset_arena.remove(infoset) {
            for action in data.actions {
                self.action_arena.remove(action);
            }
            if let Some(player) = self.player_arena.get_mut(data.player) {
                player.infosets.retain(|&i| i != infoset);
            }
        }
    }

    /// Rescales chance probabilities to sum to one after an action was removed.
    fn renormalize_chance(&mut self, infoset: Key) {
        let Some(data) = self.infoset_arena.get(infoset) else {
            return;
        };
        let actions = data.actions.clone();
        let probs: Vec<Rational> = actions
            .iter()
            .filter_map(|&a| self.action_arena.get(a)?.prob.as_ref().map(|p| p.exact().clone()))
            .collect();
        if probs.len() != actions.len() {
            return;
        }
        let total = probs.iter().fold(Rational::zero(), |acc, p| acc + p);
        let count = Rational::from_integer(BigInt::from(actions.len()));
        for (action, prob) in actions.into_iter().zip(probs) {
            let value = if total.is_zero() {
                count.recip()
            } else {
                prob / &total
            };
            if let Some(a) = self.action_arena.get_mut(action) {
                a.prob = Some(Number::from(value));
            }
        }
    }

    pub(crate) fn set_chance_probs(&mut self, infoset: Key, probs: Vec<Number>) -> Result<()> {
        let (_, chance) = self.require_tree("set_chance_probs")?;
        let data = self.infoset(infoset)?;
        if data.player != chance {
            return Err(GameError::InvalidArgument(
                "probabilities can only be set at chance infosets".to_string(),
            ));
        }
        if probs.len() != data.actions.len() {
            return Err(GameError::InvalidArgument(format!(
                "expected {} probabilities, got {}",
                data.actions.len(),
                probs.len()
            )));
        }
        if probs.iter().any(|p| p.exact().is_negative()) {
            return Err(GameError::InvalidArgument(
                "chance probabilities must be non-negative".to_string(),
            ));
        }
        let total = probs.iter().fold(Rational::zero(), |acc, p| acc + p.exact());
        if !total.is_one() {
            return Err(GameError::InvalidArgument(format!(
                "chance probabilities sum to {}, not 1",
                total
            )));
        }
        let actions = data.actions.clone();
        for (action, prob) in actions.into_iter().zip(probs) {
            if let Some(a) = self.action_arena.get_mut(action) {
                a.prob = Some(prob);
            }
        }
        self.bump_content("set chance probabilities");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Payoffs of pure profiles
    // ------------------------------------------------------------------

    /// Payoffs of the contingency given by per-player strategy positions.
    pub(crate) fn contingency_payoffs(&self, positions: &[usize]) -> Result<Vec<Number>> {
        match self.form()? {
            Form::Table { results } => {
                let counts = self.strategy_counts();
                let outcome = results.get(encode(positions, &counts)).copied().flatten();
                Ok(self.payoff_vector(outcome))
            }
            Form::Tree { root, .. } => {
                let lists = self.strategy_lists();
                let choices = positions
                    .iter()
                    .enumerate()
                    .map(|(pl, &pos)| {
                        let key = lists[pl][pos];
                        Ok(self.strategy(key)?.choices.clone())
                    })
                    .collect::<Result<Vec<_>>>()?;
                let lookup = self.infoset_positions();
                let values = self.play(*root, &choices, &lookup)?;
                Ok(values.into_iter().map(Number::from).collect())
            }
        }
    }

    /// Payoffs of every contingency, first player's strategy varying fastest.
    pub(crate) fn pure_payoffs(&mut self) -> Result<Vec<Vec<Number>>> {
        self.form()?;
        self.ensure_strategies();
        let counts = self.strategy_counts();
        (0..contingency_count(&counts))
            .map(|index| self.contingency_payoffs(&decode(index, &counts)))
            .collect()
    }

    /// Expected payoffs below `node` when every player follows `choices`.
    fn play(
        &self,
        node: Key,
        choices: &[Vec<usize>],
        lookup: &FxHashMap<Key, (usize, usize)>,
    ) -> Result<Vec<Rational>> {
        let data = self.node(node)?;
        let mut values: Vec<Rational> = self
            .payoff_vector(data.outcome)
            .iter()
            .map(|n| n.exact().clone())
            .collect();
        let Some(infoset) = data.infoset else {
            return Ok(values);
        };

        let below = match lookup.get(&infoset) {
            Some(&(pl, index)) => {
                let child = data.children[choices[pl][index]];
                self.play(child, choices, lookup)?
            }
            None => {
                let actions = &self.infoset(infoset)?.actions;
                let mut expected = vec![Rational::zero(); values.len()];
                for (&action, &child) in actions.iter().zip(&data.children) {
                    let prob = self
                        .action(action)?
                        .prob
                        .as_ref()
                        .map(|p| p.exact().clone())
                        .unwrap_or_else(Rational::zero);
                    if prob.is_zero() {
                        continue;
                    }
                    for (sum, value) in expected.iter_mut().zip(self.play(child, choices, lookup)?) {
                        *sum += &prob * value;
                    }
                }
                expected
            }
        };
        for (value, extra) in values.iter_mut().zip(below) {
            *value += extra;
        }
        Ok(values)
    }

    pub(crate) fn min_max_payoff(&self) -> Option<(Number, Number)> {
        let mut payoffs = self
            .outcomes
            .iter()
            .filter_map(|&o| self.outcome_arena.get(o))
            .flat_map(|o| o.payoffs.iter());
        let first = payoffs.next()?.clone();
        Some(payoffs.fold((first.clone(), first), |(lo, hi), p| {
            (lo.min(p.clone()), hi.max(p.clone()))
        }))
    }

    pub(crate) fn is_const_sum(&self) -> bool {
        let sum = |payoffs: &[Number]| {
            payoffs
                .iter()
                .fold(Rational::zero(), |acc, p| acc + p.exact())
        };
        let sums: Vec<Rational> = match &self.form {
            Some(Form::Table { results }) => results
                .iter()
                .map(|&cell| sum(&self.payoff_vector(cell)))
                .collect(),
            _ => self
                .outcomes
                .iter()
                .filter_map(|&o| self.outcome_arena.get(o))
                .map(|o| sum(&o.payoffs))
                .collect(),
        };
        sums.windows(2).all(|pair| pair[0] == pair[1])
    }
}
