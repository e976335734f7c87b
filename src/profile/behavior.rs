//! Mixed behavior profiles on game trees.
//!
//! Evaluation is a single depth-first pass that records, for every node,
//! the probability of reaching it and the expected payoff vector of the
//! subgame below it. Beliefs, action values and the Liapunov value are all
//! read off that pass.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::rc::Weak;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::game::{
    Action, Game, GameData, GameError, Handle, Infoset, Key, Node, Player, Result, Stamp,
    WeakShared,
};
use crate::profile::scalar::{max_of, sum_of};
use crate::profile::{checked, foreign, player_index, LiapConfig, MixedStrategyProfile, Scalar};

/// A probability distribution over the actions at each personal
/// information set of a tree game.
///
/// Chance probabilities are read from the game at evaluation time.
#[derive(Debug, Clone)]
pub struct MixedBehaviorProfile<T: Scalar> {
    game: WeakShared,
    stamp: Stamp,
    /// `probs[player][infoset][action]`
    probs: Vec<Vec<Vec<T>>>,
    infosets: FxHashMap<Key, (usize, usize)>,
    actions: FxHashMap<Key, (usize, usize, usize)>,
    config: LiapConfig,
}

struct TreeEval<T> {
    reach: FxHashMap<Key, T>,
    values: FxHashMap<Key, Vec<T>>,
}

/// Serializable snapshot of a mixed behavior profile.
///
/// Infosets are keyed `"<player>:<infoset>"`, both 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfileExport {
    /// Infoset labels.
    pub infosets: FxHashMap<String, String>,
    /// Action labels per infoset.
    pub action_names: FxHashMap<String, Vec<String>>,
    /// Probabilities per infoset.
    pub probs: FxHashMap<String, Vec<String>>,
}

impl BehaviorProfileExport {
    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

impl Game {
    /// A mixed behavior profile at the centroid: every action of an
    /// infoset with `k` actions gets probability `1/k`. Tree games only.
    pub fn mixed_behavior_profile<T: Scalar>(&self) -> Result<MixedBehaviorProfile<T>> {
        let data = self.shared().borrow();
        data.require_tree("mixed_behavior_profile")?;
        let mut probs = Vec::with_capacity(data.players.len());
        let mut infosets = FxHashMap::default();
        let mut actions = FxHashMap::default();
        for (pl, &player) in data.players.iter().enumerate() {
            let mut player_probs = Vec::new();
            for (iset, &infoset) in data.player(player)?.infosets.iter().enumerate() {
                let keys = &data.infoset(infoset)?.actions;
                infosets.insert(infoset, (pl, iset));
                for (act, &action) in keys.iter().enumerate() {
                    actions.insert(action, (pl, iset, act));
                }
                player_probs.push(vec![T::ratio(1, keys.len()); keys.len()]);
            }
            probs.push(player_probs);
        }
        log::trace!(
            "mixed behavior profile over {} infosets",
            infosets.len()
        );
        Ok(MixedBehaviorProfile {
            game: self.downgrade(),
            stamp: data.stamp(),
            probs,
            infosets,
            actions,
            config: LiapConfig::default(),
        })
    }
}

impl<T: Scalar> MixedBehaviorProfile<T> {
    /// Replaces the Liapunov penalty weights.
    pub fn with_liap_config(mut self, config: LiapConfig) -> Self {
        self.config = config;
        self
    }

    /// The Liapunov penalty weights in use.
    pub fn liap_config(&self) -> &LiapConfig {
        &self.config
    }

    /// The game this profile was created for.
    pub fn game(&self) -> Result<Game> {
        self.game
            .upgrade()
            .map(Game::from_shared)
            .ok_or(GameError::GameDropped("profile"))
    }

    /// Returns true while the game has not changed since the profile was created.
    pub fn is_current(&self) -> bool {
        checked(&self.game, self.stamp).is_ok()
    }

    fn same_game<H: Handle>(&self, handle: &H) -> Result<()> {
        if Weak::ptr_eq(handle.weak(), &self.game) {
            Ok(())
        } else {
            Err(foreign(handle))
        }
    }

    fn locate_action(&self, action: &Action) -> Result<(usize, usize, usize)> {
        self.same_game(action)?;
        self.actions
            .get(&action.key())
            .copied()
            .ok_or_else(|| foreign(action))
    }

    fn locate_infoset(&self, infoset: &Infoset) -> Result<(usize, usize)> {
        self.same_game(infoset)?;
        self.infosets
            .get(&infoset.key())
            .copied()
            .ok_or_else(|| foreign(infoset))
    }

    /// Probability of a personal action.
    pub fn action_prob(&self, action: &Action) -> Result<T> {
        let (pl, iset, act) = self.locate_action(action)?;
        Ok(self.probs[pl][iset][act].clone())
    }

    /// Sets the probability of a personal action. Values are not checked;
    /// see [`normalize`](Self::normalize).
    pub fn set_action_prob(&mut self, action: &Action, value: T) -> Result<()> {
        let (pl, iset, act) = self.locate_action(action)?;
        self.probs[pl][iset][act] = value;
        Ok(())
    }

    /// Rescales the probabilities at each infoset to sum to one. An infoset
    /// whose probabilities sum to zero is reset to the uniform mix.
    pub fn normalize(&mut self) {
        for probs in self.probs.iter_mut().flatten() {
            let total = sum_of(probs.iter());
            if total.is_zero() {
                let uniform = T::ratio(1, probs.len());
                probs.iter_mut().for_each(|p| *p = uniform.clone());
            } else {
                probs.iter_mut().for_each(|p| *p = p.clone() / total.clone());
            }
        }
    }

    /// Probability of taking the `position`-th action at `infoset`.
    fn move_prob(&self, data: &GameData, infoset: Key, position: usize) -> Result<T> {
        if let Some(&(pl, iset)) = self.infosets.get(&infoset) {
            return Ok(self.probs[pl][iset]
                .get(position)
                .cloned()
                .unwrap_or_else(T::zero));
        }
        let action = data
            .infoset(infoset)?
            .actions
            .get(position)
            .copied()
            .ok_or(GameError::StaleHandle("action"))?;
        Ok(data
            .action(action)?
            .prob
            .as_ref()
            .map_or_else(T::zero, T::from_number))
    }

    fn evaluate(&self) -> Result<TreeEval<T>> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        let (root, _) = data.require_tree("behavior profile evaluation")?;
        let mut eval = TreeEval {
            reach: FxHashMap::default(),
            values: FxHashMap::default(),
        };
        self.walk(&data, root, T::one(), &mut eval)?;
        Ok(eval)
    }

    fn walk(&self, data: &GameData, node: Key, reach: T, eval: &mut TreeEval<T>) -> Result<Vec<T>> {
        let node_data = data.node(node)?;
        let mut value: Vec<T> = match node_data.outcome {
            Some(outcome) => data
                .outcome(outcome)?
                .payoffs
                .iter()
                .map(T::from_number)
                .collect(),
            None => vec![T::zero(); self.probs.len()],
        };
        if let Some(infoset) = node_data.infoset {
            for (position, &child) in node_data.children.iter().enumerate() {
                let prob = self.move_prob(data, infoset, position)?;
                let below = self.walk(data, child, reach.clone() * prob.clone(), eval)?;
                for (v, b) in value.iter_mut().zip(below) {
                    *v = v.clone() + prob.clone() * b;
                }
            }
        }
        eval.reach.insert(node, reach);
        eval.values.insert(node, value.clone());
        Ok(value)
    }

    fn members(&self, infoset: &Infoset) -> Result<Vec<Key>> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        Ok(data.infoset(infoset.key())?.members.clone())
    }

    fn children_of(&self, node: Key) -> Result<Vec<Key>> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        Ok(data.node(node)?.children.clone())
    }

    /// Expected payoff to `player`.
    ///
    /// Fails with [`GameError::StructureChanged`] if the game was edited
    /// after the profile was created.
    pub fn payoff(&self, player: &Player) -> Result<T> {
        let shared = checked(&self.game, self.stamp)?;
        let pl = player_index(&shared, &self.game, player)?;
        let (root, _) = shared.borrow().require_tree("payoff")?;
        let eval = self.evaluate()?;
        Ok(eval.values[&root][pl].clone())
    }

    /// Probability that play reaches `node`.
    pub fn realiz_prob(&self, node: &Node) -> Result<T> {
        self.same_game(node)?;
        let eval = self.evaluate()?;
        eval.reach
            .get(&node.key())
            .cloned()
            .ok_or(GameError::StaleHandle("node"))
    }

    /// Probability that play reaches some member of `infoset`.
    pub fn infoset_prob(&self, infoset: &Infoset) -> Result<T> {
        self.same_game(infoset)?;
        let members = self.members(infoset)?;
        let eval = self.evaluate()?;
        Ok(infoset_reach(&eval, &members))
    }

    /// Conditional probability of `node` given that its infoset is reached.
    /// At an unreached infoset all members are equally likely.
    pub fn belief(&self, node: &Node) -> Result<T> {
        self.same_game(node)?;
        let infoset = node.infoset()?.ok_or_else(|| {
            GameError::InvalidArgument("terminal nodes have no belief".to_string())
        })?;
        let members = self.members(&infoset)?;
        let position = members
            .iter()
            .position(|&m| m == node.key())
            .ok_or(GameError::StaleHandle("node"))?;
        let eval = self.evaluate()?;
        Ok(beliefs(&eval, &members).swap_remove(position))
    }

    /// Expected payoff to `player` in the subgame below `node`, including
    /// the outcome attached at `node` itself.
    pub fn node_value(&self, player: &Player, node: &Node) -> Result<T> {
        self.same_game(node)?;
        let shared = checked(&self.game, self.stamp)?;
        let pl = player_index(&shared, &self.game, player)?;
        let eval = self.evaluate()?;
        eval.values
            .get(&node.key())
            .map(|v| v[pl].clone())
            .ok_or(GameError::StaleHandle("node"))
    }

    /// Expected payoff to the mover of `action`'s infoset after taking it,
    /// weighting members by belief.
    pub fn action_value(&self, action: &Action) -> Result<T> {
        let (pl, _, act) = self.locate_action(action)?;
        let infoset = action.infoset()?;
        let members = self.members(&infoset)?;
        let eval = self.evaluate()?;
        self.action_value_with(&eval, &members, pl, act)
    }

    fn action_value_with(&self, eval: &TreeEval<T>, members: &[Key], pl: usize, act: usize) -> Result<T> {
        let mut value = T::zero();
        for (belief, &member) in beliefs(eval, members).into_iter().zip(members) {
            let child = self
                .children_of(member)?
                .get(act)
                .copied()
                .ok_or(GameError::StaleHandle("node"))?;
            let below = eval.values.get(&child).ok_or(GameError::StaleHandle("node"))?;
            value = value + belief * below[pl].clone();
        }
        Ok(value)
    }

    /// Expected payoff to the mover of `infoset` once it is reached.
    pub fn infoset_value(&self, infoset: &Infoset) -> Result<T> {
        let (pl, iset) = self.locate_infoset(infoset)?;
        let members = self.members(infoset)?;
        let eval = self.evaluate()?;
        let mut value = T::zero();
        for (act, prob) in self.probs[pl][iset].iter().enumerate() {
            value = value + prob.clone() * self.action_value_with(&eval, &members, pl, act)?;
        }
        Ok(value)
    }

    /// Shortfall of `action` against the best action at its infoset.
    pub fn regret(&self, action: &Action) -> Result<T> {
        let (pl, iset, act) = self.locate_action(action)?;
        let infoset = action.infoset()?;
        let members = self.members(&infoset)?;
        let eval = self.evaluate()?;
        let values = (0..self.probs[pl][iset].len())
            .map(|a| self.action_value_with(&eval, &members, pl, a))
            .collect::<Result<Vec<T>>>()?;
        let best = max_of(values.iter().cloned()).unwrap_or_else(T::zero);
        Ok(best - values[act].clone())
    }

    /// Liapunov value: zero exactly when no player gains by switching
    /// actions at an infoset reached with positive probability.
    ///
    /// Each personal action contributes the square of its positive gain
    /// over the infoset value, weighted by the infoset's probability.
    /// Negative probabilities and infosets whose probabilities do not sum
    /// to one are penalized.
    pub fn liap_value(&self) -> Result<T> {
        let eval = self.evaluate()?;
        let negative = T::from_f64(self.config.negative_penalty);
        let off_simplex = T::from_f64(self.config.sum_penalty);
        let shared = checked(&self.game, self.stamp)?;
        let mut members_of: FxHashMap<(usize, usize), Vec<Key>> = FxHashMap::default();
        {
            let data = shared.borrow();
            for (&infoset, &position) in &self.infosets {
                members_of.insert(position, data.infoset(infoset)?.members.clone());
            }
        }

        let mut total = T::zero();
        for (pl, player_probs) in self.probs.iter().enumerate() {
            for (iset, probs) in player_probs.iter().enumerate() {
                let members = members_of.get(&(pl, iset)).cloned().unwrap_or_default();
                let reach = infoset_reach(&eval, &members);
                let values = (0..probs.len())
                    .map(|act| self.action_value_with(&eval, &members, pl, act))
                    .collect::<Result<Vec<T>>>()?;
                let infoset_value = values
                    .iter()
                    .zip(probs)
                    .fold(T::zero(), |acc, (v, p)| acc + v.clone() * p.clone());
                for value in &values {
                    let gain = reach.clone() * (value.clone() - infoset_value.clone());
                    if gain.is_positive() {
                        total = total + gain.square();
                    }
                }
                for p in probs.iter().filter(|p| p.is_negative()) {
                    total = total + negative.clone() * p.square();
                }
                let sum = sum_of(probs.iter()) - T::one();
                total = total + off_simplex.clone() * sum.square();
            }
        }
        Ok(total)
    }

    /// The equivalent mixed strategy profile: each pure strategy gets the
    /// product of the probabilities of the actions it picks.
    pub fn as_strategy(&self) -> Result<MixedStrategyProfile<T>> {
        let shared = checked(&self.game, self.stamp)?;
        let mut data = shared.borrow_mut();
        data.ensure_strategies();
        let strategies = data.strategy_lists();
        let probs = strategies
            .iter()
            .enumerate()
            .map(|(pl, keys)| {
                keys.iter()
                    .map(|&key| {
                        let choices = &data.strategy(key)?.choices;
                        Ok(choices
                            .iter()
                            .enumerate()
                            .fold(T::one(), |acc, (iset, &act)| {
                                acc * self.probs[pl][iset][act].clone()
                            }))
                    })
                    .collect::<Result<Vec<T>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MixedStrategyProfile::from_parts(
            self.game.clone(),
            data.stamp(),
            strategies,
            probs,
        )
        .with_liap_config(self.config.clone()))
    }

    /// A serializable snapshot with the game's labels.
    pub fn export(&self) -> Result<BehaviorProfileExport> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        let mut export = BehaviorProfileExport {
            infosets: FxHashMap::default(),
            action_names: FxHashMap::default(),
            probs: FxHashMap::default(),
        };
        for (&infoset, &(pl, iset)) in &self.infosets {
            let key = format!("{}:{}", pl + 1, iset + 1);
            let info = data.infoset(infoset)?;
            export.infosets.insert(key.clone(), info.label.clone());
            let names = info
                .actions
                .iter()
                .map(|&a| Ok(data.action(a)?.label.clone()))
                .collect::<Result<Vec<_>>>()?;
            export.action_names.insert(key.clone(), names);
            export
                .probs
                .insert(key, self.probs[pl][iset].iter().map(T::to_string).collect());
        }
        Ok(export)
    }
}

impl MixedBehaviorProfile<f64> {
    /// A profile drawn uniformly from the simplex at each infoset.
    pub fn random<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Result<Self> {
        let mut profile = game.mixed_behavior_profile::<f64>()?;
        for probs in profile.probs.iter_mut().flatten() {
            probs
                .iter_mut()
                .for_each(|p| *p = -(1.0 - rng.gen::<f64>()).ln());
        }
        profile.normalize();
        Ok(profile)
    }
}

fn infoset_reach<T: Scalar>(eval: &TreeEval<T>, members: &[Key]) -> T {
    members
        .iter()
        .filter_map(|m| eval.reach.get(m))
        .fold(T::zero(), |acc, r| acc + r.clone())
}

fn beliefs<T: Scalar>(eval: &TreeEval<T>, members: &[Key]) -> Vec<T> {
    let total = infoset_reach(eval, members);
    if total.is_zero() {
        return vec![T::ratio(1, members.len()); members.len()];
    }
    members
        .iter()
        .map(|m| {
            eval.reach
                .get(m)
                .map_or_else(T::zero, |r| r.clone() / total.clone())
        })
        .collect()
}
