//! Mixed strategy profiles.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use num_traits::Zero;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::game::{
    contingency_count, decode, Game, GameData, GameError, Handle, Key, Player, Result, Stamp,
    Strategy, WeakShared,
};
use crate::profile::scalar::{max_of, sum_of};
use crate::profile::{checked, foreign, player_index, LiapConfig, Scalar};

/// A probability distribution over each player's pure strategies.
///
/// Created by [`Game::mixed_strategy_profile`]; starts at the centroid.
/// Works for tables and trees (over the tree's derived pure strategies).
#[derive(Debug, Clone)]
pub struct MixedStrategyProfile<T: Scalar> {
    game: WeakShared,
    stamp: Stamp,
    strategies: Vec<Vec<Key>>,
    probs: Vec<Vec<T>>,
    index: FxHashMap<Key, (usize, usize)>,
    config: LiapConfig,
}

/// Expected value of every pure strategy against the rest of the profile.
struct Evaluation<T> {
    values: Vec<Vec<T>>,
    payoffs: Vec<T>,
}

/// Serializable snapshot of a mixed strategy profile.
///
/// Keys are 1-based player numbers; probabilities are rendered as text so
/// exact profiles survive the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfileExport {
    /// Player labels.
    pub players: FxHashMap<String, String>,
    /// Strategy labels per player.
    pub strategy_names: FxHashMap<String, Vec<String>>,
    /// Probabilities per player.
    pub probs: FxHashMap<String, Vec<String>>,
}

impl StrategyProfileExport {
    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

impl Game {
    /// A mixed strategy profile at the centroid: every player mixes
    /// uniformly over their strategies.
    ///
    /// Choose `f64` or [`Rational`](crate::Rational) as the scalar.
    pub fn mixed_strategy_profile<T: Scalar>(&self) -> Result<MixedStrategyProfile<T>> {
        let mut data = self.shared().borrow_mut();
        data.form()?;
        data.ensure_strategies();
        let strategies = data.strategy_lists();
        let probs = strategies
            .iter()
            .map(|list| vec![T::ratio(1, list.len()); list.len()])
            .collect();
        log::trace!(
            "mixed strategy profile over {:?} strategies",
            data.strategy_counts()
        );
        Ok(MixedStrategyProfile::from_parts(
            self.downgrade(),
            data.stamp(),
            strategies,
            probs,
        ))
    }
}

impl<T: Scalar> MixedStrategyProfile<T> {
    pub(crate) fn from_parts(
        game: WeakShared,
        stamp: Stamp,
        strategies: Vec<Vec<Key>>,
        probs: Vec<Vec<T>>,
    ) -> Self {
        let index = strategies
            .iter()
            .enumerate()
            .flat_map(|(pl, list)| {
                list.iter()
                    .enumerate()
                    .map(move |(st, &key)| (key, (pl, st)))
            })
            .collect();
        Self {
            game,
            stamp,
            strategies,
            probs,
            index,
            config: LiapConfig::default(),
        }
    }

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

    fn locate(&self, strategy: &Strategy) -> Result<(usize, usize)> {
        if !std::rc::Weak::ptr_eq(strategy.weak(), &self.game) {
            return Err(foreign(strategy));
        }
        self.index
            .get(&strategy.key())
            .copied()
            .ok_or_else(|| foreign(strategy))
    }

    /// Probability of `strategy`.
    pub fn prob(&self, strategy: &Strategy) -> Result<T> {
        let (pl, st) = self.locate(strategy)?;
        Ok(self.probs[pl][st].clone())
    }

    /// Sets the probability of `strategy`. Values are not checked; see
    /// [`normalize`](Self::normalize).
    pub fn set_prob(&mut self, strategy: &Strategy, value: T) -> Result<()> {
        let (pl, st) = self.locate(strategy)?;
        self.probs[pl][st] = value;
        Ok(())
    }

    /// All probabilities of `player`, in strategy order.
    pub fn player_probs(&self, player: &Player) -> Result<Vec<T>> {
        let shared = self
            .game
            .upgrade()
            .ok_or(GameError::GameDropped("profile"))?;
        let pl = player_index(&shared, &self.game, player)?;
        self.probs
            .get(pl)
            .cloned()
            .ok_or_else(|| foreign(player))
    }

    /// Rescales each player's probabilities to sum to one. A player whose
    /// probabilities sum to zero is reset to the uniform mix.
    pub fn normalize(&mut self) {
        for probs in &mut self.probs {
            let total = sum_of(probs.iter());
            if total.is_zero() {
                let uniform = T::ratio(1, probs.len());
                probs.iter_mut().for_each(|p| *p = uniform.clone());
            } else {
                probs.iter_mut().for_each(|p| *p = p.clone() / total.clone());
            }
        }
    }

    fn evaluate(&self) -> Result<Evaluation<T>> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        self.evaluate_with(&data)
    }

    fn evaluate_with(&self, data: &GameData) -> Result<Evaluation<T>> {
        let counts: Vec<usize> = self.strategies.iter().map(Vec::len).collect();
        let players = counts.len();
        let mut values: Vec<Vec<T>> = counts.iter().map(|&n| vec![T::zero(); n]).collect();

        for index in 0..contingency_count(&counts) {
            let positions = decode(index, &counts);
            // Weight of the contingency with each player's own choice left out.
            let weights: Vec<T> = (0..players)
                .map(|pl| {
                    positions
                        .iter()
                        .enumerate()
                        .filter(|&(other, _)| other != pl)
                        .fold(T::one(), |acc, (other, &st)| {
                            acc * self.probs[other][st].clone()
                        })
                })
                .collect();
            if weights.iter().all(Zero::is_zero) {
                continue;
            }
            let payoffs = data.contingency_payoffs(&positions)?;
            for (pl, weight) in weights.into_iter().enumerate() {
                if weight.is_zero() {
                    continue;
                }
                let slot = &mut values[pl][positions[pl]];
                *slot = slot.clone() + weight * T::from_number(&payoffs[pl]);
            }
        }

        let payoffs = values
            .iter()
            .zip(&self.probs)
            .map(|(values, probs)| {
                values
                    .iter()
                    .zip(probs)
                    .fold(T::zero(), |acc, (v, p)| acc + v.clone() * p.clone())
            })
            .collect();
        Ok(Evaluation { values, payoffs })
    }

    /// Expected payoff to `player`.
    ///
    /// Fails with [`GameError::StructureChanged`] if the game was edited
    /// after the profile was created.
    pub fn payoff(&self, player: &Player) -> Result<T> {
        let shared = checked(&self.game, self.stamp)?;
        let pl = player_index(&shared, &self.game, player)?;
        let eval = self.evaluate_with(&shared.borrow())?;
        Ok(eval.payoffs[pl].clone())
    }

    /// Expected payoff to the owner of `strategy` when they play it and
    /// everyone else follows the profile.
    pub fn strategy_value(&self, strategy: &Strategy) -> Result<T> {
        let eval = self.evaluate()?;
        let (pl, st) = self.locate(strategy)?;
        Ok(eval.values[pl][st].clone())
    }

    /// Shortfall of `strategy` against its owner's best pure reply.
    pub fn regret(&self, strategy: &Strategy) -> Result<T> {
        let eval = self.evaluate()?;
        let (pl, st) = self.locate(strategy)?;
        let best = max_of(eval.values[pl].iter().cloned()).unwrap_or_else(T::zero);
        Ok(best - eval.values[pl][st].clone())
    }

    /// Largest gain any player could get by switching to a best pure reply.
    pub fn max_regret(&self) -> Result<T> {
        let eval = self.evaluate()?;
        let gains = eval
            .values
            .iter()
            .zip(&eval.payoffs)
            .filter_map(|(values, payoff)| {
                max_of(values.iter().cloned()).map(|best| best - payoff.clone())
            });
        Ok(max_of(gains).map_or_else(T::zero, |g| if g.is_negative() { T::zero() } else { g }))
    }

    /// Liapunov value: zero exactly when the profile is a Nash equilibrium.
    ///
    /// Sums the squared positive gains of every pure strategy over its
    /// owner's payoff, plus penalties for negative probabilities and for
    /// players whose probabilities do not sum to one.
    pub fn liap_value(&self) -> Result<T> {
        let eval = self.evaluate()?;
        let negative = T::from_f64(self.config.negative_penalty);
        let off_simplex = T::from_f64(self.config.sum_penalty);
        let mut total = T::zero();
        for ((values, payoff), probs) in eval.values.iter().zip(&eval.payoffs).zip(&self.probs) {
            for value in values {
                let gain = value.clone() - payoff.clone();
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
        Ok(total)
    }

    /// A serializable snapshot with the game's labels.
    pub fn export(&self) -> Result<StrategyProfileExport> {
        let shared = checked(&self.game, self.stamp)?;
        let data = shared.borrow();
        let mut export = StrategyProfileExport {
            players: FxHashMap::default(),
            strategy_names: FxHashMap::default(),
            probs: FxHashMap::default(),
        };
        for (pl, (&player, keys)) in data.players.iter().zip(&self.strategies).enumerate() {
            let key = (pl + 1).to_string();
            export
                .players
                .insert(key.clone(), data.player(player)?.label.clone());
            let names = keys
                .iter()
                .map(|&s| Ok(data.strategy(s)?.label.clone()))
                .collect::<Result<Vec<_>>>()?;
            export.strategy_names.insert(key.clone(), names);
            export
                .probs
                .insert(key, self.probs[pl].iter().map(T::to_string).collect());
        }
        Ok(export)
    }
}

impl MixedStrategyProfile<f64> {
    /// A profile drawn uniformly from each player's simplex.
    pub fn random<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Result<Self> {
        let mut profile = game.mixed_strategy_profile::<f64>()?;
        for probs in &mut profile.probs {
            // Normalized exponentials are uniform on the simplex.
            probs
                .iter_mut()
                .for_each(|p| *p = -(1.0 - rng.gen::<f64>()).ln());
        }
        profile.normalize();
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{matching_pennies, prisoners_dilemma};
    use crate::Rational;
    use num_bigint::BigInt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rational(num: i64, den: i64) -> Rational {
        Rational::new(BigInt::from(num), BigInt::from(den))
    }

    #[test]
    fn test_centroid_payoffs() {
        let game = prisoners_dilemma().unwrap();
        let profile = game.mixed_strategy_profile::<Rational>().unwrap();
        let players = game.players().unwrap();
        // (-1 - 3 + 0 - 2) / 4
        assert_eq!(profile.payoff(&players[0]).unwrap(), rational(-3, 2));
        assert_eq!(profile.payoff(&players[1]).unwrap(), rational(-3, 2));
    }

    #[test]
    fn test_pure_equilibrium_has_zero_liap() {
        let game = prisoners_dilemma().unwrap();
        let mut profile = game.mixed_strategy_profile::<f64>().unwrap();
        for player in game.players().unwrap() {
            let strategies = player.strategies().unwrap();
            profile.set_prob(&strategies[0], 0.0).unwrap();
            profile.set_prob(&strategies[1], 1.0).unwrap();
        }
        assert_eq!(profile.liap_value().unwrap(), 0.0);
        assert_eq!(profile.max_regret().unwrap(), 0.0);
    }

    #[test]
    fn test_matching_pennies_centroid_is_equilibrium() {
        let game = matching_pennies().unwrap();
        let profile = game.mixed_strategy_profile::<Rational>().unwrap();
        assert!(profile.liap_value().unwrap().is_zero());

        let mut skewed = profile.clone();
        let heads = game.player(0).unwrap().strategy(0).unwrap();
        let tails = game.player(0).unwrap().strategy(1).unwrap();
        skewed.set_prob(&heads, rational(3, 4)).unwrap();
        skewed.set_prob(&tails, rational(1, 4)).unwrap();
        assert!(skewed.liap_value().unwrap() > Rational::zero());
        let matcher = game.player(1).unwrap().strategy(0).unwrap();
        assert_eq!(skewed.strategy_value(&matcher).unwrap(), rational(-1, 2));
        assert_eq!(skewed.regret(&matcher).unwrap(), rational(1, 1));
    }

    #[test]
    fn test_penalties_apply_off_the_simplex() {
        let game = Game::new_table(&[2]);
        let mut profile = game.mixed_strategy_profile::<Rational>().unwrap();
        let strategy = game.player(0).unwrap().strategy(0).unwrap();
        profile.set_prob(&strategy, rational(-1, 2)).unwrap();
        // negative: 100 * 1/4, sum 0 → 100 * 1
        assert_eq!(profile.liap_value().unwrap(), rational(125, 1));
        let unpenalized = profile.with_liap_config(LiapConfig::unpenalized());
        assert!(unpenalized.liap_value().unwrap().is_zero());
    }

    #[test]
    fn test_normalize_restores_the_simplex() {
        let game = Game::new_table(&[3]);
        let mut profile = game.mixed_strategy_profile::<Rational>().unwrap();
        let strategies = game.player(0).unwrap().strategies().unwrap();
        for strategy in &strategies {
            profile.set_prob(strategy, Rational::zero()).unwrap();
        }
        profile.set_prob(&strategies[2], rational(2, 1)).unwrap();
        profile.normalize();
        assert_eq!(profile.prob(&strategies[2]).unwrap(), rational(1, 1));
    }

    #[test]
    fn test_random_profiles_lie_on_the_simplex() {
        let game = Game::new_table(&[3, 4]);
        let mut rng = StdRng::seed_from_u64(7);
        let profile = MixedStrategyProfile::<f64>::random(&game, &mut rng).unwrap();
        for player in game.players().unwrap() {
            let probs = profile.player_probs(&player).unwrap();
            assert!(probs.iter().all(|&p| p >= 0.0));
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_strategies_of_other_games_are_rejected() {
        let game = Game::new_table(&[2]);
        let other = Game::new_table(&[2]);
        let profile = game.mixed_strategy_profile::<f64>().unwrap();
        let strategy = other.player(0).unwrap().strategy(0).unwrap();
        assert!(matches!(
            profile.prob(&strategy),
            Err(GameError::LookupBounds(_))
        ));
    }

    #[test]
    fn test_export_round_trips_through_json() {
        let game = prisoners_dilemma().unwrap();
        let profile = game.mixed_strategy_profile::<Rational>().unwrap();
        let export = profile.export().unwrap();
        assert_eq!(export.probs["1"], vec!["1/2", "1/2"]);
        assert_eq!(export.strategy_names["2"], vec!["Cooperate", "Defect"]);
        let json = serde_json::to_string(&export).unwrap();
        let back: StrategyProfileExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, export);
    }

    #[test]
    fn test_export_saves_json() {
        let game = matching_pennies().unwrap();
        let export = game.mixed_strategy_profile::<f64>().unwrap().export().unwrap();
        let path = std::env::temp_dir().join("finite_games_export_test.json");
        export.save_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: StrategyProfileExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.players["1"], "Matcher");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_profile_fails_after_game_dropped() {
        let game = Game::new_table(&[2]);
        let profile = game.mixed_strategy_profile::<f64>().unwrap();
        drop(game);
        assert_eq!(
            profile.liap_value(),
            Err(GameError::GameDropped("profile"))
        );
    }
}
