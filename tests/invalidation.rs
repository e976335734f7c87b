//! Profiles refuse to compute once their game has been edited.

use finite_games::games::{basic_extensive_game, kuhn::kuhn_poker};
use finite_games::{Game, GameError, PayoffArray, Rational, Scalar};

fn coordination() -> Game {
    let a = PayoffArray::from_rows(vec![vec![2, 2], vec![0, 0]]).unwrap();
    let b = PayoffArray::from_rows(vec![vec![0, 0], vec![1, 1]]).unwrap();
    Game::from_arrays(vec![a, b]).unwrap()
}

fn strategy_profile_survives_until_deletion<T: Scalar>() {
    let game = Game::new_table(&[2, 2]);
    let profile = game.mixed_strategy_profile::<T>().unwrap();
    let player = game.player(0).unwrap();
    assert!(profile.payoff(&player).is_ok());

    let strategy = player.strategy(0).unwrap();
    game.delete_strategy(&strategy).unwrap();
    assert_eq!(profile.payoff(&player), Err(GameError::StructureChanged));
    assert_eq!(profile.liap_value(), Err(GameError::StructureChanged));
    assert!(!profile.is_current());
}

#[test]
fn test_strategy_profile_invalidation_table() {
    strategy_profile_survives_until_deletion::<f64>();
    strategy_profile_survives_until_deletion::<Rational>();
}

fn strategy_profile_survives_until_payoff_edit<T: Scalar>() {
    let game = coordination();
    let profile = game.mixed_strategy_profile::<T>().unwrap();
    let player = game.player(0).unwrap();
    assert_eq!(profile.payoff(&player).unwrap(), T::ratio(1, 1));
    assert!(profile.liap_value().is_ok());

    let outcome = game.outcome_at((0, 0)).unwrap().unwrap();
    outcome.set_payoff(&player, 3).unwrap();
    assert_eq!(profile.payoff(&player), Err(GameError::StructureChanged));
    assert_eq!(profile.liap_value(), Err(GameError::StructureChanged));

    // A fresh profile sees the new payoff.
    let fresh = game.mixed_strategy_profile::<T>().unwrap();
    assert_eq!(fresh.payoff(&player).unwrap(), T::ratio(5, 4));
}

#[test]
fn test_strategy_profile_invalidation_payoff() {
    strategy_profile_survives_until_payoff_edit::<f64>();
    strategy_profile_survives_until_payoff_edit::<Rational>();
}

#[test]
fn test_strategy_profile_invalidation_labels_are_harmless() {
    let game = coordination();
    let profile = game.mixed_strategy_profile::<f64>().unwrap();
    let player = game.player(0).unwrap();
    player.set_label("Row").unwrap();
    player.strategy(0).unwrap().set_label("Top").unwrap();
    assert!(profile.is_current());
    assert!(profile.payoff(&player).is_ok());
}

#[test]
fn test_strategy_profile_invalidation_added_player() {
    let game = coordination();
    let profile = game.mixed_strategy_profile::<Rational>().unwrap();
    game.add_player("Third").unwrap();
    assert_eq!(profile.max_regret(), Err(GameError::StructureChanged));
}

fn behavior_profile_survives_until_deletion<T: Scalar>() {
    let game = basic_extensive_game().unwrap();
    let profile = game.mixed_behavior_profile::<T>().unwrap();
    let player = game.player(0).unwrap();
    assert!(profile.payoff(&player).is_ok());
    assert!(profile.liap_value().is_ok());

    let action = player.infoset(0).unwrap().action(0).unwrap();
    game.delete_action(&action).unwrap();
    assert_eq!(profile.payoff(&player), Err(GameError::StructureChanged));
    assert_eq!(profile.liap_value(), Err(GameError::StructureChanged));
    assert!(matches!(
        profile.as_strategy(),
        Err(GameError::StructureChanged)
    ));
}

#[test]
fn test_behavior_profile_invalidation() {
    behavior_profile_survives_until_deletion::<f64>();
    behavior_profile_survives_until_deletion::<Rational>();
}

#[test]
fn test_behavior_profile_invalidation_outcome() {
    let game = kuhn_poker().unwrap();
    let profile = game.mixed_behavior_profile::<Rational>().unwrap();
    // Deal J-Q, player 1 bets, player 2 folds.
    let deal = game.root().unwrap().child(0).unwrap();
    let leaf = deal.child(1).unwrap().child(0).unwrap();
    assert!(leaf.is_terminal().unwrap());
    game.set_outcome(&leaf, None).unwrap();
    assert!(!profile.is_current());
    assert_eq!(
        profile.payoff(&game.player(1).unwrap()),
        Err(GameError::StructureChanged)
    );
}

#[test]
fn test_derived_strategy_profile_tracks_the_tree() {
    let game = basic_extensive_game().unwrap();
    let behavior = game.mixed_behavior_profile::<f64>().unwrap();
    let mixed = behavior.as_strategy().unwrap();
    let player = game.player(1).unwrap();
    assert!((mixed.payoff(&player).unwrap() - 0.75).abs() < 1e-12);

    let infoset = player.infoset(0).unwrap();
    game.add_action(&infoset, "m").unwrap();
    assert_eq!(mixed.payoff(&player), Err(GameError::StructureChanged));
}

#[test]
fn test_dropped_game() {
    let game = coordination();
    let profile = game.mixed_strategy_profile::<f64>().unwrap();
    let player = game.player(0).unwrap();
    drop(game);
    assert_eq!(profile.payoff(&player), Err(GameError::GameDropped("profile")));
    assert!(matches!(profile.game(), Err(GameError::GameDropped(_))));
}

#[test]
fn test_profiles_are_tied_to_their_game() {
    let game = coordination();
    let other = coordination();
    let profile = game.mixed_strategy_profile::<f64>().unwrap();
    let stranger = other.player(0).unwrap();
    assert!(matches!(
        profile.payoff(&stranger),
        Err(GameError::LookupBounds(_))
    ));
    assert!(matches!(
        profile.prob(&stranger.strategy(0).unwrap()),
        Err(GameError::LookupBounds(_))
    ));
}
