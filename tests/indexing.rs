//! Addressing table cells by positions, labels and strategy handles.

use finite_games::{Contingency, Element, Game, GameError};

#[test]
fn test_get_outcome_by_index() {
    let game = Game::new_table(&[2, 2]);
    let outcomes = game.outcomes().unwrap();
    assert_eq!(game.outcome_at((0, 0)).unwrap(), Some(outcomes[0].clone()));
    // First player's strategy varies fastest.
    assert_eq!(game.outcome_at((1, 0)).unwrap(), Some(outcomes[1].clone()));
    assert_eq!(game.outcome_at((0, 1)).unwrap(), Some(outcomes[2].clone()));
}

#[test]
fn test_get_outcome_by_label() {
    let game = Game::new_table(&[2, 2]);
    let players = game.players().unwrap();
    players[0].strategy(0).unwrap().set_label("defect").unwrap();
    players[1].strategy(0).unwrap().set_label("cooperate").unwrap();
    assert_eq!(
        game.outcome_at(("defect", "cooperate")).unwrap(),
        Some(game.outcomes().unwrap()[0].clone())
    );
}

#[test]
fn test_index_forms_agree() {
    let game = Game::new_table(&[2, 3, 2]);
    let players = game.players().unwrap();
    for (pl, player) in players.iter().enumerate() {
        for strategy in player.strategies().unwrap() {
            let label = format!("p{}s{}", pl, strategy.number().unwrap());
            strategy.set_label(label).unwrap();
        }
    }
    let by_position = game.outcome_at((1, 2, 0)).unwrap();
    let by_label = game.outcome_at(("p0s1", "p1s2", "p2s0")).unwrap();
    let by_handle = game
        .outcome_at((
            players[0].strategy(1).unwrap(),
            players[1].strategy(2).unwrap(),
            players[2].strategy(0).unwrap(),
        ))
        .unwrap();
    assert!(by_position.is_some());
    assert_eq!(by_position, by_label);
    assert_eq!(by_position, by_handle);
}

#[test]
fn test_first_matching_label_wins() {
    let game = Game::new_table(&[3]);
    let strategies = game.player(0).unwrap().strategies().unwrap();
    strategies[1].set_label("same").unwrap();
    strategies[2].set_label("same").unwrap();
    assert_eq!(game.outcome_at(["same"]).unwrap(), game.outcome_at([1]).unwrap());
}

#[test]
fn test_invalid_tuple_size() {
    let game = Game::new_table(&[2, 2]);
    assert_eq!(
        game.outcome_at((0, 0, 0)),
        Err(GameError::LookupArity { expected: 2, got: 3 })
    );
}

#[test]
fn test_non_tuple_index() {
    let game = Game::new_table(&[2, 2]);
    assert!(matches!(game.outcome_at(42), Err(GameError::LookupType(_))));
    assert!(matches!(game.outcome_at("defect"), Err(GameError::LookupType(_))));
}

#[test]
fn test_float_element_is_a_type_error() {
    let game = Game::new_table(&[2, 2]);
    let index = Contingency::Tuple(vec![Element::Float(1.23), Element::Position(1)]);
    assert!(matches!(game.outcome_at(index), Err(GameError::LookupType(_))));
}

#[test]
fn test_mixed_element_kinds_are_a_type_error() {
    let game = Game::new_table(&[2, 2]);
    let index = Contingency::Tuple(vec![Element::Position(0), Element::from("1")]);
    assert!(matches!(game.outcome_at(index), Err(GameError::LookupType(_))));
}

#[test]
fn test_index_out_of_range() {
    let game = Game::new_table(&[2, 2]);
    assert!(matches!(game.outcome_at((0, 3)), Err(GameError::LookupBounds(_))));
    assert!(matches!(game.outcome_at((-1, 0)), Err(GameError::LookupBounds(_))));
}

#[test]
fn test_unmatched_label() {
    let game = Game::new_table(&[2, 2]);
    let players = game.players().unwrap();
    players[0].strategy(0).unwrap().set_label("defect").unwrap();
    players[1].strategy(0).unwrap().set_label("cooperate").unwrap();
    assert!(matches!(
        game.outcome_at(("defect", "defect")),
        Err(GameError::LookupBounds(_))
    ));
}

#[test]
fn test_get_outcome_with_strategies() {
    let game = Game::new_table(&[2, 2]);
    let players = game.players().unwrap();
    let index = (players[0].strategy(0).unwrap(), players[1].strategy(0).unwrap());
    assert_eq!(
        game.outcome_at(index).unwrap(),
        Some(game.outcomes().unwrap()[0].clone())
    );
}

#[test]
fn test_get_outcome_with_bad_strategies() {
    let game = Game::new_table(&[2, 2]);
    let first = game.player(0).unwrap().strategy(0).unwrap();
    assert!(matches!(
        game.outcome_at((&first, &first)),
        Err(GameError::LookupBounds(_))
    ));
}

#[test]
fn test_strategies_of_another_game() {
    let game = Game::new_table(&[2, 2]);
    let other = Game::new_table(&[2, 2]);
    let players = other.players().unwrap();
    let index = (players[0].strategy(0).unwrap(), players[1].strategy(0).unwrap());
    assert!(matches!(game.outcome_at(index), Err(GameError::LookupBounds(_))));
}

#[test]
fn test_tree_games_are_not_indexed_by_cell() {
    let game = Game::new_tree();
    game.add_player("One").unwrap();
    assert!(matches!(
        game.outcome_at([0]),
        Err(GameError::UnsupportedRepresentation { .. })
    ));
    // Pure strategy payoffs are still available.
    assert_eq!(game.contingency_payoffs([0]).unwrap().len(), 1);
}

#[test]
fn test_uninitialized_game_is_not_indexed() {
    assert_eq!(Game::new().outcome_at((0, 0)), Err(GameError::Uninitialized));
}

#[test]
fn test_dereference_invalid() {
    let game = Game::new_tree();
    let player = game.add_player("One").unwrap();
    let strategy = player.strategy(0).unwrap();
    game.append_move(&game.root().unwrap(), &player, ["a", "b"])
        .unwrap();
    assert_eq!(strategy.label(), Err(GameError::StaleHandle("strategy")));
}

#[test]
fn test_deleted_strategy_handle_is_stale() {
    let game = Game::new_table(&[3, 2]);
    let strategy = game.player(0).unwrap().strategy(1).unwrap();
    game.delete_strategy(&strategy).unwrap();
    assert_eq!(strategy.label(), Err(GameError::StaleHandle("strategy")));
    assert_eq!(game.player(0).unwrap().strategies().unwrap().len(), 2);
}

#[test]
fn test_deleted_action_handle_is_stale() {
    let game = Game::new_tree();
    let player = game.add_player("One").unwrap();
    let infoset = game
        .append_move(&game.root().unwrap(), &player, ["a", "b", "c"])
        .unwrap();
    let action = infoset.action(1).unwrap();
    game.delete_action(&action).unwrap();
    assert_eq!(action.label(), Err(GameError::StaleHandle("action")));
    assert_eq!(infoset.actions().unwrap().len(), 2);
    assert_eq!(game.root().unwrap().children().unwrap().len(), 2);
}
