//! Payoff arrays in and out of table games.

use finite_games::games::kuhn::kuhn_poker;
use finite_games::{Game, GameError, Number, PayoffArray, Rational};

fn rows(values: [[i64; 2]; 2]) -> PayoffArray<i64> {
    PayoffArray::from_rows(values.iter().map(|r| r.to_vec()).collect()).unwrap()
}

#[test]
fn test_from_arrays() {
    let a = rows([[1, 5], [0, 3]]);
    let b = rows([[1, 0], [5, 3]]);
    let game = Game::from_arrays(vec![a, b]).unwrap();
    assert_eq!(game.num_players().unwrap(), 2);
    assert_eq!(game.strategies().unwrap().len(), 4);
}

#[test]
fn test_from_dict() {
    let a = rows([[1, 5], [0, 3]]);
    let b = rows([[1, 0], [5, 3]]);
    let game = Game::from_dict([("a", a), ("b", b)]).unwrap();
    let labels: Vec<String> = game
        .players()
        .unwrap()
        .iter()
        .map(|p| p.label().unwrap())
        .collect();
    assert_eq!(labels, vec!["a", "b"]);
    assert_eq!(game.strategies().unwrap().len(), 4);
}

#[test]
fn test_empty_array_to_arrays() {
    let game = Game::from_arrays(Vec::<PayoffArray<i64>>::new()).unwrap();
    let arrays = game.to_arrays::<f64>().unwrap();
    assert_eq!(arrays.len(), 1);
    assert!(arrays[0].is_empty());
}

#[test]
fn test_no_players_to_arrays() {
    let game = Game::new_table(&[]);
    assert!(game.to_arrays::<f64>().unwrap().is_empty());
}

#[test]
fn test_to_arrays_requires_a_table() {
    assert_eq!(
        Game::new().to_arrays::<f64>().err(),
        Some(GameError::Uninitialized)
    );
    let game = kuhn_poker().unwrap();
    assert!(matches!(
        game.to_arrays::<f64>(),
        Err(GameError::UnsupportedRepresentation { .. })
    ));
}

#[test]
fn test_arrays_round_trip() {
    let a = rows([[1, 5], [0, 3]]);
    let b = rows([[1, 0], [5, 3]]);
    let game = Game::from_arrays(vec![a, b]).unwrap();
    let arrays = game.to_arrays::<f64>().unwrap();
    assert_eq!(arrays[0].data(), &[1.0, 5.0, 0.0, 3.0]);
    assert_eq!(arrays[1].data(), &[1.0, 0.0, 5.0, 3.0]);
}

#[test]
fn test_three_player_arrays_round_trip() {
    let data: Vec<i64> = (0..12).collect();
    let arrays: Vec<PayoffArray<i64>> = (0..3)
        .map(|pl| {
            let values = data.iter().map(|v| v * (pl + 1)).collect();
            PayoffArray::from_vec(vec![2, 3, 2], values).unwrap()
        })
        .collect();
    let game = Game::from_arrays(arrays.clone()).unwrap();
    let back = game.to_arrays::<Rational>().unwrap();
    for (original, exported) in arrays.iter().zip(&back) {
        assert_eq!(original.shape(), exported.shape());
        let expected: Vec<Rational> = original
            .data()
            .iter()
            .map(|&v| Rational::from_integer(v.into()))
            .collect();
        assert_eq!(exported.data(), expected.as_slice());
    }
    assert_eq!(
        game.contingency_payoffs((1, 2, 0)).unwrap()[2],
        Number::from(3 * 10)
    );
}

#[test]
fn test_mixed_outcome_to_array() {
    let game = Game::new_table(&[2, 2]);
    let players = game.players().unwrap();
    let outcomes = game.outcomes().unwrap();
    outcomes[0].set_payoff(&players[0], "1/4").unwrap();
    outcomes[0].set_payoff(&players[1], 0.25).unwrap();
    outcomes[1].set_payoff(&players[0], 5).unwrap();
    outcomes[1].set_payoff(&players[1], 0.0).unwrap();
    outcomes[2].set_payoff(&players[0], 0).unwrap();
    outcomes[2].set_payoff(&players[1], 5.0).unwrap();
    outcomes[3].set_payoff(&players[0], "3.14159265").unwrap();
    outcomes[3].set_payoff(&players[1], 3).unwrap();

    let arrays = game.to_arrays::<f64>().unwrap();
    assert_eq!(arrays[0].data(), &[0.25, 0.0, 5.0, 3.14159265]);
    assert_eq!(arrays[1].data(), &[0.25, 5.0, 0.0, 3.0]);
    assert_eq!(arrays[0].get(&[1, 0]), Some(&5.0));
}

#[test]
fn test_bad_payoff_text_is_rejected() {
    let a = PayoffArray::from_rows(vec![vec!["1", "x"]]).unwrap();
    let b = PayoffArray::from_rows(vec![vec!["1", "2"]]).unwrap();
    assert!(matches!(
        Game::from_arrays(vec![a, b]),
        Err(GameError::InvalidNumber(_))
    ));
}

#[test]
fn test_array_count_must_match_dimensions() {
    let a = PayoffArray::from_vec(vec![2], vec![1, 2]).unwrap();
    let b = PayoffArray::from_vec(vec![2], vec![3, 4]).unwrap();
    assert!(matches!(
        Game::from_arrays(vec![a, b]),
        Err(GameError::InvalidArgument(_))
    ));
}
