//! Conversion between table games and numeric arrays.
//!
//! [`Game::to_arrays`](crate::Game::to_arrays) exports one array per player;
//! [`Game::from_arrays`](crate::Game::from_arrays) and
//! [`Game::from_dict`](crate::Game::from_dict) build a fresh table game.
//!
//! ```
//! use finite_games::{Game, PayoffArray};
//!
//! let a = PayoffArray::from_rows(vec![vec![3, 0], vec![5, 1]]).unwrap();
//! let b = PayoffArray::from_rows(vec![vec![3, 5], vec![0, 1]]).unwrap();
//! let game = Game::from_dict([("Row", a.clone()), ("Column", b.clone())]).unwrap();
//! assert_eq!(game.player(1).unwrap().label().unwrap(), "Column");
//! assert_eq!(game.to_arrays::<f64>().unwrap()[0].data(), &[3.0, 0.0, 5.0, 1.0]);
//! ```

mod arrays;

pub use arrays::PayoffArray;
