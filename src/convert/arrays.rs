//! Rectangular payoff arrays, one per player.

use serde::{Deserialize, Serialize};

use crate::game::{contingency_count, decode, Game, GameError, Number, Result};
use crate::profile::Scalar;

/// A dense N-dimensional array stored row-major (last index fastest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> PayoffArray<T> {
    /// An array of the given shape from row-major data.
    pub fn from_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected = contingency_count(&shape);
        if data.len() != expected {
            return Err(GameError::InvalidArgument(format!(
                "shape {:?} needs {} entries, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// A two-dimensional array from rows; rows must all have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return Err(GameError::InvalidArgument(
                "rows have different lengths".to_string(),
            ));
        }
        let shape = vec![rows.len(), columns];
        Self::from_vec(shape, rows.into_iter().flatten().collect())
    }

    /// A one-dimensional array of size zero.
    pub fn empty() -> Self {
        Self {
            shape: vec![0],
            data: Vec::new(),
        }
    }

    /// Extent along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Entries in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the array holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The entry at a multi-index, if in range.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return None;
        }
        self.data.get(row_major(index, &self.shape))
    }
}

fn row_major(index: &[usize], shape: &[usize]) -> usize {
    index
        .iter()
        .zip(shape)
        .fold(0, |offset, (&i, &n)| offset * n + i)
}

impl Game {
    /// One payoff array per player, shaped by the strategy counts.
    ///
    /// A game with no players yields no arrays. Table games only.
    pub fn to_arrays<T: Scalar>(&self) -> Result<Vec<PayoffArray<T>>> {
        {
            let data = self.shared().borrow();
            data.require_table("to_arrays")?;
        }
        let shape = self.shared().borrow().strategy_counts();
        let payoffs = self.pure_payoffs()?;
        let players = shape.len();
        let mut arrays: Vec<Vec<T>> = vec![vec![T::zero(); payoffs.len()]; players];
        for (index, cell) in payoffs.iter().enumerate() {
            let offset = row_major(&decode(index, &shape), &shape);
            for (pl, payoff) in cell.iter().enumerate() {
                arrays[pl][offset] = T::from_number(payoff);
            }
        }
        Ok(arrays
            .into_iter()
            .map(|data| PayoffArray {
                shape: shape.clone(),
                data,
            })
            .collect())
    }

    /// A table game with one player per array. All arrays must share a
    /// shape, which gives the strategy counts.
    ///
    /// No arrays at all yields a game with a single player without
    /// strategies, whose one payoff array is empty.
    pub fn from_arrays<V>(arrays: Vec<PayoffArray<V>>) -> Result<Game>
    where
        V: Clone + TryInto<Number>,
        GameError: From<V::Error>,
    {
        let Some(first) = arrays.first() else {
            return Ok(Game::new_table(&[0]));
        };
        let shape = first.shape.clone();
        if arrays.iter().any(|a| a.shape != shape) {
            return Err(GameError::InvalidArgument(
                "payoff arrays must all have the same shape".to_string(),
            ));
        }
        if shape.len() != arrays.len() {
            return Err(GameError::InvalidArgument(format!(
                "{} arrays need {} dimensions, got {}",
                arrays.len(),
                arrays.len(),
                shape.len()
            )));
        }

        let game = Game::new_table(&shape);
        let players = game.players()?;
        for (index, outcome) in game.outcomes()?.iter().enumerate() {
            let offset = row_major(&decode(index, &shape), &shape);
            for (array, player) in arrays.iter().zip(&players) {
                outcome.set_payoff(player, array.data[offset].clone())?;
            }
        }
        log::debug!("built table game of shape {:?} from arrays", shape);
        Ok(game)
    }

    /// Like [`Game::from_arrays`], labelling each player by its key.
    pub fn from_dict<K, V, I>(entries: I) -> Result<Game>
    where
        I: IntoIterator<Item = (K, PayoffArray<V>)>,
        K: Into<String>,
        V: Clone + TryInto<Number>,
        GameError: From<V::Error>,
    {
        let (labels, arrays): (Vec<String>, Vec<PayoffArray<V>>) = entries
            .into_iter()
            .map(|(label, array)| (label.into(), array))
            .unzip();
        let game = Game::from_arrays(arrays)?;
        for (player, label) in game.players()?.iter().zip(labels) {
            player.set_label(label)?;
        }
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rational;

    #[test]
    fn test_from_vec_checks_length() {
        assert!(PayoffArray::from_vec(vec![2, 2], vec![1, 2, 3]).is_err());
        let array = PayoffArray::from_vec(vec![2, 3], (0..6).collect()).unwrap();
        assert_eq!(array.get(&[1, 0]), Some(&3));
        assert_eq!(array.get(&[2, 0]), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        assert!(PayoffArray::from_rows(vec![vec![1, 2], vec![3]]).is_err());
        let array = PayoffArray::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(array.shape(), &[2, 2]);
    }

    #[test]
    fn test_cells_line_up_with_contingencies() {
        let a = PayoffArray::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let b = PayoffArray::from_rows(vec![vec![6, 5, 4], vec![3, 2, 1]]).unwrap();
        let game = Game::from_arrays(vec![a, b]).unwrap();
        let payoffs = game.contingency_payoffs((1, 2)).unwrap();
        assert_eq!(payoffs, vec![Number::from(6), Number::from(1)]);
        let outcome = game.outcome_at((0, 1)).unwrap().unwrap();
        assert_eq!(outcome.payoffs().unwrap(), vec![Number::from(2), Number::from(5)]);
    }

    #[test]
    fn test_exact_arrays_keep_fractions() {
        let a = PayoffArray::from_rows(vec![vec!["1/3", "2"]]).unwrap();
        let b = PayoffArray::from_rows(vec![vec!["0.5", "-1"]]).unwrap();
        let game = Game::from_arrays(vec![a, b]).unwrap();
        let arrays = game.to_arrays::<Rational>().unwrap();
        assert_eq!(
            arrays[0].data()[0],
            Rational::new(1.into(), 3.into())
        );
        assert_eq!(arrays[1].data()[0], Rational::new(1.into(), 2.into()));
    }

    #[test]
    fn test_mismatched_shapes_are_rejected() {
        let a = PayoffArray::from_rows(vec![vec![1, 2]]).unwrap();
        let b = PayoffArray::from_rows(vec![vec![1], vec![2]]).unwrap();
        assert!(matches!(
            Game::from_arrays(vec![a, b]),
            Err(GameError::InvalidArgument(_))
        ));
    }
}
