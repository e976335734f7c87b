//! Addressing a cell of the game by a pure strategy profile.
//!
//! An index is a tuple with one element per player. All elements must be of
//! one kind: positions, labels, or strategy handles. Resolution first checks
//! the shape of the index, then classifies the element kind, then dispatches
//! to the matching resolver, so the error taxonomy lives in one place:
//!
//! - not a tuple, a float element, or mixed kinds: [`GameError::LookupType`]
//! - wrong number of elements: [`GameError::LookupArity`]
//! - anything that does not resolve: [`GameError::LookupBounds`]

use crate::game::arena::Key;
use crate::game::data::GameData;
use crate::game::error::{GameError, Result};
use crate::game::handles::{Handle, Shared, Strategy};

/// One element of an index tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// 0-based strategy position.
    Position(i64),
    /// Floating-point values are never valid positions.
    Float(f64),
    /// Strategy label; the first strategy with this label matches.
    Label(String),
    /// A strategy handle, which must belong to the player at its position.
    Strategy(Strategy),
}

/// An index into the game: a tuple of elements, or a lone element (which is
/// always rejected, but can be expressed).
#[derive(Debug, Clone, PartialEq)]
pub enum Contingency {
    /// One element per player.
    Tuple(Vec<Element>),
    /// A single element that is not wrapped in a tuple.
    Single(Element),
}

macro_rules! element_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Element {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for Contingency {
                fn from(value: $ty) -> Self {
                    Contingency::Single(Element::from(value))
                }
            }
        )*
    };
}

element_from!(
    i64 => |v| Element::Position(v),
    i32 => |v| Element::Position(i64::from(v)),
    usize => |v| Element::Position(i64::try_from(v).unwrap_or(i64::MAX)),
    f64 => |v| Element::Float(v),
    &str => |v| Element::Label(v.to_string()),
    String => |v| Element::Label(v),
    Strategy => |v| Element::Strategy(v),
    &Strategy => |v| Element::Strategy(v.clone()),
);

impl<A: Into<Element>, B: Into<Element>> From<(A, B)> for Contingency {
    fn from((a, b): (A, B)) -> Self {
        Contingency::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Element>, B: Into<Element>, C: Into<Element>> From<(A, B, C)> for Contingency {
    fn from((a, b, c): (A, B, C)) -> Self {
        Contingency::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for Contingency
where
    A: Into<Element>,
    B: Into<Element>,
    C: Into<Element>,
    D: Into<Element>,
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Contingency::Tuple(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

impl<E: Into<Element>> From<Vec<E>> for Contingency {
    fn from(elements: Vec<E>) -> Self {
        Contingency::Tuple(elements.into_iter().map(Into::into).collect())
    }
}

impl<E: Into<Element>, const N: usize> From<[E; N]> for Contingency {
    fn from(elements: [E; N]) -> Self {
        Contingency::Tuple(elements.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Position,
    Label,
    Strategy,
}

fn kind_of(element: &Element) -> Result<Kind> {
    match element {
        Element::Position(_) => Ok(Kind::Position),
        Element::Label(_) => Ok(Kind::Label),
        Element::Strategy(_) => Ok(Kind::Strategy),
        Element::Float(v) => Err(GameError::LookupType(format!(
            "{} is not an integer, label or strategy",
            v
        ))),
    }
}

/// Resolves an index to per-player strategy positions.
///
/// Tree games must have their strategies derived before calling this.
pub(crate) fn resolve(data: &GameData, owner: &Shared, index: Contingency) -> Result<Vec<usize>> {
    data.form()?;
    let elements = match index {
        Contingency::Tuple(elements) => elements,
        Contingency::Single(_) => {
            return Err(GameError::LookupType(
                "index must be a tuple with one entry per player".to_string(),
            ))
        }
    };
    if elements.len() != data.players.len() {
        return Err(GameError::LookupArity {
            expected: data.players.len(),
            got: elements.len(),
        });
    }

    let kinds = elements.iter().map(kind_of).collect::<Result<Vec<_>>>()?;
    if kinds.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(GameError::LookupType(
            "index elements must all be integers, all labels, or all strategies".to_string(),
        ));
    }

    let lists = data.strategy_lists();
    elements
        .iter()
        .zip(&lists)
        .enumerate()
        .map(|(pl, (element, strategies))| match element {
            Element::Position(i) => by_position(*i, pl, strategies),
            Element::Label(label) => by_label(data, label, pl, strategies),
            Element::Strategy(strategy) => by_handle(data, owner, strategy, pl, strategies),
            Element::Float(v) => Err(GameError::LookupType(format!("{} is not an integer", v))),
        })
        .collect()
}

fn by_position(index: i64, player: usize, strategies: &[Key]) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < strategies.len())
        .ok_or_else(|| {
            GameError::LookupBounds(format!(
                "player {} has no strategy at position {}",
                player, index
            ))
        })
}

fn by_label(data: &GameData, label: &str, player: usize, strategies: &[Key]) -> Result<usize> {
    strategies
        .iter()
        .position(|&s| data.strategy_arena.get(s).is_some_and(|s| s.label == label))
        .ok_or_else(|| {
            GameError::LookupBounds(format!(
                "player {} has no strategy labelled '{}'",
                player, label
            ))
        })
}

fn by_handle(
    data: &GameData,
    owner: &Shared,
    strategy: &Strategy,
    player: usize,
    strategies: &[Key],
) -> Result<usize> {
    if !strategy.belongs_to(owner) {
        return Err(GameError::LookupBounds(
            "strategy belongs to a different game".to_string(),
        ));
    }
    data.strategy(strategy.key())?;
    strategies
        .iter()
        .position(|&s| s == strategy.key())
        .ok_or_else(|| {
            GameError::LookupBounds(format!("strategy does not belong to player {}", player))
        })
}
