//! Error types for game construction, lookup and profile evaluation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GameError>;

/// Everything that can go wrong when working with a game or a profile.
///
/// Lookup failures are split the way callers observe them: a wrongly typed
/// index, a wrongly sized index, and an index that simply does not resolve.
/// The last kind is the same whether the cause was a number out of range, an
/// unmatched label or a handle belonging to another player.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameError {
    /// The game was default-constructed and never populated.
    #[error("game has not been initialized")]
    Uninitialized,

    /// The operation is defined only for the other representation.
    #[error("operation '{operation}' is not supported on {form} games")]
    UnsupportedRepresentation {
        /// Name of the rejected operation.
        operation: &'static str,
        /// The representation of the game it was invoked on.
        form: &'static str,
    },

    /// The index is not a tuple, or its elements are not of one expected kind.
    #[error("invalid index type: {0}")]
    LookupType(String),

    /// The index tuple has the wrong number of elements.
    #[error("index has {got} elements, game has {expected} players")]
    LookupArity {
        /// Number of players in the game.
        expected: usize,
        /// Number of elements supplied.
        got: usize,
    },

    /// The index does not resolve to anything in the game.
    #[error("index resolution failed: {0}")]
    LookupBounds(String),

    /// A handle refers to an object that the game has since removed.
    #[error("{0} handle no longer refers to an object in the game")]
    StaleHandle(&'static str),

    /// The game this object belongs to has been dropped.
    #[error("the game owning this {0} no longer exists")]
    GameDropped(&'static str),

    /// The game changed after the profile was created.
    #[error("game structure changed since profile was created")]
    StructureChanged,

    /// Payoff text could not be read as an integer, fraction or decimal.
    #[error("cannot interpret '{0}' as a number")]
    InvalidNumber(String),

    /// The arguments violate a precondition of the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::convert::Infallible> for GameError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
