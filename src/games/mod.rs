//! Ready-made games.
//!
//! These serve as:
//!
//! 1. **Validation**: games with known equilibria check payoff and
//!    Liapunov computations.
//!
//! 2. **Examples**: they show how to build tables and trees through the
//!    public API.
//!
//! 3. **Benchmarks**: standard inputs for performance testing.
//!
//! ## Available Games
//!
//! - [`prisoners_dilemma`]: 2x2 table with a dominant-strategy equilibrium
//! - [`matching_pennies`]: 2x2 zero-sum table with a unique mixed equilibrium
//! - [`basic_extensive_game`]: small tree with an information set spanning
//!   two nodes
//! - [`kuhn`]: Kuhn poker as a tree with chance deals

pub mod kuhn;

use crate::game::{Game, Result};

fn fill_table(game: &Game, payoffs: &[[i64; 2]]) -> Result<()> {
    let players = game.players()?;
    for (outcome, values) in game.outcomes()?.iter().zip(payoffs) {
        for (player, &value) in players.iter().zip(values) {
            outcome.set_payoff(player, value)?;
        }
    }
    Ok(())
}

fn label_table(game: &Game, players: [&str; 2], strategies: [&str; 2]) -> Result<()> {
    for (player, label) in game.players()?.iter().zip(players) {
        player.set_label(label)?;
        for (strategy, name) in player.strategies()?.iter().zip(strategies) {
            strategy.set_label(name)?;
        }
    }
    Ok(())
}

/// The prisoner's dilemma: mutual defection is the unique equilibrium.
///
/// | | Cooperate | Defect |
/// |---|---|---|
/// | **Cooperate** | -1, -1 | -3, 0 |
/// | **Defect** | 0, -3 | -2, -2 |
pub fn prisoners_dilemma() -> Result<Game> {
    let game = Game::new_table(&[2, 2]);
    game.set_title("Prisoner's dilemma");
    label_table(&game, ["Alice", "Bob"], ["Cooperate", "Defect"])?;
    // Contingencies are listed with the row player varying fastest.
    fill_table(&game, &[[-1, -1], [0, -3], [-3, 0], [-2, -2]])?;
    Ok(game)
}

/// Matching pennies: the row player wins on a match. The only equilibrium
/// mixes uniformly.
pub fn matching_pennies() -> Result<Game> {
    let game = Game::new_table(&[2, 2]);
    game.set_title("Matching pennies");
    label_table(&game, ["Matcher", "Mismatcher"], ["Heads", "Tails"])?;
    fill_table(&game, &[[1, -1], [-1, 1], [-1, 1], [1, -1]])?;
    Ok(game)
}

/// A two-player tree: the first player picks `U` or `D`, then the second
/// player picks `l` or `r` without seeing that choice.
///
/// ```text
/// P1 ── U ── P2 ── l → (2, 1)
///  │          └─── r → (0, 0)
///  └── D ── P2 ── l → (0, 0)
///             └─── r → (1, 2)
/// ```
pub fn basic_extensive_game() -> Result<Game> {
    let game = Game::new_tree();
    game.set_title("Battle of the sexes, sequential");
    let first = game.add_player("Player 1")?;
    let second = game.add_player("Player 2")?;
    let root = game.root()?;
    game.append_move(&root, &first, ["U", "D"])?;
    let up = root.child(0)?;
    let down = root.child(1)?;
    let infoset = game.append_move(&up, &second, ["l", "r"])?;
    game.append_infoset(&down, &infoset)?;

    let leaves = [
        (up.child(0)?, [2, 1]),
        (up.child(1)?, [0, 0]),
        (down.child(0)?, [0, 0]),
        (down.child(1)?, [1, 2]),
    ];
    for (leaf, [a, b]) in leaves {
        let outcome = game.add_outcome(format!("{}{}", a, b))?;
        outcome.set_payoff(&first, a)?;
        outcome.set_payoff(&second, b)?;
        game.set_outcome(&leaf, Some(&outcome))?;
    }
    Ok(game)
}
