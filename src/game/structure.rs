//! The [`Game`] handle: construction, enumeration, mutation and indexing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::game::arena::Key;
use crate::game::data::{contingency_count, decode, encode, Form, GameData};
use crate::game::error::{GameError, Result};
use crate::game::handles::{Action, Handle, Infoset, Node, Outcome, Player, Shared, Strategy, WeakShared};
use crate::game::index::{resolve, Contingency};
use crate::game::number::Number;

/// A finite game in strategic (table) or extensive (tree) form.
///
/// `Game` is a cheap, clonable handle; clones refer to the same game.
/// Handles to players, strategies and so on, as well as profiles, only hold
/// weak references, so the game lives exactly as long as some `Game` clone.
///
/// A default-constructed game is uninitialized: every query fails with
/// [`GameError::Uninitialized`] until it is replaced by one built with
/// [`Game::new_table`], [`Game::new_tree`] or the array constructors.
///
/// # Example
/// ```
/// use finite_games::Game;
///
/// let game = Game::new_table(&[2, 2]);
/// let outcome = game.outcome_at((0, 0)).unwrap().unwrap();
/// outcome.set_payoff(&game.player(0).unwrap(), "1/4").unwrap();
/// assert_eq!(game.outcomes().unwrap()[0], outcome);
/// ```
#[derive(Clone, Default)]
pub struct Game {
    data: Shared,
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Game {}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("Game")
            .field("form", &data.form_name())
            .field("title", &data.title)
            .field("players", &data.players.len())
            .finish()
    }
}

impl Game {
    /// An uninitialized game.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table game with one player per entry of `sizes`, each with that
    /// many strategies, and a fresh outcome in every cell.
    pub fn new_table(sizes: &[usize]) -> Self {
        Self::from_data(GameData::table(sizes))
    }

    /// A tree game with a single, terminal root node and no players.
    pub fn new_tree() -> Self {
        Self::from_data(GameData::tree())
    }

    fn from_data(data: GameData) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
        }
    }

    pub(crate) fn from_shared(data: Shared) -> Self {
        Self { data }
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.data
    }

    pub(crate) fn downgrade(&self) -> WeakShared {
        Rc::downgrade(&self.data)
    }

    /// Resolves a handle to its key, rejecting handles of other games.
    pub(crate) fn own<H: Handle>(&self, handle: &H) -> Result<Key> {
        if !handle.belongs_to(&self.data) {
            return Err(GameError::InvalidArgument(format!(
                "{} belongs to a different game",
                H::KIND
            )));
        }
        Ok(handle.key())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns true once the game has a table or tree structure.
    pub fn is_initialized(&self) -> bool {
        self.data.borrow().form.is_some()
    }

    /// Returns true for extensive form games.
    pub fn is_tree(&self) -> bool {
        self.data.borrow().is_tree()
    }

    /// The game's title.
    pub fn title(&self) -> String {
        self.data.borrow().title.clone()
    }

    /// Sets the title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.data.borrow_mut().title = title.into();
    }

    /// Free-form comment attached to the game.
    pub fn comment(&self) -> String {
        self.data.borrow().comment.clone()
    }

    /// Sets the comment.
    pub fn set_comment(&self, comment: impl Into<String>) {
        self.data.borrow_mut().comment = comment.into();
    }

    /// Number of (personal) players.
    pub fn num_players(&self) -> Result<usize> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data.players.len())
    }

    /// The players, in order.
    pub fn players(&self) -> Result<Vec<Player>> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data
            .players
            .iter()
            .map(|&p| Player::new(self.downgrade(), p))
            .collect())
    }

    /// The player at `index`.
    pub fn player(&self, index: usize) -> Result<Player> {
        self.players()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| GameError::LookupBounds(format!("no player at position {}", index)))
    }

    /// The chance player (tree games only).
    pub fn chance(&self) -> Result<Player> {
        let (_, chance) = self.data.borrow().require_tree("chance")?;
        Ok(Player::new(self.downgrade(), chance))
    }

    /// The root node (tree games only).
    pub fn root(&self) -> Result<Node> {
        let (root, _) = self.data.borrow().require_tree("root")?;
        Ok(Node::new(self.downgrade(), root))
    }

    /// All outcomes, in creation order.
    pub fn outcomes(&self) -> Result<Vec<Outcome>> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data
            .outcomes
            .iter()
            .map(|&o| Outcome::new(self.downgrade(), o))
            .collect())
    }

    /// Every player's strategies, concatenated in player order.
    pub fn strategies(&self) -> Result<Vec<Strategy>> {
        let mut strategies = Vec::new();
        for player in self.players()? {
            strategies.extend(player.strategies()?);
        }
        Ok(strategies)
    }

    /// Smallest payoff over all outcomes.
    pub fn min_payoff(&self) -> Result<Number> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data.min_max_payoff().map(|(lo, _)| lo).unwrap_or_default())
    }

    /// Largest payoff over all outcomes.
    pub fn max_payoff(&self) -> Result<Number> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data.min_max_payoff().map(|(_, hi)| hi).unwrap_or_default())
    }

    /// Returns true if payoffs sum to the same value everywhere.
    pub fn is_const_sum(&self) -> Result<bool> {
        let data = self.data.borrow();
        data.form()?;
        Ok(data.is_const_sum())
    }

    // ------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------

    /// The outcome in the cell addressed by `index` (table games only).
    ///
    /// `index` holds one entry per player: all positions (`(0, 1)`), all
    /// labels (`("defect", "cooperate")`) or all strategy handles. A cell
    /// without an outcome yields `None`.
    pub fn outcome_at(&self, index: impl Into<Contingency>) -> Result<Option<Outcome>> {
        let data = self.data.borrow();
        data.require_table("outcome_at")?;
        let positions = resolve(&data, &self.data, index.into())?;
        let Some(Form::Table { results }) = &data.form else {
            return Err(GameError::Uninitialized);
        };
        let cell = results[encode(&positions, &data.strategy_counts())];
        Ok(cell.map(|o| Outcome::new(self.downgrade(), o)))
    }

    /// Places `outcome` in the cell addressed by `index` (table games only).
    pub fn set_outcome_at(&self, index: impl Into<Contingency>, outcome: Option<&Outcome>) -> Result<()> {
        let outcome = outcome.map(|o| self.own(o)).transpose()?;
        let mut data = self.data.borrow_mut();
        data.require_table("set_outcome_at")?;
        let positions = resolve(&data, &self.data, index.into())?;
        let cell = encode(&positions, &data.strategy_counts());
        data.set_table_outcome(cell, outcome)
    }

    /// Payoffs of the pure strategy profile addressed by `index`, in either
    /// form. In tree games chance moves are averaged out.
    pub fn contingency_payoffs(&self, index: impl Into<Contingency>) -> Result<Vec<Number>> {
        let mut data = self.data.borrow_mut();
        data.form()?;
        data.ensure_strategies();
        let positions = resolve(&data, &self.data, index.into())?;
        data.contingency_payoffs(&positions)
    }

    /// Payoffs of every pure strategy profile, first player's strategy
    /// varying fastest.
    pub fn pure_payoffs(&self) -> Result<Vec<Vec<Number>>> {
        self.data.borrow_mut().pure_payoffs()
    }

    /// Splits a contingency number into per-player strategy positions.
    pub fn contingency_positions(&self, index: usize) -> Result<Vec<usize>> {
        let mut data = self.data.borrow_mut();
        data.form()?;
        data.ensure_strategies();
        let counts = data.strategy_counts();
        if index >= contingency_count(&counts) {
            return Err(GameError::LookupBounds(format!("no contingency {}", index)));
        }
        Ok(decode(index, &counts))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Adds a player. In table games the player gets one strategy; in tree
    /// games the player starts without infosets.
    pub fn add_player(&self, label: impl Into<String>) -> Result<Player> {
        let key = self.data.borrow_mut().add_player(label.into())?;
        Ok(Player::new(self.downgrade(), key))
    }

    /// Adds a strategy for `player` (table games only). New cells are empty.
    pub fn add_strategy(&self, player: &Player, label: impl Into<String>) -> Result<Strategy> {
        let player = self.own(player)?;
        let key = self.data.borrow_mut().add_strategy(player, label.into())?;
        Ok(Strategy::new(self.downgrade(), key))
    }

    /// Removes a strategy and every cell using it (table games only).
    pub fn delete_strategy(&self, strategy: &Strategy) -> Result<()> {
        let strategy = self.own(strategy)?;
        self.data.borrow_mut().delete_strategy(strategy)
    }

    /// Adds an outcome with zero payoffs, attached nowhere.
    pub fn add_outcome(&self, label: impl Into<String>) -> Result<Outcome> {
        let mut data = self.data.borrow_mut();
        data.form()?;
        let key = data.add_outcome(label.into());
        Ok(Outcome::new(self.downgrade(), key))
    }

    /// Removes an outcome, detaching it from every cell or node.
    pub fn delete_outcome(&self, outcome: &Outcome) -> Result<()> {
        let outcome = self.own(outcome)?;
        self.data.borrow_mut().delete_outcome(outcome)
    }

    /// Appends a move by `player` at the terminal node `node`, with one
    /// action per label, in a new infoset. Passing [`Game::chance`] makes
    /// a chance move with uniform probabilities.
    pub fn append_move<I, S>(&self, node: &Node, player: &Player, labels: I) -> Result<Infoset>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let node = self.own(node)?;
        let player = self.own(player)?;
        let labels = labels.into_iter().map(Into::into).collect();
        let key = self.data.borrow_mut().append_move(node, player, labels)?;
        Ok(Infoset::new(self.downgrade(), key))
    }

    /// Appends a move at the terminal node `node` as a further member of
    /// `infoset`.
    pub fn append_infoset(&self, node: &Node, infoset: &Infoset) -> Result<()> {
        let node = self.own(node)?;
        let infoset = self.own(infoset)?;
        self.data.borrow_mut().append_infoset(node, infoset)
    }

    /// Adds an action to `infoset`, growing a new child at every member.
    pub fn add_action(&self, infoset: &Infoset, label: impl Into<String>) -> Result<Action> {
        let infoset = self.own(infoset)?;
        let key = self.data.borrow_mut().add_action(infoset, label.into())?;
        Ok(Action::new(self.downgrade(), key))
    }

    /// Removes an action and the subtrees it leads to.
    pub fn delete_action(&self, action: &Action) -> Result<()> {
        let action = self.own(action)?;
        self.data.borrow_mut().delete_action(action)
    }

    /// Removes everything below `node`, making it terminal.
    pub fn delete_tree(&self, node: &Node) -> Result<()> {
        let node = self.own(node)?;
        self.data.borrow_mut().delete_tree(node)
    }

    /// Attaches `outcome` to `node`, or detaches the current one.
    pub fn set_outcome(&self, node: &Node, outcome: Option<&Outcome>) -> Result<()> {
        let node = self.own(node)?;
        let outcome = outcome.map(|o| self.own(o)).transpose()?;
        self.data.borrow_mut().set_node_outcome(node, outcome)
    }

    /// Sets the probabilities of a chance infoset. They must be
    /// non-negative and sum to exactly one.
    pub fn set_chance_probs<V>(&self, infoset: &Infoset, probs: Vec<V>) -> Result<()>
    where
        V: TryInto<Number>,
        GameError: From<V::Error>,
    {
        let infoset = self.own(infoset)?;
        let probs = probs
            .into_iter()
            .map(|p| p.try_into().map_err(GameError::from))
            .collect::<Result<Vec<Number>>>()?;
        self.data.borrow_mut().set_chance_probs(infoset, probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_game_rejects_queries() {
        let game = Game::new();
        assert!(!game.is_initialized());
        assert_eq!(game.players(), Err(GameError::Uninitialized));
        assert_eq!(game.outcomes(), Err(GameError::Uninitialized));
        assert!(matches!(game.add_player("x"), Err(GameError::Uninitialized)));
    }

    #[test]
    fn test_clones_share_state() {
        let game = Game::new_table(&[2, 2]);
        let other = game.clone();
        other.set_title("shared");
        assert_eq!(game.title(), "shared");
        assert_eq!(game, other);
        assert_ne!(game, Game::new_table(&[2, 2]));
    }

    #[test]
    fn test_handles_of_another_game_are_rejected() {
        let game = Game::new_table(&[2, 2]);
        let other = Game::new_table(&[2, 2]);
        let strategy = other.player(0).unwrap().strategy(0).unwrap();
        assert!(matches!(
            game.delete_strategy(&strategy),
            Err(GameError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_handles_fail_after_game_is_dropped() {
        let game = Game::new_table(&[2]);
        let player = game.player(0).unwrap();
        drop(game);
        assert_eq!(player.label(), Err(GameError::GameDropped("player")));
    }

    #[test]
    fn test_add_player_keeps_existing_cells() {
        let game = Game::new_table(&[2]);
        let outcome = game.outcome_at([1]).unwrap().unwrap();
        game.add_player("late").unwrap();
        assert_eq!(game.num_players().unwrap(), 2);
        assert_eq!(game.outcome_at((1, 0)).unwrap(), Some(outcome.clone()));
        assert_eq!(outcome.payoffs().unwrap().len(), 2);
    }

    #[test]
    fn test_const_sum_detection() {
        let game = Game::new_table(&[2, 2]);
        assert!(game.is_const_sum().unwrap());
        let outcome = game.outcome_at((0, 1)).unwrap().unwrap();
        outcome.set_payoff(&game.player(0).unwrap(), 1).unwrap();
        assert!(!game.is_const_sum().unwrap());
        outcome.set_payoff(&game.player(1).unwrap(), -1).unwrap();
        assert!(game.is_const_sum().unwrap());
        assert_eq!(game.min_payoff().unwrap(), Number::from(-1));
        assert_eq!(game.max_payoff().unwrap(), Number::from(1));
    }

    #[test]
    fn test_chance_probabilities_must_sum_to_one() {
        let game = Game::new_tree();
        let infoset = game
            .append_move(&game.root().unwrap(), &game.chance().unwrap(), ["h", "t"])
            .unwrap();
        assert!(game.set_chance_probs(&infoset, vec!["1/3", "1/3"]).is_err());
        assert!(game.set_chance_probs(&infoset, vec!["-1", "2"]).is_err());
        game.set_chance_probs(&infoset, vec!["1/3", "2/3"]).unwrap();
        let probs: Vec<Number> = infoset
            .actions()
            .unwrap()
            .iter()
            .map(|a| a.prob().unwrap().unwrap())
            .collect();
        assert_eq!(probs[1], "2/3".parse().unwrap());
    }

    #[test]
    fn test_tree_navigation() {
        let game = Game::new_tree();
        let player = game.add_player("One").unwrap();
        let root = game.root().unwrap();
        let infoset = game.append_move(&root, &player, ["L", "R"]).unwrap();
        let right = root.child(1).unwrap();
        assert_eq!(right.parent().unwrap(), Some(root.clone()));
        assert_eq!(right.prior_action().unwrap().unwrap().label().unwrap(), "R");
        assert_eq!(root.infoset().unwrap(), Some(infoset.clone()));
        assert_eq!(root.player().unwrap(), Some(player.clone()));
        assert!(right.is_terminal().unwrap());
        assert_eq!(infoset.members().unwrap(), vec![root.clone()]);

        game.delete_tree(&root).unwrap();
        assert!(root.is_terminal().unwrap());
        assert!(matches!(right.label(), Err(GameError::StaleHandle("node"))));
        assert!(matches!(infoset.label(), Err(GameError::StaleHandle("infoset"))));
        assert!(player.infosets().unwrap().is_empty());
    }
}
