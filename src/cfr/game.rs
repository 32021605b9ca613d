//! Game trait definition for the CFR solver.
//!
//! Any extensive-form game that implements the `Game` trait can be solved
//! using the CFR traversal engine. The trait is a state-machine surface:
//! a game value is reset to the root, actions are applied in place, and
//! the traversals clone the state at every branch.

use rand::Rng;

/// Byte sequence uniquely identifying an information set.
///
/// The key identifies the information set of the *currently acting* player.
/// Games must guarantee that keys from different players never collide;
/// in card games this usually follows from the key starting with the acting
/// player's private card.
pub type InfoKey = Vec<u8>;

/// The interface the traversal engine consumes from a game.
///
/// States must be cheaply clonable because the traversals clone on every
/// branch. All methods are monomorphized; the recursion pays no dynamic
/// dispatch.
///
/// # Player indexing
///
/// Real players are indexed `0..Self::player_num()`. When
/// [`is_chance_node`](Game::is_chance_node) returns `true`, the value of
/// [`current_player`](Game::current_player) is a distinguished index outside
/// that range; callers must test for a chance node before interpreting it.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct MyGame { /* ... */ }
///
/// impl Game for MyGame {
///     fn player_num() -> usize { 2 }
///     fn name() -> &'static str { "my_game" }
///     // ... remaining operations
/// }
/// ```
pub trait Game: Clone {
    /// Number of real players, excluding the chance player.
    fn player_num() -> usize;

    /// Short name of the game, used for strategy artifact directories.
    fn name() -> &'static str;

    /// Reset to the root of the game.
    ///
    /// After the call the next actor is the chance player; callers that want
    /// chance resolved immediately use [`reset_sampled`](Game::reset_sampled).
    fn reset(&mut self);

    /// Reset to the root with chance resolved immediately.
    ///
    /// The default implementation resets and then samples chance outcomes
    /// until a real player is to act, which suits any game whose chance
    /// nodes all sit at the top of the tree.
    fn reset_sampled<R: Rng>(&mut self, rng: &mut R) {
        self.reset();
        while self.is_chance_node() {
            self.sample_chance(rng);
        }
    }

    /// Whether the game has reached a terminal state.
    fn is_over(&self) -> bool;

    /// Whether the next actor is the chance player.
    fn is_chance_node(&self) -> bool;

    /// Index of the player to act.
    ///
    /// Only meaningful for a real player; see the trait-level notes on
    /// player indexing for chance nodes.
    fn current_player(&self) -> usize;

    /// Number of legal actions at the current state.
    ///
    /// At a chance node this is the number of distinct chance outcomes.
    fn action_num(&self) -> usize;

    /// Apply the action with the given index in place.
    ///
    /// Applying a chance action also records its outcome probability, which
    /// is then observable through [`chance_probability`](Game::chance_probability).
    fn take_action(&mut self, action: usize);

    /// Probability of the most recently applied chance action.
    ///
    /// Undefined before any chance action has been applied.
    fn chance_probability(&self) -> f64;

    /// Terminal payoff for the given player.
    fn payoff(&self, player: usize) -> f64;

    /// Information-set key for the currently acting player.
    fn info_set_key(&self) -> InfoKey;

    /// Resolve the current chance node by sampling one outcome.
    ///
    /// The default implementation draws uniformly over the chance outcomes,
    /// which is correct whenever the game's chance distribution is uniform.
    /// Games with non-uniform chance nodes override this.
    fn sample_chance<R: Rng>(&mut self, rng: &mut R) {
        let action = rng.gen_range(0..self.action_num());
        self.take_action(action);
    }
}
