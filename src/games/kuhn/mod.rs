//! Kuhn Poker implementation for the CFR engine.
//!
//! Kuhn Poker is the standard minimal poker game for validating CFR
//! implementations because its Nash equilibrium is known in closed form.
//!
//! ## Game rules
//!
//! - 3 cards ranked `0 < 1 < 2`, 2 players, each antes 1 chip.
//! - A single chance action deals a permutation of the deck; the first two
//!   entries are the players' private cards.
//! - Players alternate starting from player 0, choosing `PASS` or `BET`
//!   (bet and call both cost 1 chip).
//! - Betting ends when the action returns to the first bettor or when every
//!   player has passed; the highest card among the committed players wins.
//!
//! ## Chance space
//!
//! The root chance node has `3! = 6` outcomes, each with probability `1/6`.
//! A chance action index is decoded into a deck permutation, so enumerating
//! actions `0..6` enumerates every deal exactly once.
//!
//! ## Information sets
//!
//! The acting player's key is the byte sequence
//! `[private_card, a_0, a_1, ...]` over the actions taken so far. Keys from
//! different players never collide because the private cards differ.
//!
//! ## Known equilibrium
//!
//! Player 0 bets with the jack at rate α ≤ 1/3, never bets the queen first,
//! and bets the king at 3α; player 1 facing a bet folds the jack, calls
//! with the queen at 1/3, and always calls with the king. The game value is
//! -1/18 for player 0.

use crate::cfr::game::{Game, InfoKey};

/// Number of players.
pub const NUM_PLAYERS: usize = 2;

/// Number of cards: one more than the number of players.
pub const NUM_CARDS: usize = NUM_PLAYERS + 1;

/// Action index: pass (check, or fold when facing a bet).
pub const PASS: usize = 0;

/// Action index: bet (or call when facing a bet).
pub const BET: usize = 1;

const PLAYER_ACTION_NUM: usize = 2;

/// Sentinel player index designating the chance player.
const CHANCE_PLAYER: usize = NUM_PLAYERS + 1;

/// Room for the private card plus every recorded action.
const MAX_KEY_LEN: usize = 10;

const fn factorial(n: usize) -> usize {
    let mut product = 1;
    let mut i = 2;
    while i <= n {
        product *= i;
        i += 1;
    }
    product
}

/// Number of distinct deals at the root chance node.
const CHANCE_ACTION_NUM: usize = factorial(NUM_CARDS);

/// Kuhn Poker game state.
///
/// Small and cheap to clone; the traversal engine clones it on every
/// branch. A fresh or reset game sits at the root chance node.
#[derive(Debug, Clone)]
pub struct KuhnGame {
    /// Deck permutation; the first `NUM_PLAYERS` entries are private cards.
    cards: [u8; NUM_CARDS],
    payoffs: [f64; NUM_PLAYERS],
    current_player: usize,
    chance_prob: f64,
    /// Turn index of the first bet, if any. Turns count from 1.
    first_bet_turn: Option<usize>,
    bet_num: usize,
    turn: usize,
    over: bool,
    /// Per-player info-set bytes: private card followed by the actions seen.
    info_sets: [[u8; MAX_KEY_LEN]; NUM_PLAYERS],
}

impl KuhnGame {
    /// Create a game at the root chance node.
    pub fn new() -> Self {
        let mut game = Self {
            cards: [0; NUM_CARDS],
            payoffs: [0.0; NUM_PLAYERS],
            current_player: CHANCE_PLAYER,
            chance_prob: 0.0,
            first_bet_turn: None,
            bet_num: 0,
            turn: 0,
            over: false,
            info_sets: [[0; MAX_KEY_LEN]; NUM_PLAYERS],
        };
        game.reset();
        game
    }

    /// Decode a permutation index into a deal and hand the turn to player 0.
    fn deal(&mut self, permutation: usize) {
        for (i, card) in self.cards.iter_mut().enumerate() {
            *card = i as u8;
        }
        let mut index = permutation;
        for c1 in (1..NUM_CARDS).rev() {
            let c2 = index % (c1 + 1);
            self.cards.swap(c1, c2);
            index /= c1 + 1;
        }
        for (player, info_set) in self.info_sets.iter_mut().enumerate() {
            info_set[0] = self.cards[player];
        }
        self.turn = 0;
        self.current_player = 0;
        self.first_bet_turn = None;
        self.bet_num = 0;
        self.over = false;
    }

    fn argmax<T: PartialOrd + Copy>(values: &[T]) -> usize {
        let mut best = 0;
        for i in 1..values.len() {
            if values[i] > values[best] {
                best = i;
            }
        }
        best
    }

    /// Every player committed two chips: showdown for the full pot.
    fn settle_showdown_all(&mut self) {
        let winner = Self::argmax(&self.cards[..NUM_PLAYERS]);
        for (player, payoff) in self.payoffs.iter_mut().enumerate() {
            *payoff = if player == winner {
                (2 * (NUM_PLAYERS - 1)) as f64
            } else {
                -2.0
            };
        }
        self.over = true;
    }

    /// Nobody bet: the highest card takes the antes.
    fn settle_no_bet(&mut self) {
        let winner = Self::argmax(&self.cards[..NUM_PLAYERS]);
        for (player, payoff) in self.payoffs.iter_mut().enumerate() {
            *payoff = if player == winner {
                (NUM_PLAYERS - 1) as f64
            } else {
                -1.0
            };
        }
        self.over = true;
    }

    /// A single bet went uncalled: the bettor takes the antes.
    fn settle_single_bet(&mut self, bettor: usize) {
        for (player, payoff) in self.payoffs.iter_mut().enumerate() {
            *payoff = if player == bettor {
                (NUM_PLAYERS - 1) as f64
            } else {
                -1.0
            };
        }
        self.over = true;
    }

    /// Two or more bets: showdown among the bettors, non-bettors forfeit
    /// their ante.
    fn settle_multi_bet(&mut self) {
        let mut bettor_cards = [-1i32; NUM_PLAYERS];
        let mut is_bettor = [false; NUM_PLAYERS];
        for turn in 1..=self.turn {
            if self.info_sets[0][turn] == BET as u8 {
                let player = (turn - 1) % NUM_PLAYERS;
                bettor_cards[player] = self.cards[player] as i32;
                is_bettor[player] = true;
            }
        }
        let winner = Self::argmax(&bettor_cards);
        for (player, payoff) in self.payoffs.iter_mut().enumerate() {
            *payoff = if !is_bettor[player] {
                -1.0
            } else if player == winner {
                (2 * (self.bet_num - 1) + (NUM_PLAYERS - self.bet_num)) as f64
            } else {
                -2.0
            };
        }
        self.over = true;
    }
}

impl Default for KuhnGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for KuhnGame {
    fn player_num() -> usize {
        NUM_PLAYERS
    }

    fn name() -> &'static str {
        "kuhn"
    }

    fn reset(&mut self) {
        for (i, card) in self.cards.iter_mut().enumerate() {
            *card = i as u8;
        }
        self.payoffs = [0.0; NUM_PLAYERS];
        self.current_player = CHANCE_PLAYER;
        self.chance_prob = 0.0;
        self.first_bet_turn = None;
        self.bet_num = 0;
        self.turn = 0;
        self.over = false;
        self.info_sets = [[0; MAX_KEY_LEN]; NUM_PLAYERS];
    }

    fn is_over(&self) -> bool {
        self.over
    }

    fn is_chance_node(&self) -> bool {
        self.current_player == CHANCE_PLAYER
    }

    fn current_player(&self) -> usize {
        self.current_player
    }

    fn action_num(&self) -> usize {
        if self.is_chance_node() {
            CHANCE_ACTION_NUM
        } else {
            PLAYER_ACTION_NUM
        }
    }

    fn take_action(&mut self, action: usize) {
        if self.current_player == CHANCE_PLAYER {
            self.chance_prob = 1.0 / CHANCE_ACTION_NUM as f64;
            self.deal(action);
            return;
        }

        debug_assert!(action < PLAYER_ACTION_NUM, "illegal action {}", action);
        debug_assert!(!self.over, "action applied to a finished game");

        self.turn += 1;
        self.bet_num += action;
        for info_set in &mut self.info_sets {
            info_set[self.turn] = action as u8;
        }
        if self.first_bet_turn.is_none() && action == BET {
            self.first_bet_turn = Some(self.turn);
        }

        let next_player = self.turn % NUM_PLAYERS;
        if self.turn > 1 {
            // The betting has closed either when the action returned to the
            // first bettor, or when every player passed and the closing
            // action was itself a pass.
            let terminal_pass = match self.first_bet_turn {
                Some(first_bet) => self.turn - first_bet == NUM_PLAYERS - 1,
                None => self.turn == NUM_PLAYERS && self.info_sets[0][self.turn] == PASS as u8,
            };

            if self.bet_num == NUM_PLAYERS {
                self.settle_showdown_all();
            } else if terminal_pass {
                if self.bet_num == 0 {
                    self.settle_no_bet();
                } else if self.bet_num == 1 {
                    self.settle_single_bet(next_player);
                } else {
                    self.settle_multi_bet();
                }
            }
        }
        self.current_player = next_player;
    }

    fn chance_probability(&self) -> f64 {
        self.chance_prob
    }

    fn payoff(&self, player: usize) -> f64 {
        self.payoffs[player]
    }

    fn info_set_key(&self) -> InfoKey {
        debug_assert!(
            self.current_player < NUM_PLAYERS,
            "info set requested for the chance player"
        );
        self.info_sets[self.current_player][..=self.turn].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dealt(permutation: usize) -> KuhnGame {
        let mut game = KuhnGame::new();
        game.take_action(permutation);
        game
    }

    fn play(game: &mut KuhnGame, actions: &[usize]) {
        for &action in actions {
            game.take_action(action);
        }
    }

    #[test]
    fn test_root_is_chance_node() {
        let game = KuhnGame::new();
        assert!(game.is_chance_node());
        assert!(!game.is_over());
        assert_eq!(game.action_num(), 6);
    }

    #[test]
    fn test_chance_outcomes_are_distinct_and_uniform() {
        let mut deals = std::collections::HashSet::new();
        for permutation in 0..6 {
            let game = dealt(permutation);
            assert!((game.chance_probability() - 1.0 / 6.0).abs() < 1e-12);
            assert!(!game.is_chance_node());
            assert_eq!(game.current_player(), 0);
            assert_eq!(game.action_num(), 2);
            deals.insert(game.cards);
        }
        assert_eq!(deals.len(), 6);
    }

    #[test]
    fn test_deal_decodes_known_permutations() {
        assert_eq!(dealt(0).cards, [1, 2, 0]);
        assert_eq!(dealt(3).cards, [2, 1, 0]);
        assert_eq!(dealt(5).cards, [0, 1, 2]);
    }

    #[test]
    fn test_info_set_keys_follow_private_card_and_history() {
        let mut game = dealt(5); // cards [0, 1, 2]
        assert_eq!(game.info_set_key(), vec![0]);
        game.take_action(PASS);
        assert_eq!(game.current_player(), 1);
        assert_eq!(game.info_set_key(), vec![1, PASS as u8]);
        game.take_action(BET);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.info_set_key(), vec![0, PASS as u8, BET as u8]);
        assert!(!game.is_over());
    }

    #[test]
    fn test_all_pass_goes_to_showdown() {
        let mut game = dealt(5); // player 0 holds 0, player 1 holds 1
        play(&mut game, &[PASS, PASS]);
        assert!(game.is_over());
        assert_eq!(game.payoff(0), -1.0);
        assert_eq!(game.payoff(1), 1.0);
    }

    #[test]
    fn test_uncalled_bet_wins_the_antes() {
        let mut game = dealt(5); // worse card bets, better card folds
        play(&mut game, &[BET, PASS]);
        assert!(game.is_over());
        assert_eq!(game.payoff(0), 1.0);
        assert_eq!(game.payoff(1), -1.0);
    }

    #[test]
    fn test_bet_call_showdown() {
        let mut game = dealt(3); // player 0 holds 2, player 1 holds 1
        play(&mut game, &[BET, BET]);
        assert!(game.is_over());
        assert_eq!(game.payoff(0), 2.0);
        assert_eq!(game.payoff(1), -2.0);

        let mut game = dealt(0); // player 0 holds 1, player 1 holds 2
        play(&mut game, &[BET, BET]);
        assert_eq!(game.payoff(0), -2.0);
        assert_eq!(game.payoff(1), 2.0);
    }

    #[test]
    fn test_pass_bet_fold() {
        let mut game = dealt(0);
        play(&mut game, &[PASS, BET, PASS]);
        assert!(game.is_over());
        assert_eq!(game.payoff(0), -1.0);
        assert_eq!(game.payoff(1), 1.0);
    }

    #[test]
    fn test_pass_bet_call_showdown() {
        let mut game = dealt(0); // player 0 holds 1, player 1 holds 2
        play(&mut game, &[PASS, BET, BET]);
        assert!(game.is_over());
        assert_eq!(game.payoff(0), -2.0);
        assert_eq!(game.payoff(1), 2.0);
    }

    #[test]
    fn test_payoffs_are_zero_sum() {
        for permutation in 0..6 {
            for line in [
                vec![PASS, PASS],
                vec![PASS, BET, PASS],
                vec![PASS, BET, BET],
                vec![BET, PASS],
                vec![BET, BET],
            ] {
                let mut game = dealt(permutation);
                play(&mut game, &line);
                assert!(game.is_over());
                let sum = game.payoff(0) + game.payoff(1);
                assert_eq!(sum, 0.0, "deal {} line {:?}", permutation, line);
            }
        }
    }

    #[test]
    fn test_reset_sampled_deals_a_valid_hand() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut game = KuhnGame::new();
        for _ in 0..32 {
            game.reset_sampled(&mut rng);
            assert!(!game.is_chance_node());
            assert!(!game.is_over());
            assert_eq!(game.current_player(), 0);
            assert_ne!(game.cards[0], game.cards[1]);
        }
    }
}
