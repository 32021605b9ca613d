//! Expected-payoff and exploitability evaluation.
//!
//! Both evaluators walk the full tree with chance enumerated, driven by one
//! strategy closure per player (typically a loaded average policy).
//! Exploitability is the sum over players of the value a best response
//! would attain against the opposition's policies; at a Nash equilibrium of
//! a two-player zero-sum game it is zero.
//!
//! Best response is computed in two phases. The first pass collects, for
//! every information set of the responding player, the game states that
//! reach it together with their opponent-and-chance reach probability (the
//! responder's own reach is factored out of counterfactual value). The
//! second pass walks the tree again, fixing a pure best-response action per
//! information set the first time it is seen, by maximizing the
//! reach-weighted value across the collected states.

use rustc_hash::FxHashMap;

use crate::cfr::game::{Game, InfoKey};

/// A per-player strategy closure: the action distribution at the acting
/// state of a game.
pub type StrategyFn<'a, G> = Box<dyn Fn(&G) -> Vec<f64> + 'a>;

/// Game states reaching each information set, with opponent-and-chance
/// reach probabilities.
type InfoSets<G> = FxHashMap<InfoKey, Vec<(G, f64)>>;

/// Expected payoff per player when every player follows its strategy
/// closure, with chance outcomes enumerated.
pub fn expected_payoffs<G: Game>(game: &G, strategies: &[StrategyFn<'_, G>]) -> Vec<f64> {
    let mut root = game.clone();
    root.reset();
    payoff_walk(&root, strategies)
}

/// Exploitability of the given strategy profile: the sum over players of
/// the best-response value against the other players' strategies.
pub fn exploitability<G: Game>(game: &G, strategies: &[StrategyFn<'_, G>]) -> f64 {
    let mut info_sets = InfoSets::default();
    for player in 0..G::player_num() {
        let mut root = game.clone();
        root.reset();
        create_info_sets(&root, player, strategies, 1.0, &mut info_sets);
    }

    let mut total = 0.0;
    for player in 0..G::player_num() {
        let mut root = game.clone();
        root.reset();
        let mut best_response = FxHashMap::default();
        total += best_response_value(&root, player, strategies, &mut best_response, 1.0, &info_sets);
    }
    total
}

fn payoff_walk<G: Game>(game: &G, strategies: &[StrategyFn<'_, G>]) -> Vec<f64> {
    if game.is_over() {
        return (0..G::player_num()).map(|p| game.payoff(p)).collect();
    }

    let action_num = game.action_num();
    if game.is_chance_node() {
        let mut node_utils = vec![0.0; G::player_num()];
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            let chance_probability = next.chance_probability();
            let utils = payoff_walk(&next, strategies);
            for (node_util, util) in node_utils.iter_mut().zip(utils) {
                *node_util += chance_probability * util;
            }
        }
        return node_utils;
    }

    let player = game.current_player();
    let strategy = strategies[player](game);
    let mut node_utils = vec![0.0; G::player_num()];
    for action in 0..action_num {
        let mut next = game.clone();
        next.take_action(action);
        let utils = payoff_walk(&next, strategies);
        for (node_util, util) in node_utils.iter_mut().zip(utils) {
            *node_util += strategy[action] * util;
        }
    }
    node_utils
}

/// Collect every state where `player_index` acts, keyed by information set,
/// weighted by the reach probability of chance and the *other* players.
/// Branches through the responder's own actions leave the weight unchanged.
fn create_info_sets<G: Game>(
    game: &G,
    player_index: usize,
    strategies: &[StrategyFn<'_, G>],
    po: f64,
    info_sets: &mut InfoSets<G>,
) {
    if game.is_over() {
        return;
    }

    let action_num = game.action_num();
    if game.is_chance_node() {
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            let chance_probability = next.chance_probability();
            create_info_sets(&next, player_index, strategies, po * chance_probability, info_sets);
        }
        return;
    }

    let player = game.current_player();
    if player == player_index {
        info_sets
            .entry(game.info_set_key())
            .or_default()
            .push((game.clone(), po));
    }

    for action in 0..action_num {
        let mut next = game.clone();
        next.take_action(action);
        if player == player_index {
            create_info_sets(&next, player_index, strategies, po, info_sets);
        } else {
            let action_probability = strategies[player](game)[action];
            create_info_sets(&next, player_index, strategies, po * action_probability, info_sets);
        }
    }
}

fn best_response_value<G: Game>(
    game: &G,
    player_index: usize,
    strategies: &[StrategyFn<'_, G>],
    best_response: &mut FxHashMap<InfoKey, Vec<f64>>,
    po: f64,
    info_sets: &InfoSets<G>,
) -> f64 {
    if game.is_over() {
        return game.payoff(player_index);
    }

    let action_num = game.action_num();
    if game.is_chance_node() {
        let mut node_util = 0.0;
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            let chance_probability = next.chance_probability();
            node_util += chance_probability
                * best_response_value(
                    &next,
                    player_index,
                    strategies,
                    best_response,
                    po * chance_probability,
                    info_sets,
                );
        }
        return node_util;
    }

    let player = game.current_player();
    if player != player_index {
        let strategy = strategies[player](game);
        let mut node_util = 0.0;
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            node_util += strategy[action]
                * best_response_value(
                    &next,
                    player_index,
                    strategies,
                    best_response,
                    po * strategy[action],
                    info_sets,
                );
        }
        return node_util;
    }

    let key = game.info_set_key();
    if !best_response.contains_key(&key) {
        // First visit to this information set: pick the action maximizing
        // the reach-weighted value across every state that reaches it.
        let mut action_values = vec![0.0; action_num];
        for (bundled_game, bundled_po) in &info_sets[&key] {
            for (action, action_value) in action_values.iter_mut().enumerate() {
                let mut next = bundled_game.clone();
                next.take_action(action);
                let value = best_response_value(
                    &next,
                    player_index,
                    strategies,
                    best_response,
                    *bundled_po,
                    info_sets,
                );
                *action_value += bundled_po * value;
            }
        }
        let mut br_action = 0;
        for action in 1..action_num {
            if action_values[action] > action_values[br_action] {
                br_action = action;
            }
        }
        let mut one_hot = vec![0.0; action_num];
        one_hot[br_action] = 1.0;
        best_response.insert(key.clone(), one_hot);
    }

    let mut utils = vec![0.0; action_num];
    for (action, util) in utils.iter_mut().enumerate() {
        let mut next = game.clone();
        next.take_action(action);
        *util = best_response_value(&next, player_index, strategies, best_response, po, info_sets);
    }
    let response = &best_response[&key];
    utils
        .iter()
        .zip(response)
        .map(|(&util, &weight)| util * weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::KuhnGame;

    fn constant_policy<'a>(distribution: Vec<f64>) -> StrategyFn<'a, KuhnGame> {
        Box::new(move |_game| distribution.clone())
    }

    #[test]
    fn test_always_pass_payoffs_are_symmetric() {
        let strategies = vec![
            constant_policy(vec![1.0, 0.0]),
            constant_policy(vec![1.0, 0.0]),
        ];
        let payoffs = expected_payoffs(&KuhnGame::new(), &strategies);
        assert_eq!(payoffs.len(), 2);
        for payoff in payoffs {
            assert!(payoff.abs() < 1e-12, "payoff {}", payoff);
        }
    }

    #[test]
    fn test_expected_payoffs_are_zero_sum() {
        let strategies = vec![
            constant_policy(vec![0.5, 0.5]),
            constant_policy(vec![0.5, 0.5]),
        ];
        let payoffs = expected_payoffs(&KuhnGame::new(), &strategies);
        let sum: f64 = payoffs.iter().sum();
        assert!(sum.abs() < 1e-12, "payoffs sum to {}", sum);
    }

    #[test]
    fn test_always_pass_profile_exploitability() {
        // Against an opponent who always passes, betting wins the ante
        // outright for either side, so each best response is worth exactly 1.
        let strategies = vec![
            constant_policy(vec![1.0, 0.0]),
            constant_policy(vec![1.0, 0.0]),
        ];
        let value = exploitability(&KuhnGame::new(), &strategies);
        assert!((value - 2.0).abs() < 1e-9, "exploitability {}", value);
    }

    #[test]
    fn test_uniform_profile_is_exploitable() {
        let strategies = vec![
            constant_policy(vec![0.5, 0.5]),
            constant_policy(vec![0.5, 0.5]),
        ];
        let value = exploitability(&KuhnGame::new(), &strategies);
        assert!(value > 0.0);
    }
}
