//! CFR traversal engine and training driver.
//!
//! Four traversal variants share one structural recursion over the game
//! tree:
//!
//! - **standard** — vanilla CFR; chance outcomes and actions fully
//!   enumerated.
//! - **chance** — chance-sampling CFR; one chance outcome drawn per
//!   traversal, actions fully enumerated.
//! - **external** — external-sampling MCCFR; opponent and chance actions
//!   sampled, the traverser's actions enumerated.
//! - **outcome** — outcome-sampling MCCFR; a single importance-weighted
//!   playout per traversal.
//!
//! The driver owns the game, the node store, and the RNG, and runs the
//! per-iteration loop: one traversal per updating player in ascending
//! order, progress lines at a fixed cadence, and periodic plus final
//! strategy snapshots. Players can be held *static* behind a preloaded
//! average policy; the enumerating variants consult such a policy as pure
//! opponent probability mass, while the sampling variants reject it
//! up front because their stochastically weighted averaging has no sound
//! treatment for a fixed player.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cfr::config::{Mode, SolverError, TrainerConfig};
use crate::cfr::game::Game;
use crate::cfr::storage::{AveragePolicy, NodeStore, StrategySnapshot};

/// Exploration weight mixed into the traverser's sampling distribution by
/// outcome sampling.
const EXPLORATION_EPSILON: f64 = 0.6;

/// Statistics reported after a training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainStats {
    /// Total iterations completed over the trainer's lifetime.
    pub iterations: u64,
    /// Information sets discovered.
    pub info_sets: usize,
    /// Cumulative traversal entries across all iterations.
    pub node_touched: u64,
    /// Wall-clock seconds spent in the last `train` call.
    pub elapsed_seconds: f64,
    /// Iterations per second over the last `train` call.
    pub iterations_per_second: f64,
    /// Per-player utilities observed in the most recent traversals.
    pub expected_payoffs: Vec<f64>,
}

/// The training driver: node store, RNG, mode selector, and iteration loop.
///
/// # Example
/// ```ignore
/// let config = TrainerConfig::default().with_mode(Mode::External).with_seed(1);
/// let mut trainer = Trainer::new(KuhnGame::new(), config);
/// let stats = trainer.train(100_000)?;
/// println!("{} info sets", stats.info_sets);
/// ```
pub struct Trainer<G: Game> {
    game: G,
    config: TrainerConfig,
    nodes: NodeStore,
    rng: StdRng,
    /// Per-player table: `None` means the player's nodes are trained,
    /// `Some(policy)` holds the player to the given fixed average policy.
    fixed_strategies: Vec<Option<AveragePolicy>>,
    node_touched: u64,
    iteration: u64,
    last_utils: Vec<f64>,
}

impl<G: Game> Trainer<G> {
    /// Create a trainer for `game`, seeding the RNG from the config or from
    /// entropy when no seed is given.
    pub fn new(game: G, config: TrainerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            game,
            config,
            nodes: NodeStore::new(),
            rng,
            fixed_strategies: vec![None; G::player_num()],
            node_touched: 0,
            iteration: 0,
            last_utils: vec![0.0; G::player_num()],
        }
    }

    /// Hold `player` to a fixed average policy instead of training it.
    pub fn set_static_strategy(
        &mut self,
        player: usize,
        policy: AveragePolicy,
    ) -> Result<(), SolverError> {
        if player >= G::player_num() {
            return Err(SolverError::InvalidConfig(format!(
                "player index {} out of range for {} players",
                player,
                G::player_num()
            )));
        }
        self.fixed_strategies[player] = Some(policy);
        Ok(())
    }

    /// Load a strategy artifact and hold `player` to it.
    pub fn load_static_strategy<P: AsRef<Path>>(
        &mut self,
        player: usize,
        path: P,
    ) -> Result<(), SolverError> {
        let snapshot = StrategySnapshot::load_json(path)?;
        self.set_static_strategy(player, snapshot.into_policy())
    }

    /// Run the training loop for `iterations` iterations.
    ///
    /// Emits a progress line every `progress_interval` iterations, writes an
    /// intermediate strategy artifact every `snapshot_interval` iterations,
    /// and writes a final artifact when the loop completes.
    pub fn train(&mut self, iterations: u64) -> Result<TrainStats, SolverError> {
        self.validate_mode()?;
        let start = Instant::now();

        for _ in 0..iterations {
            let i = self.iteration;
            self.run_players(i);
            if i % self.config.progress_interval == 0 {
                self.print_progress(i);
            }
            if i != 0 && i % self.config.snapshot_interval == 0 {
                self.write_strategy(Some(i))?;
            }
            self.iteration = i + 1;
        }

        self.write_strategy(None)?;

        let elapsed = start.elapsed().as_secs_f64();
        Ok(TrainStats {
            iterations: self.iteration,
            info_sets: self.nodes.len(),
            node_touched: self.node_touched,
            elapsed_seconds: elapsed,
            iterations_per_second: if elapsed > 0.0 {
                iterations as f64 / elapsed
            } else {
                0.0
            },
            expected_payoffs: self.last_utils.clone(),
        })
    }

    /// Run a single iteration: one traversal per updating player, without
    /// progress output or artifact writes.
    pub fn run_iteration(&mut self) -> Result<(), SolverError> {
        self.validate_mode()?;
        let i = self.iteration;
        self.run_players(i);
        self.iteration = i + 1;
        Ok(())
    }

    /// Cumulative traversal entries, for observability.
    pub fn node_touched(&self) -> u64 {
        self.node_touched
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The trained node store.
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// The driver configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// The averaged policy over every trained node.
    pub fn average_policy(&mut self) -> AveragePolicy {
        self.nodes.average_policy()
    }

    /// Snapshot the averaged policy with provenance metadata.
    pub fn snapshot(&mut self) -> StrategySnapshot {
        StrategySnapshot::from_store(
            G::name(),
            self.config.mode.as_str(),
            self.iteration,
            &mut self.nodes,
        )
    }

    /// Write a strategy artifact under
    /// `<strategy_dir>/<game>/strategy[_<iteration>]_<mode>.json` and return
    /// its path.
    pub fn write_strategy(&mut self, iteration: Option<u64>) -> Result<PathBuf, SolverError> {
        let dir = self.config.strategy_dir.join(G::name());
        fs::create_dir_all(&dir)
            .map_err(|e| SolverError::Io(format!("{}: {}", dir.display(), e)))?;
        let file_name = match iteration {
            Some(i) => format!("strategy_{}_{}.json", i, self.config.mode),
            None => format!("strategy_{}.json", self.config.mode),
        };
        let path = dir.join(file_name);
        self.snapshot().save_json(&path)?;
        Ok(path)
    }

    fn validate_mode(&self) -> Result<(), SolverError> {
        let any_static = self.fixed_strategies.iter().any(Option::is_some);
        if any_static && matches!(self.config.mode, Mode::External | Mode::Outcome) {
            return Err(SolverError::Unsupported(format!(
                "{} sampling uses stochastically weighted averaging and cannot hold players static",
                self.config.mode
            )));
        }
        Ok(())
    }

    fn run_players(&mut self, iteration: u64) {
        for player in 0..G::player_num() {
            if self.fixed_strategies[player].is_some() {
                continue;
            }
            match self.config.mode {
                Mode::Standard => {
                    self.game.reset();
                    let root = self.game.clone();
                    self.last_utils[player] = self.cfr(&root, player, 1.0, 1.0);
                    self.nodes.update_strategies();
                }
                Mode::Chance => {
                    self.game.reset_sampled(&mut self.rng);
                    let root = self.game.clone();
                    self.last_utils[player] = self.chance_sampling_cfr(&root, player, 1.0, 1.0);
                    self.nodes.update_strategies();
                }
                Mode::External => {
                    self.game.reset_sampled(&mut self.rng);
                    let root = self.game.clone();
                    self.last_utils[player] = self.external_sampling_cfr(&root, player);
                }
                Mode::Outcome => {
                    self.game.reset_sampled(&mut self.rng);
                    let root = self.game.clone();
                    let (util, _) =
                        self.outcome_sampling_cfr(&root, player, iteration, 1.0, 1.0, 1.0);
                    self.last_utils[player] = util;
                }
            }
        }
    }

    fn print_progress(&self, iteration: u64) {
        let payoffs: Vec<String> = self.last_utils.iter().map(|u| format!("{:.6}", u)).collect();
        println!(
            "iteration {:>8} | nodes touched {:>12} | info sets {:>6} | expected payoffs ({})",
            iteration,
            self.node_touched,
            self.nodes.len(),
            payoffs.join(", ")
        );
    }

    /// The fixed policy's distribution at the acting info set, if `player`
    /// is static. A static artifact that does not cover a reachable info set
    /// is a fatal setup error.
    fn static_strategy(&self, player: usize, key: &[u8]) -> Option<Vec<f64>> {
        self.fixed_strategies[player].as_ref().map(|policy| {
            match policy.get(key) {
                Some(strategy) => strategy.clone(),
                None => panic!(
                    "static strategy for player {} has no entry for the acting info set",
                    player
                ),
            }
        })
    }

    /// Vanilla CFR. `pi` is the traverser's reach probability, `po` the
    /// combined reach of opponents and chance.
    fn cfr(&mut self, game: &G, player_index: usize, pi: f64, po: f64) -> f64 {
        self.node_touched += 1;

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
                node_util +=
                    chance_probability * self.cfr(&next, player_index, pi, po * chance_probability);
            }
            return node_util;
        }

        let key = game.info_set_key();
        let player = game.current_player();

        if let Some(strategy) = self.static_strategy(player, &key) {
            let mut node_util = 0.0;
            for action in 0..action_num {
                let mut next = game.clone();
                next.take_action(action);
                node_util +=
                    strategy[action] * self.cfr(&next, player_index, pi, po * strategy[action]);
            }
            return node_util;
        }

        let strategy = self
            .nodes
            .node_mut(key.clone(), action_num)
            .strategy()
            .to_vec();

        let mut utils = vec![0.0; action_num];
        let mut node_util = 0.0;
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            utils[action] = if player == player_index {
                self.cfr(&next, player_index, pi * strategy[action], po)
            } else {
                self.cfr(&next, player_index, pi, po * strategy[action])
            };
            node_util += strategy[action] * utils[action];
        }

        if player == player_index {
            let node = self.nodes.node_mut(key, action_num);
            for (action, &util) in utils.iter().enumerate() {
                let regret_sum = node.regret(action) + po * (util - node_util);
                node.set_regret(action, regret_sum);
            }
            node.accumulate_strategy(&strategy, pi);
        }

        node_util
    }

    /// Chance-sampling CFR: identical to vanilla except chance nodes are
    /// resolved by a single draw, and static players are sampled rather than
    /// enumerated.
    fn chance_sampling_cfr(&mut self, game: &G, player_index: usize, pi: f64, po: f64) -> f64 {
        self.node_touched += 1;

        if game.is_over() {
            return game.payoff(player_index);
        }

        if game.is_chance_node() {
            let mut next = game.clone();
            next.sample_chance(&mut self.rng);
            return self.chance_sampling_cfr(&next, player_index, pi, po);
        }

        let action_num = game.action_num();
        let key = game.info_set_key();
        let player = game.current_player();

        if let Some(strategy) = self.static_strategy(player, &key) {
            let action = self.sample_action(&strategy);
            let mut next = game.clone();
            next.take_action(action);
            return self.chance_sampling_cfr(&next, player_index, pi, po);
        }

        let strategy = self
            .nodes
            .node_mut(key.clone(), action_num)
            .strategy()
            .to_vec();

        let mut utils = vec![0.0; action_num];
        let mut node_util = 0.0;
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            utils[action] = if player == player_index {
                self.chance_sampling_cfr(&next, player_index, pi * strategy[action], po)
            } else {
                self.chance_sampling_cfr(&next, player_index, pi, po * strategy[action])
            };
            node_util += strategy[action] * utils[action];
        }

        if player == player_index {
            let node = self.nodes.node_mut(key, action_num);
            for (action, &util) in utils.iter().enumerate() {
                let regret_sum = node.regret(action) + po * (util - node_util);
                node.set_regret(action, regret_sum);
            }
            node.accumulate_strategy(&strategy, pi);
        }

        node_util
    }

    /// External-sampling MCCFR: samples one action at opponent nodes and
    /// enumerates the traverser's actions. Opponent reach on the sampled
    /// path is 1, so regret updates carry no reach weighting, and strategy
    /// mass accumulates with unit weight at opponent nodes only.
    fn external_sampling_cfr(&mut self, game: &G, player_index: usize) -> f64 {
        self.node_touched += 1;

        if game.is_over() {
            return game.payoff(player_index);
        }

        if game.is_chance_node() {
            let mut next = game.clone();
            next.sample_chance(&mut self.rng);
            return self.external_sampling_cfr(&next, player_index);
        }

        let action_num = game.action_num();
        let key = game.info_set_key();
        let player = game.current_player();
        debug_assert!(
            self.fixed_strategies[player].is_none(),
            "external sampling reached a static player"
        );

        let strategy = {
            let node = self.nodes.node_mut(key.clone(), action_num);
            node.update_strategy();
            node.strategy().to_vec()
        };

        if player != player_index {
            let action = self.sample_action(&strategy);
            let mut next = game.clone();
            next.take_action(action);
            let util = self.external_sampling_cfr(&next, player_index);

            self.nodes
                .node_mut(key, action_num)
                .accumulate_strategy(&strategy, 1.0);
            return util;
        }

        let mut utils = vec![0.0; action_num];
        let mut node_util = 0.0;
        for action in 0..action_num {
            let mut next = game.clone();
            next.take_action(action);
            utils[action] = self.external_sampling_cfr(&next, player_index);
            node_util += strategy[action] * utils[action];
        }

        let node = self.nodes.node_mut(key, action_num);
        for (action, &util) in utils.iter().enumerate() {
            let regret_sum = node.regret(action) + util - node_util;
            node.set_regret(action, regret_sum);
        }

        node_util
    }

    /// Outcome-sampling MCCFR: one playout per traversal, sampled from the
    /// traverser's ε-greedy mixture and the opponents' current strategies.
    /// Returns the importance-weighted utility and the tail product of the
    /// traverser's strategy along the sampled suffix.
    ///
    /// `_iteration` is threaded through for annealing the exploration
    /// constant; the regret update does not depend on it.
    fn outcome_sampling_cfr(
        &mut self,
        game: &G,
        player_index: usize,
        _iteration: u64,
        pi: f64,
        po: f64,
        s: f64,
    ) -> (f64, f64) {
        self.node_touched += 1;

        if game.is_over() {
            return (game.payoff(player_index) / s, 1.0);
        }

        if game.is_chance_node() {
            let mut next = game.clone();
            next.sample_chance(&mut self.rng);
            return self.outcome_sampling_cfr(&next, player_index, _iteration, pi, po, s);
        }

        let action_num = game.action_num();
        let key = game.info_set_key();
        let player = game.current_player();
        debug_assert!(
            self.fixed_strategies[player].is_none(),
            "outcome sampling reached a static player"
        );

        let strategy = {
            let node = self.nodes.node_mut(key.clone(), action_num);
            node.update_strategy();
            node.strategy().to_vec()
        };

        let probability: Vec<f64> = if player == player_index {
            strategy
                .iter()
                .map(|&p| EXPLORATION_EPSILON / action_num as f64 + (1.0 - EXPLORATION_EPSILON) * p)
                .collect()
        } else {
            strategy.clone()
        };
        let chosen = self.sample_action(&probability);

        let mut next = game.clone();
        next.take_action(chosen);
        let new_pi = pi * if player == player_index { strategy[chosen] } else { 1.0 };
        let new_po = po * if player == player_index { 1.0 } else { strategy[chosen] };
        let (util, p_tail) = self.outcome_sampling_cfr(
            &next,
            player_index,
            _iteration,
            new_pi,
            new_po,
            s * probability[chosen],
        );

        let node = self.nodes.node_mut(key, action_num);
        if player == player_index {
            let weight = util * po;
            for action in 0..action_num {
                let regret = if action == chosen {
                    weight * (1.0 - strategy[chosen]) * p_tail
                } else {
                    -weight * p_tail * strategy[chosen]
                };
                let regret_sum = node.regret(action) + regret;
                node.set_regret(action, regret_sum);
            }
        } else {
            node.accumulate_strategy(&strategy, po / s);
        }

        (util, p_tail * strategy[chosen])
    }

    /// Sample an action index from a probability distribution by cumulative
    /// scan; the last index absorbs floating-point shortfall.
    fn sample_action(&mut self, distribution: &[f64]) -> usize {
        let r: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (action, &probability) in distribution.iter().enumerate() {
            cumulative += probability;
            if r < cumulative {
                return action;
            }
        }
        distribution.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::{KuhnGame, BET, NUM_CARDS, PASS};

    fn temp_strategy_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cfr_solver_trainer_{}_{}", tag, std::process::id()))
    }

    fn quiet_config(tag: &str) -> TrainerConfig {
        TrainerConfig::default()
            .with_seed(1)
            .with_strategy_dir(temp_strategy_dir(tag))
            .with_progress_interval(1_000_000)
    }

    /// Uniform policy covering both of player 0's decision points: the root
    /// and the pass-bet continuation.
    fn uniform_first_player_policy() -> AveragePolicy {
        let mut policy = AveragePolicy::default();
        for card in 0..NUM_CARDS as u8 {
            policy.insert(vec![card], vec![0.5, 0.5]);
            policy.insert(vec![card, PASS as u8, BET as u8], vec![0.5, 0.5]);
        }
        policy
    }

    #[test]
    fn test_standard_training_discovers_all_info_sets() {
        let mut trainer = Trainer::new(KuhnGame::new(), quiet_config("standard"));
        let stats = trainer.train(10).unwrap();
        // 3 cards x 4 reachable histories per card.
        assert_eq!(stats.info_sets, 12);
        assert_eq!(stats.iterations, 10);
        assert!(stats.node_touched > 0);
        assert_eq!(trainer.node_touched(), stats.node_touched);
        let _ = fs::remove_dir_all(temp_strategy_dir("standard"));
    }

    #[test]
    fn test_training_writes_final_artifact() {
        let dir = temp_strategy_dir("artifact");
        let config = quiet_config("artifact");
        let mut trainer = Trainer::new(KuhnGame::new(), config);
        trainer.train(10).unwrap();

        let path = dir.join("kuhn").join("strategy_standard.json");
        let snapshot = StrategySnapshot::load_json(&path).unwrap();
        assert_eq!(snapshot.game, "kuhn");
        assert_eq!(snapshot.mode, "standard");
        assert_eq!(snapshot.iterations, 10);
        assert_eq!(snapshot.strategies.len(), 12);
        for entry in &snapshot.strategies {
            let sum: f64 = entry.average_strategy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_static_player_keys_never_enter_store() {
        let mut trainer = Trainer::new(KuhnGame::new(), quiet_config("static"));
        trainer
            .set_static_strategy(0, uniform_first_player_policy())
            .unwrap();
        trainer.train(100).unwrap();

        // Player 1 acts exactly once per hand, so every trained key is
        // [card, first_action].
        assert_eq!(trainer.nodes().len(), 6);
        for key in trainer.nodes().keys() {
            assert_eq!(key.len(), 2, "unexpected info set {:?}", key);
        }
        let _ = fs::remove_dir_all(temp_strategy_dir("static"));
    }

    #[test]
    fn test_sampling_modes_reject_static_players() {
        for mode in [Mode::External, Mode::Outcome] {
            let config = quiet_config("reject").with_mode(mode);
            let mut trainer = Trainer::new(KuhnGame::new(), config);
            trainer
                .set_static_strategy(0, uniform_first_player_policy())
                .unwrap();
            let err = trainer.train(1).unwrap_err();
            assert!(matches!(err, SolverError::Unsupported(_)), "mode {}", mode);
            let err = trainer.run_iteration().unwrap_err();
            assert!(matches!(err, SolverError::Unsupported(_)));
            // Nothing ran: no nodes were created, no artifact written.
            assert!(trainer.nodes().is_empty());
            assert_eq!(trainer.node_touched(), 0);
        }
    }

    #[test]
    fn test_static_player_index_out_of_range() {
        let mut trainer = Trainer::new(KuhnGame::new(), quiet_config("range"));
        let err = trainer
            .set_static_strategy(2, AveragePolicy::default())
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig(_)));
    }

    #[test]
    fn test_seeded_sampling_runs_are_reproducible() {
        let run = || {
            let config = quiet_config("seeded").with_mode(Mode::External);
            let mut trainer = Trainer::new(KuhnGame::new(), config);
            for _ in 0..500 {
                trainer.run_iteration().unwrap();
            }
            let mut policy: Vec<_> = trainer.average_policy().into_iter().collect();
            policy.sort_by(|a, b| a.0.cmp(&b.0));
            policy
        };
        assert_eq!(run(), run());
    }
}
