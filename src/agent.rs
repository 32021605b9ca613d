//! Gameplay agent backed by a trained average policy.

use std::marker::PhantomData;
use std::path::Path;

use rand::Rng;

use crate::cfr::config::SolverError;
use crate::cfr::game::Game;
use crate::cfr::storage::{AveragePolicy, StrategySnapshot};

/// An agent that plays a loaded average strategy.
///
/// The policy is consulted by information-set key, so the agent works for
/// any game whose artifact it was trained on. A policy that does not cover
/// a reachable information set is a fatal setup error.
pub struct CfrAgent<G: Game> {
    policy: AveragePolicy,
    _game: PhantomData<G>,
}

impl<G: Game> CfrAgent<G> {
    /// Wrap an already-loaded policy.
    pub fn new(policy: AveragePolicy) -> Self {
        Self {
            policy,
            _game: PhantomData,
        }
    }

    /// Load the policy from a strategy artifact.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        Ok(Self::new(StrategySnapshot::load_json(path)?.into_policy()))
    }

    /// The action distribution at the acting information set.
    pub fn strategy(&self, game: &G) -> &[f64] {
        match self.policy.get(&game.info_set_key()) {
            Some(strategy) => strategy,
            None => panic!("loaded strategy has no entry for the acting info set"),
        }
    }

    /// Sample one action from the policy's distribution.
    pub fn choose_action<R: Rng>(&self, game: &G, rng: &mut R) -> usize {
        let action_num = game.action_num();
        if action_num == 1 {
            return 0;
        }
        let strategy = self.strategy(game);
        let r: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (action, &probability) in strategy.iter().enumerate() {
            cumulative += probability;
            if r < cumulative {
                return action;
            }
        }
        action_num - 1
    }
}
