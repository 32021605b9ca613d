//! Node storage and strategy artifacts.
//!
//! [`NodeStore`] owns every [`Node`] discovered during training, keyed by
//! information set. [`StrategySnapshot`] is the serializable artifact the
//! driver writes: the averaged policy, and nothing else. Regrets are never
//! persisted, so an artifact can seed evaluation or a static player but is
//! not a resumable training checkpoint.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::config::SolverError;
use crate::cfr::game::InfoKey;
use crate::cfr::node::Node;

/// A loaded averaged policy: information-set key to action distribution.
///
/// This is the in-memory form of a strategy artifact, consulted by static
/// players, agents, and the evaluator.
pub type AveragePolicy = FxHashMap<InfoKey, Vec<f64>>;

/// Owned mapping from information-set key to [`Node`].
///
/// Nodes are created lazily on first visit with the action count observed
/// there, and live for the store's lifetime; keys are never removed.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: FxHashMap<InfoKey, Node>,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with pre-allocated capacity, for games whose info-set
    /// count is known in advance.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Mutable access to the node for `key`, creating it with `action_num`
    /// actions on first visit.
    pub fn node_mut(&mut self, key: InfoKey, action_num: usize) -> &mut Node {
        self.nodes.entry(key).or_insert_with(|| Node::new(action_num))
    }

    /// The node for `key`, if it has been visited.
    pub fn get(&self, key: &[u8]) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Number of information sets discovered so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no information set has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &InfoKey> {
        self.nodes.keys()
    }

    /// Recompute the current strategy of every node from its regrets.
    ///
    /// The enumerating traversal variants call this once per traversal so
    /// the next traversal reads a stable, refreshed strategy.
    pub fn update_strategies(&mut self) {
        for node in self.nodes.values_mut() {
            node.update_strategy();
        }
    }

    /// The averaged policy over every stored node.
    pub fn average_policy(&mut self) -> AveragePolicy {
        self.nodes
            .iter_mut()
            .map(|(key, node)| (key.clone(), node.average_strategy().to_vec()))
            .collect()
    }
}

/// One averaged-strategy table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    /// Opaque information-set key.
    pub key: InfoKey,
    /// Action distribution; entries sum to 1.
    pub average_strategy: Vec<f64>,
}

/// Serializable averaged policy with provenance metadata.
///
/// Covers both artifact shapes the engine consumes: a full node-store
/// snapshot, and the per-player shape produced by
/// [`filtered`](StrategySnapshot::filtered). Loaders accept either, because
/// lookups only ever touch the acting player's keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    /// Name of the game this policy was trained on.
    pub game: String,
    /// Traversal mode that produced it.
    pub mode: String,
    /// Iterations completed when the snapshot was taken.
    pub iterations: u64,
    /// The averaged policy, sorted by key for stable output.
    pub strategies: Vec<StrategyEntry>,
}

impl StrategySnapshot {
    /// Snapshot the averaged policy of every node in `store`.
    pub fn from_store(game: &str, mode: &str, iterations: u64, store: &mut NodeStore) -> Self {
        let mut strategies: Vec<StrategyEntry> = store
            .nodes
            .iter_mut()
            .map(|(key, node)| StrategyEntry {
                key: key.clone(),
                average_strategy: node.average_strategy().to_vec(),
            })
            .collect();
        strategies.sort_by(|a, b| a.key.cmp(&b.key));
        Self {
            game: game.to_string(),
            mode: mode.to_string(),
            iterations,
            strategies,
        }
    }

    /// Keep only the entries whose key satisfies `keep`, e.g. to produce a
    /// per-player artifact.
    pub fn filtered<F: Fn(&[u8]) -> bool>(&self, keep: F) -> Self {
        Self {
            game: self.game.clone(),
            mode: self.mode.clone(),
            iterations: self.iterations,
            strategies: self
                .strategies
                .iter()
                .filter(|entry| keep(&entry.key))
                .cloned()
                .collect(),
        }
    }

    /// Convert into the lookup table consumed by agents and static players.
    pub fn into_policy(self) -> AveragePolicy {
        self.strategies
            .into_iter()
            .map(|entry| (entry.key, entry.average_strategy))
            .collect()
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SolverError::Io(e.to_string()))?;
        fs::write(path.as_ref(), json)
            .map_err(|e| SolverError::Io(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Read a snapshot previously written by [`save_json`](StrategySnapshot::save_json).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SolverError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| SolverError::Parse(format!("{}: {}", path.as_ref().display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> NodeStore {
        let mut store = NodeStore::new();
        store
            .node_mut(vec![0], 2)
            .accumulate_strategy(&[0.25, 0.75], 4.0);
        store
            .node_mut(vec![1, 0], 2)
            .accumulate_strategy(&[1.0, 0.0], 1.0);
        store
            .node_mut(vec![2, 1], 3)
            .accumulate_strategy(&[0.5, 0.25, 0.25], 2.0);
        store
    }

    #[test]
    fn test_lazy_node_creation() {
        let mut store = NodeStore::new();
        assert!(store.is_empty());
        let node = store.node_mut(vec![7, 1], 2);
        assert_eq!(node.action_num(), 2);
        assert_eq!(store.len(), 1);
        // Revisiting the key returns the same node, not a fresh one.
        store.node_mut(vec![7, 1], 2).set_regret(0, 5.0);
        assert_eq!(store.get(&[7, 1]).unwrap().regret(0), 5.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_average_policy_is_normalized() {
        let mut store = sample_store();
        let policy = store.average_policy();
        assert_eq!(policy.len(), 3);
        for distribution in policy.values() {
            let sum: f64 = distribution.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        assert_eq!(policy[&vec![0u8]], vec![0.25, 0.75]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = sample_store();
        let snapshot = StrategySnapshot::from_store("kuhn", "standard", 10, &mut store);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: StrategySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        let policy = restored.into_policy();
        for entry in &snapshot.strategies {
            assert_eq!(policy[&entry.key], entry.average_strategy);
        }
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let mut store = sample_store();
        let snapshot = StrategySnapshot::from_store("kuhn", "external", 3, &mut store);
        let path = std::env::temp_dir().join(format!(
            "cfr_solver_snapshot_test_{}.json",
            std::process::id()
        ));
        snapshot.save_json(&path).unwrap();
        let restored = StrategySnapshot::load_json(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = StrategySnapshot::load_json("no/such/artifact.json").unwrap_err();
        assert!(matches!(err, SolverError::Io(_)));
    }

    #[test]
    fn test_snapshot_entries_sorted_by_key() {
        let mut store = sample_store();
        let snapshot = StrategySnapshot::from_store("kuhn", "standard", 1, &mut store);
        let keys: Vec<&InfoKey> = snapshot.strategies.iter().map(|e| &e.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_filtered_keeps_matching_keys() {
        let mut store = sample_store();
        let snapshot = StrategySnapshot::from_store("kuhn", "standard", 1, &mut store);
        let filtered = snapshot.filtered(|key| key.len() == 2);
        assert_eq!(filtered.strategies.len(), 2);
        assert!(filtered.strategies.iter().all(|e| e.key.len() == 2));
        assert_eq!(filtered.game, snapshot.game);
    }
}
