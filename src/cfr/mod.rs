//! CFR (Counterfactual Regret Minimization) engine.
//!
//! This module contains the generic regret-minimization machinery for
//! extensive-form games with imperfect information:
//!
//! 1. A game implements the [`Game`] trait.
//! 2. A [`Trainer`] runs one of four traversal variants over it, growing a
//!    store of per-information-set regret/strategy nodes.
//! 3. The averaged policy is persisted as a [`StrategySnapshot`] and its
//!    quality measured with [`exploitability`](exploitability::exploitability).
//!
//! # Supported variants
//!
//! - **standard** — vanilla CFR, everything enumerated
//! - **chance** — chance-sampling CFR
//! - **external** — external-sampling MCCFR
//! - **outcome** — outcome-sampling MCCFR
//!
//! # Theory
//!
//! Regret matching plays each action proportionally to its positive
//! cumulative counterfactual regret:
//!
//! ```text
//! strategy[a] = max(0, regret[a]) / sum_b max(0, regret[b])
//! ```
//!
//! The *average* strategy accumulated across iterations converges to a Nash
//! equilibrium in two-player zero-sum games, with average regret shrinking
//! as O(1/sqrt(T)).
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete
//!   Information" (2007)
//! - Lanctot, M., et al. "Monte Carlo Sampling for Regret Minimization in
//!   Extensive Games" (2009)

pub mod config;
pub mod exploitability;
pub mod game;
pub mod node;
pub mod storage;
pub mod trainer;

// Re-export main types for convenient access
pub use config::{Mode, SolverError, TrainerConfig};
pub use exploitability::{expected_payoffs, exploitability, StrategyFn};
pub use game::{Game, InfoKey};
pub use node::Node;
pub use storage::{AveragePolicy, NodeStore, StrategyEntry, StrategySnapshot};
pub use trainer::{TrainStats, Trainer};
