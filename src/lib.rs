//! # cfr-solver
//!
//! A Counterfactual Regret Minimization (CFR) engine for approximating Nash
//! equilibria in extensive-form games with imperfect information, with four
//! traversal variants (vanilla, chance-sampling, external-sampling,
//! outcome-sampling), an exact best-response exploitability evaluator, and
//! Kuhn Poker as the reference game.
//!
//! ## Quick start
//!
//! ```ignore
//! use cfr_solver::cfr::{Mode, Trainer, TrainerConfig};
//! use cfr_solver::games::kuhn::KuhnGame;
//!
//! let config = TrainerConfig::default().with_mode(Mode::Standard).with_seed(1);
//! let mut trainer = Trainer::new(KuhnGame::new(), config);
//! let stats = trainer.train(1_000_000)?;
//! println!("{} info sets, {} nodes touched", stats.info_sets, stats.node_touched);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: the generic engine — game trait, nodes, traversals, evaluator
//! - [`games`]: game implementations (Kuhn Poker)
//! - [`agent`]: a gameplay agent sampling from a trained policy
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Trainer (generic)                     │
//! │  - four CFR traversals      - node store + RNG           │
//! │  - static-player table      - strategy artifacts         │
//! └──────────────────────────────────────────────────────────┘
//!                        │ implements Game trait
//!                        ▼
//!                  ┌───────────┐
//!                  │   Kuhn    │
//!                  │   Poker   │
//!                  └───────────┘
//! ```

#![warn(missing_docs)]

/// CFR engine module: game trait, nodes, traversal variants, evaluator.
pub mod cfr;

/// Game implementations solvable by the engine.
pub mod games;

/// Gameplay agent backed by a trained policy.
pub mod agent;

// Re-export commonly used types at the crate root for convenience
pub use cfr::{Game, InfoKey, Mode, SolverError, TrainStats, Trainer, TrainerConfig};
