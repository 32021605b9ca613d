//! Game implementations for the CFR engine.
//!
//! Games here implement the [`Game`](crate::cfr::Game) trait and serve both
//! as reference implementations of the contract and as validation targets:
//! Kuhn Poker has a known Nash equilibrium, so convergence of every
//! traversal variant can be checked against closed-form values.
//!
//! ## Adding a new game
//!
//! 1. Create a module under `src/games/`.
//! 2. Implement the `Game` trait for a cheaply clonable state type.
//! 3. Give each player's information set a collision-free byte key.
//! 4. Add tests pinning the game's terminal payoffs and, if known, its
//!    equilibrium.

pub mod kuhn;
