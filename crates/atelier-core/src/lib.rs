//! Simulation engine for the Atelier style-space simulation.
//!
//! A population of artists evolves through discrete ticks: each artist is
//! pulled toward the weighted centroid of its neighbors in an influence
//! network and perturbed by seeded noise. This crate is pure computation;
//! transport, scheduling, and observation live in `atelier-observer`.
//!
//! # Modules
//!
//! - [`styles`] -- Per-artist style vectors (the `N x D` state)
//! - [`network`] -- Seeded generation of the weighted influence graph
//! - [`update`] -- The synchronous per-tick update rule
//! - [`engine`] -- Orchestration: init, step, parameter injection, frames
//! - [`error`] -- The engine's error taxonomy
//!
//! # Reproducibility
//!
//! One `StdRng` seeded from the run parameters drives initial styles,
//! network topology, edge weights, and per-tick noise, in a fixed draw
//! order. Identical parameters always reproduce byte-identical frames.

pub mod engine;
pub mod error;
pub mod network;
pub mod styles;
pub mod update;

// Re-export primary types for convenience.
pub use engine::SimulationEngine;
pub use error::SimError;
pub use network::InfluenceNetwork;
pub use styles::StyleStore;
