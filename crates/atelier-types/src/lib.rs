//! Shared type definitions for the Atelier simulation.
//!
//! This crate is the single source of truth for the plain-data types used
//! across the Atelier workspace: artist identifiers, simulation parameters,
//! and the frame snapshots streamed to observers.
//!
//! # Modules
//!
//! - [`ids`] -- The dense integer identifier for artists
//! - [`params`] -- Simulation parameters and the mid-run update record
//! - [`frame`] -- Immutable per-tick snapshots sent to observers

pub mod frame;
pub mod ids;
pub mod params;

// Re-export all public types at crate root for convenience.
pub use frame::{Frame, FrameLink, FrameNode};
pub use ids::ArtistId;
pub use params::{NoiseKind, ParamUpdate, SimParams};
