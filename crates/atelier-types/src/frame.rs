//! Immutable per-tick snapshots streamed to observers.
//!
//! A [`Frame`] is the unit of communication between the engine and
//! visualization clients: the tick number, the node and link lists of the
//! influence network, every artist's raw style vector, and the optional
//! genre labels. Frames are produced by the engine and never mutated after
//! emission; observers hold copies and no write access.

use serde::{Deserialize, Serialize};

use crate::ids::ArtistId;

/// A node record in a frame: one artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameNode {
    /// The artist this node represents.
    pub id: ArtistId,
}

/// A weighted link record in a frame: one influence edge.
///
/// Links are undirected; each edge appears once with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameLink {
    /// One endpoint of the edge.
    pub source: ArtistId,
    /// The other endpoint of the edge.
    pub target: ArtistId,
    /// Influence weight, strictly positive.
    pub weight: f32,
}

/// Immutable snapshot of the full simulation state at one tick.
///
/// `styles` and `genres` are ordered by artist id, so `styles[i]` is the
/// style vector of artist `i`. Genre labels are display-only derived data;
/// they stay `null` until a clustering pass assigns them and never feed
/// back into the update rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The tick this snapshot was taken at.
    pub tick: u64,
    /// One node per artist, ordered by id.
    pub nodes: Vec<FrameNode>,
    /// The influence network's edges.
    pub links: Vec<FrameLink>,
    /// Raw style vectors, one row of `D` floats per artist.
    pub styles: Vec<Vec<f32>>,
    /// Optional genre label per artist.
    pub genres: Vec<Option<u32>>,
}
