//! Dense integer identifier for artists.
//!
//! Artists are created once per initialization and numbered `0..N`, so the
//! identifier is a plain index wrapper rather than a UUID. The newtype keeps
//! artist ids from mixing with other integers at compile time while
//! serializing as a bare number on the wire.

use serde::{Deserialize, Serialize};

/// Unique identifier for an artist in the simulation.
///
/// Ids are dense (`0..N`) and stable for the lifetime of a run; a
/// re-initialization renumbers the population from zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ArtistId(pub u32);

impl ArtistId {
    /// Create an identifier from a dense index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the id as a `usize` index into per-artist storage.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the inner `u32` value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ArtistId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<ArtistId> for u32 {
    fn from(id: ArtistId) -> Self {
        id.0
    }
}
