//! Per-artist style state: positions in the continuous style space.
//!
//! [`StyleStore`] owns all `N` style vectors for a run. Every vector has
//! the same fixed length `D`; any attempt to store a vector of a different
//! length fails with [`SimError::DimensionMismatch`]. The store has no side
//! effects beyond its own contents.

use atelier_types::ArtistId;
use rand::Rng;

use crate::error::SimError;

/// Owns the `N x D` style state of a run, ordered by artist id.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleStore {
    /// Fixed vector length `D`.
    dim: usize,
    /// One row per artist, indexed by `ArtistId::index()`.
    vectors: Vec<Vec<f32>>,
}

impl StyleStore {
    /// Create a store of `count` vectors drawn uniformly from `[0, 1)`
    /// per dimension, consuming `count * dim` draws from `rng` in
    /// ascending (artist, dimension) order.
    pub fn random<R: Rng>(count: usize, dim: usize, rng: &mut R) -> Self {
        let vectors = (0..count)
            .map(|_| (0..dim).map(|_| rng.random::<f32>()).collect())
            .collect();
        Self { dim, vectors }
    }

    /// Build a store from explicit rows, verifying every row has length
    /// `dim`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`] on the first row whose
    /// length differs from `dim`.
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self, SimError> {
        for row in &rows {
            if row.len() != dim {
                return Err(SimError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
        }
        Ok(Self { dim, vectors: rows })
    }

    /// Number of artists.
    pub const fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the store holds no artists.
    pub const fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The fixed vector length `D`.
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// The style vector of one artist.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownArtist`] for ids outside `0..N`.
    pub fn get(&self, id: ArtistId) -> Result<&[f32], SimError> {
        self.vectors
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or(SimError::UnknownArtist { id })
    }

    /// Replace the style vector of one artist.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`] if `vector` does not have
    /// length `D`, or [`SimError::UnknownArtist`] for ids outside `0..N`.
    /// The store is unchanged on error.
    pub fn set(&mut self, id: ArtistId, vector: Vec<f32>) -> Result<(), SimError> {
        if vector.len() != self.dim {
            return Err(SimError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        let slot = self
            .vectors
            .get_mut(id.index())
            .ok_or(SimError::UnknownArtist { id })?;
        *slot = vector;
        Ok(())
    }

    /// Replace the entire state with a new set of rows, as produced by a
    /// synchronous tick update.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`] if the row count or any
    /// row length differs from the current shape. The store is unchanged
    /// on error.
    pub fn replace_all(&mut self, rows: Vec<Vec<f32>>) -> Result<(), SimError> {
        if rows.len() != self.vectors.len() {
            return Err(SimError::DimensionMismatch {
                expected: self.vectors.len(),
                actual: rows.len(),
            });
        }
        for row in &rows {
            if row.len() != self.dim {
                return Err(SimError::DimensionMismatch {
                    expected: self.dim,
                    actual: row.len(),
                });
            }
        }
        self.vectors = rows;
        Ok(())
    }

    /// Iterate over `(id, vector)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtistId, &[f32])> {
        (0u32..)
            .map(ArtistId::new)
            .zip(self.vectors.iter().map(Vec::as_slice))
    }

    /// Clone the rows in ascending id order (frame export).
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.vectors.clone()
    }
}
