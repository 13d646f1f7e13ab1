//! Error taxonomy for the simulation engine.
//!
//! Three recoverable categories and one programming fault:
//!
//! - [`SimError::InvalidParameter`] -- a value outside its allowed range,
//!   rejected before any state is mutated; the caller can resubmit.
//! - [`SimError::NotInitialized`] -- an operation that needs a live run
//!   was called before `init`; the caller must initialize first.
//! - [`SimError::DimensionMismatch`] -- an internal invariant violation.
//!   Correct use prevents this by construction; if it surfaces, the run is
//!   not silently continued with corrupted state.
//! - [`SimError::UnknownArtist`] -- a store or network access with an id
//!   outside `0..N`. Like dimension mismatches, a programming fault.

use atelier_types::ArtistId;

/// Errors produced by the simulation engine and its components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A parameter value is outside its allowed range.
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// The offending parameter.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The engine has no live run; call `init` first.
    #[error("simulation is not initialized")]
    NotInitialized,

    /// A style vector's length does not match the run's dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The run's configured dimensionality.
        expected: usize,
        /// The length actually supplied.
        actual: usize,
    },

    /// An artist id outside the population was used.
    #[error("unknown artist id {id}")]
    UnknownArtist {
        /// The out-of-range id.
        id: ArtistId,
    },
}

impl SimError {
    /// Shorthand constructor for [`SimError::InvalidParameter`].
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}
