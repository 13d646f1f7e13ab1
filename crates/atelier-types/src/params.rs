//! Simulation parameters and the mid-run parameter update record.
//!
//! [`SimParams`] is the full configuration an engine run is built from.
//! Changing the population size, style dimensionality, or average degree
//! requires a fresh initialization; only `alpha` and `noise` may change
//! mid-run, via [`ParamUpdate`].

use serde::{Deserialize, Serialize};

/// Distribution used for the per-tick style perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// Normal(0, sigma) per dimension.
    #[default]
    Gaussian,
    /// Uniform(-sigma, sigma) per dimension.
    Uniform,
}

/// Full parameter set for a simulation run.
///
/// Immutable between initializations except for `alpha` and `noise`,
/// which accept mid-run injection through [`ParamUpdate`]. Identical
/// parameters (seed included) always reproduce the identical run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Number of artists `N`. Fixed for the lifetime of a run.
    pub num_artists: u32,
    /// Dimensionality `D` of the style space.
    pub style_dim: u32,
    /// Target average degree `k` of the influence network. Must be
    /// strictly less than `num_artists`.
    pub avg_degree: u32,
    /// Influence rate: fraction of the gap toward the neighbor centroid
    /// closed per tick. Must lie in `[0, 1]`.
    pub alpha: f32,
    /// Noise magnitude `sigma` applied per dimension per tick. Must be
    /// non-negative.
    pub noise: f32,
    /// Seed for the run's random generator (initial styles, network
    /// topology, edge weights, and per-tick noise).
    pub seed: u64,
    /// Distribution of the per-tick perturbation.
    pub noise_kind: NoiseKind,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            num_artists: 120,
            style_dim: 8,
            avg_degree: 8,
            alpha: 0.25,
            noise: 0.04,
            seed: 42,
            noise_kind: NoiseKind::Gaussian,
        }
    }
}

/// Mid-run parameter injection for an already-initialized engine.
///
/// Unset fields retain their prior values. Unknown fields are rejected
/// at deserialization, so structural parameters (`num_artists`,
/// `style_dim`, `avg_degree`, `seed`) cannot be smuggled through this
/// record -- those require a fresh initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamUpdate {
    /// New influence rate, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
    /// New noise magnitude, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<f32>,
}

impl ParamUpdate {
    /// Whether the update carries no fields at all.
    pub const fn is_empty(&self) -> bool {
        self.alpha.is_none() && self.noise.is_none()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn defaults_match_stock_configuration() {
        let params = SimParams::default();
        assert_eq!(params.num_artists, 120);
        assert_eq!(params.style_dim, 8);
        assert_eq!(params.avg_degree, 8);
        assert_eq!(params.seed, 42);
        assert_eq!(params.noise_kind, NoiseKind::Gaussian);
    }

    #[test]
    fn partial_update_deserializes() {
        let update: ParamUpdate = serde_json::from_str(r#"{"alpha": 0.9}"#).unwrap();
        assert_eq!(update.alpha, Some(0.9));
        assert_eq!(update.noise, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn structural_fields_are_rejected() {
        let result = serde_json::from_str::<ParamUpdate>(r#"{"num_artists": 100}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_object_is_empty_update() {
        let update: ParamUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn noise_kind_uses_lowercase_names() {
        let params: SimParams = serde_json::from_str(r#"{"noise_kind": "uniform"}"#).unwrap();
        assert_eq!(params.noise_kind, NoiseKind::Uniform);
    }
}
