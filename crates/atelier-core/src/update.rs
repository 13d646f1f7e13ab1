//! The per-tick update rule: neighbor pull plus stochastic drift.
//!
//! For each artist `i` with style `x_i` and neighbors `{(j, w_ij)}`:
//!
//! 1. Weighted neighbor centroid: `c_i = sum(w_ij * x_j) / sum(w_ij)`.
//!    An artist with no neighbors feels no pull (`c_i = x_i`).
//! 2. Pull: `p_i = x_i + alpha * (c_i - x_i)`, elementwise over all `D`
//!    dimensions.
//! 3. Drift: one noise draw per `(artist, dimension)` from the run's
//!    seeded generator, in ascending `(artist, dimension)` order. When
//!    `sigma == 0` the stage draws nothing, so the generator's draw count
//!    stays a pure function of the parameters.
//! 4. Next state: `x_i' = p_i + n_i`. The style space is unbounded; no
//!    clamping is applied.
//!
//! The rule is computed entirely from the previous tick's snapshot:
//! every artist reads pre-tick neighbor values, so evaluation order is
//! not observable in the result. The function is pure apart from the
//! generator it advances.

use atelier_types::{ArtistId, NoiseKind};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::network::InfluenceNetwork;
use crate::styles::StyleStore;

/// Per-dimension noise source for one tick.
enum NoiseSource {
    /// `sigma == 0`: draw nothing.
    Off,
    /// Normal(0, sigma).
    Gaussian(Normal<f32>),
    /// Uniform(-sigma, sigma).
    Uniform(f32),
}

impl NoiseSource {
    fn new(sigma: f32, kind: NoiseKind) -> Result<Self, SimError> {
        if sigma < 0.0 || !sigma.is_finite() {
            return Err(SimError::invalid(
                "noise",
                format!("noise magnitude must be finite and non-negative, got {sigma}"),
            ));
        }
        if sigma <= 0.0 {
            return Ok(Self::Off);
        }
        match kind {
            NoiseKind::Gaussian => Normal::new(0.0, sigma)
                .map(Self::Gaussian)
                .map_err(|e| SimError::invalid("noise", format!("bad distribution: {e}"))),
            NoiseKind::Uniform => Ok(Self::Uniform(sigma)),
        }
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> f32 {
        match *self {
            Self::Off => 0.0,
            Self::Gaussian(normal) => normal.sample(rng),
            Self::Uniform(sigma) => rng.random_range(-sigma..=sigma),
        }
    }
}

/// Compute the next full style state from the previous tick's snapshot.
///
/// Returns the new rows in ascending artist order without touching the
/// store itself; the caller swaps them in once the whole population has
/// been computed, which is what makes the update synchronous.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] for an out-of-range `alpha` or
/// `sigma`, or [`SimError::UnknownArtist`] if the store and network
/// disagree on the population (a programming fault).
pub fn advance<R: Rng>(
    store: &StyleStore,
    network: &InfluenceNetwork,
    alpha: f32,
    sigma: f32,
    noise_kind: NoiseKind,
    rng: &mut R,
) -> Result<Vec<Vec<f32>>, SimError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(SimError::invalid(
            "alpha",
            format!("influence rate must lie in [0, 1], got {alpha}"),
        ));
    }
    let noise = NoiseSource::new(sigma, noise_kind)?;

    let mut next = Vec::with_capacity(store.len());
    for (id, current) in store.iter() {
        let neighbors = network.neighbors(id)?;
        let centroid = weighted_centroid(store, current, neighbors)?;

        let row = current
            .iter()
            .zip(centroid.iter())
            .map(|(&x, &c)| x + alpha * (c - x) + noise.draw(rng))
            .collect();
        next.push(row);
    }
    Ok(next)
}

/// The weighted mean of the neighbors' pre-tick styles, or the artist's
/// own style when it has no neighbors.
fn weighted_centroid(
    store: &StyleStore,
    own: &[f32],
    neighbors: &[(ArtistId, f32)],
) -> Result<Vec<f32>, SimError> {
    if neighbors.is_empty() {
        return Ok(own.to_vec());
    }

    let mut sum = vec![0.0f32; own.len()];
    let mut total_weight = 0.0f32;
    for &(neighbor, weight) in neighbors {
        let style = store.get(neighbor)?;
        for (acc, &value) in sum.iter_mut().zip(style.iter()) {
            *acc += weight * value;
        }
        total_weight += weight;
    }

    // Weights are strictly positive by construction, so the total can
    // only be zero for an empty neighbor list, handled above.
    for acc in &mut sum {
        *acc /= total_weight;
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::float_cmp,
        clippy::arithmetic_side_effects,
        clippy::cast_precision_loss
    )]

    use atelier_types::ArtistId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn two_agent_fixture() -> (StyleStore, InfluenceNetwork) {
        let store = StyleStore::from_rows(1, vec![vec![0.0], vec![10.0]]).unwrap();
        let network = InfluenceNetwork::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        (store, network)
    }

    #[test]
    fn synchronous_update_is_order_independent() {
        // Both agents must read the pre-tick value of the other: with
        // alpha = 0.5 and no noise, 0.0 and 10.0 both land exactly on 5.0.
        let (store, network) = two_agent_fixture();
        let mut rng = StdRng::seed_from_u64(0);
        let next = advance(&store, &network, 0.5, 0.0, NoiseKind::Gaussian, &mut rng).unwrap();
        assert_eq!(next, vec![vec![5.0], vec![5.0]]);
    }

    #[test]
    fn isolated_agent_is_unchanged_without_noise() {
        let store = StyleStore::from_rows(2, vec![vec![0.3, -1.5]]).unwrap();
        let network = InfluenceNetwork::from_edges(1, &[]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let next = advance(&store, &network, 0.9, 0.0, NoiseKind::Gaussian, &mut rng).unwrap();
        assert_eq!(next, vec![vec![0.3, -1.5]]);
    }

    #[test]
    fn zero_alpha_zero_noise_is_identity() {
        let (store, network) = two_agent_fixture();
        let mut rng = StdRng::seed_from_u64(0);
        let next = advance(&store, &network, 0.0, 0.0, NoiseKind::Gaussian, &mut rng).unwrap();
        assert_eq!(next, store.to_rows());
    }

    #[test]
    fn alpha_outside_unit_interval_is_rejected() {
        let (store, network) = two_agent_fixture();
        let mut rng = StdRng::seed_from_u64(0);
        let err =
            advance(&store, &network, 1.5, 0.0, NoiseKind::Gaussian, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { ref field, .. } if field == "alpha"));
    }

    #[test]
    fn negative_noise_is_rejected() {
        let (store, network) = two_agent_fixture();
        let mut rng = StdRng::seed_from_u64(0);
        let err =
            advance(&store, &network, 0.5, -0.1, NoiseKind::Gaussian, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { ref field, .. } if field == "noise"));
    }

    #[test]
    fn centroid_respects_edge_weights() {
        // Agent 0 is pulled toward 1.0 and 3.0 with weights 3:1, so the
        // centroid is (3*1 + 1*3) / 4 = 1.5; with alpha = 1 it lands there.
        let store =
            StyleStore::from_rows(1, vec![vec![0.0], vec![1.0], vec![3.0]]).unwrap();
        let network =
            InfluenceNetwork::from_edges(3, &[(0, 1, 3.0), (0, 2, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let next = advance(&store, &network, 1.0, 0.0, NoiseKind::Gaussian, &mut rng).unwrap();
        assert_eq!(next.first().unwrap(), &vec![1.5]);
    }

    #[test]
    fn uniform_noise_stays_within_sigma() {
        let store = StyleStore::from_rows(1, vec![vec![0.0]]).unwrap();
        let network = InfluenceNetwork::from_edges(1, &[]).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let next =
                advance(&store, &network, 0.0, 0.25, NoiseKind::Uniform, &mut rng).unwrap();
            let value = *next.first().unwrap().first().unwrap();
            assert!((-0.25..=0.25).contains(&value));
        }
    }

    #[test]
    fn pairwise_variance_contracts_under_full_pull() {
        // Fully connected, high alpha, no noise: dispersion around the
        // population centroid must shrink every tick.
        let mut rng = StdRng::seed_from_u64(23);
        let mut store = StyleStore::random(12, 3, &mut rng);
        let network = InfluenceNetwork::from_edges(
            12,
            &(0..12u32)
                .flat_map(|u| ((u + 1)..12).map(move |v| (u, v, 1.0)))
                .collect::<Vec<_>>(),
        )
        .unwrap();

        let mut previous = dispersion(&store);
        for _ in 0..30 {
            let next =
                advance(&store, &network, 0.8, 0.0, NoiseKind::Gaussian, &mut rng).unwrap();
            store.replace_all(next).unwrap();
            let current = dispersion(&store);
            assert!(current <= previous, "{current} > {previous}");
            previous = current;
        }
        assert!(previous < 1e-4, "population failed to converge: {previous}");
    }

    #[test]
    fn noise_without_pull_keeps_population_dispersed() {
        // alpha = 0, sigma > 0: dispersion must not collapse toward zero.
        // Statistical property, averaged over independent trials.
        let mut grew = 0u32;
        for trial in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(100 + trial);
            let mut store = StyleStore::random(20, 2, &mut rng);
            let network = InfluenceNetwork::build(20, 4, &mut rng).unwrap();
            let before = dispersion(&store);
            for _ in 0..50 {
                let next =
                    advance(&store, &network, 0.0, 0.1, NoiseKind::Gaussian, &mut rng).unwrap();
                store.replace_all(next).unwrap();
            }
            if dispersion(&store) >= before {
                grew += 1;
            }
        }
        assert!(grew >= 7, "dispersion grew in only {grew}/10 trials");
    }

    /// Mean squared distance from the population centroid.
    fn dispersion(store: &StyleStore) -> f64 {
        let n = store.len() as f64;
        let dim = store.dim();
        let mut centroid = vec![0.0f64; dim];
        for (_, row) in store.iter() {
            for (acc, &v) in centroid.iter_mut().zip(row.iter()) {
                *acc += f64::from(v) / n;
            }
        }
        let mut total = 0.0f64;
        for (_, row) in store.iter() {
            for (&c, &v) in centroid.iter().zip(row.iter()) {
                total += (f64::from(v) - c).powi(2);
            }
        }
        total / n
    }

    #[test]
    fn neighbors_unknown_to_store_surface_as_faults() {
        // Store with one artist, network with two: the mismatch must not
        // be silently absorbed.
        let store = StyleStore::from_rows(1, vec![vec![0.0]]).unwrap();
        let network = InfluenceNetwork::from_edges(2, &[(0, 1, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let err =
            advance(&store, &network, 0.5, 0.0, NoiseKind::Gaussian, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownArtist {
                id: ArtistId::new(1)
            }
        );
    }
}
