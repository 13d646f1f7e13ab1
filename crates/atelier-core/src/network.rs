//! The weighted influence network over artists.
//!
//! The network is generated once per initialization from the run's seeded
//! generator and is immutable for the rest of the run: edges are never
//! rewired tick-to-tick. Identical `(N, avg_degree, seed)` always produce
//! the identical edge set and weight assignment, which is what makes runs
//! reproducible end to end.
//!
//! Generation samples each unordered pair independently with probability
//! `avg_degree / (N - 1)` (Erdos-Renyi style), giving an expected average
//! degree of `avg_degree`. Edges are undirected, carry a weight drawn
//! uniformly from `(0, 1]`, and never connect an artist to itself.

use atelier_types::{ArtistId, FrameLink};
use rand::Rng;

use crate::error::SimError;

/// Weighted undirected influence graph over artist ids `0..N`.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceNetwork {
    /// Number of nodes `N`.
    node_count: usize,
    /// Per-node neighbor lists `(neighbor, weight)`, indexed by artist id.
    /// Each undirected edge appears in both endpoints' lists.
    adjacency: Vec<Vec<(ArtistId, f32)>>,
    /// Canonical edge list with `source < target`, in generation order.
    edges: Vec<FrameLink>,
}

impl InfluenceNetwork {
    /// Generate a network over `num_artists` nodes with expected average
    /// degree `avg_degree`, consuming draws from `rng` in ascending
    /// `(u, v)` pair order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `avg_degree` is not
    /// strictly less than `num_artists` (the fully-connected degree is
    /// `N - 1`).
    pub fn build<R: Rng>(
        num_artists: u32,
        avg_degree: u32,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if avg_degree >= num_artists {
            return Err(SimError::invalid(
                "avg_degree",
                format!(
                    "average degree {avg_degree} must be below the population size {num_artists}"
                ),
            ));
        }

        // u32 counts fit usize on every supported target.
        #[allow(clippy::cast_possible_truncation)]
        let n = num_artists as usize;
        let mut adjacency: Vec<Vec<(ArtistId, f32)>> = vec![Vec::new(); n];
        let mut edges = Vec::new();

        if n > 1 {
            let edge_probability =
                f64::from(avg_degree) / f64::from(num_artists.saturating_sub(1));
            for u in 0..num_artists {
                for v in u.saturating_add(1)..num_artists {
                    if rng.random::<f64>() >= edge_probability {
                        continue;
                    }
                    // random::<f32>() is [0, 1); flip to (0, 1] so no
                    // edge ever carries zero influence.
                    let weight = 1.0 - rng.random::<f32>();
                    let (u_id, v_id) = (ArtistId::new(u), ArtistId::new(v));
                    if let Some(list) = adjacency.get_mut(u_id.index()) {
                        list.push((v_id, weight));
                    }
                    if let Some(list) = adjacency.get_mut(v_id.index()) {
                        list.push((u_id, weight));
                    }
                    edges.push(FrameLink {
                        source: u_id,
                        target: v_id,
                        weight,
                    });
                }
            }
        }

        Ok(Self {
            node_count: n,
            adjacency,
            edges,
        })
    }

    /// Number of nodes.
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of undirected edges.
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The neighbors of one artist as `(neighbor, weight)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownArtist`] for ids outside `0..N`.
    pub fn neighbors(&self, id: ArtistId) -> Result<&[(ArtistId, f32)], SimError> {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or(SimError::UnknownArtist { id })
    }

    /// The degree of one artist, or 0 for out-of-range ids.
    pub fn degree(&self, id: ArtistId) -> usize {
        self.adjacency.get(id.index()).map_or(0, Vec::len)
    }

    /// The canonical edge list (`source < target`), in generation order.
    pub fn edges(&self) -> &[FrameLink] {
        &self.edges
    }

    /// Build a network from an explicit edge list (test fixtures and
    /// hand-built topologies).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownArtist`] if an endpoint is outside
    /// `0..num_artists`, or [`SimError::InvalidParameter`] for self-loops
    /// or non-positive weights.
    pub fn from_edges(
        num_artists: u32,
        raw_edges: &[(u32, u32, f32)],
    ) -> Result<Self, SimError> {
        // u32 counts fit usize on every supported target.
        #[allow(clippy::cast_possible_truncation)]
        let n = num_artists as usize;
        let mut adjacency: Vec<Vec<(ArtistId, f32)>> = vec![Vec::new(); n];
        let mut edges = Vec::new();

        for &(u, v, weight) in raw_edges {
            if u == v {
                return Err(SimError::invalid(
                    "edges",
                    format!("self-loop on artist {u}"),
                ));
            }
            if weight <= 0.0 {
                return Err(SimError::invalid(
                    "edges",
                    format!("edge ({u}, {v}) has non-positive weight {weight}"),
                ));
            }
            let (lo, hi) = if u < v { (u, v) } else { (v, u) };
            let (lo_id, hi_id) = (ArtistId::new(lo), ArtistId::new(hi));
            if hi_id.index() >= n {
                return Err(SimError::UnknownArtist { id: hi_id });
            }
            if let Some(list) = adjacency.get_mut(lo_id.index()) {
                list.push((hi_id, weight));
            }
            if let Some(list) = adjacency.get_mut(hi_id.index()) {
                list.push((lo_id, weight));
            }
            edges.push(FrameLink {
                source: lo_id,
                target: hi_id,
                weight,
            });
        }

        Ok(Self {
            node_count: n,
            adjacency,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn identical_inputs_give_identical_networks() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let net_a = InfluenceNetwork::build(80, 6, &mut a).unwrap();
        let net_b = InfluenceNetwork::build(80, 6, &mut b).unwrap();
        assert_eq!(net_a, net_b);
    }

    #[test]
    fn different_seeds_give_different_networks() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(8);
        let net_a = InfluenceNetwork::build(80, 6, &mut a).unwrap();
        let net_b = InfluenceNetwork::build(80, 6, &mut b).unwrap();
        assert_ne!(net_a, net_b);
    }

    #[test]
    fn degree_at_or_above_population_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = InfluenceNetwork::build(10, 10, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { ref field, .. } if field == "avg_degree"));
    }

    #[test]
    fn no_self_loops_and_positive_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let net = InfluenceNetwork::build(50, 8, &mut rng).unwrap();
        for link in net.edges() {
            assert_ne!(link.source, link.target);
            assert!(link.weight > 0.0 && link.weight <= 1.0);
            assert!(link.source < link.target);
        }
    }

    #[test]
    fn realized_average_degree_tracks_target() {
        let mut rng = StdRng::seed_from_u64(11);
        let net = InfluenceNetwork::build(400, 8, &mut rng).unwrap();
        let total_degree: usize = (0..400).map(|i| net.degree(ArtistId::new(i))).sum();
        let average = total_degree as f64 / 400.0;
        // Expected degree is 8; allow generous sampling slack.
        assert!((6.0..10.0).contains(&average), "average degree {average}");
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(5);
        let net = InfluenceNetwork::build(30, 4, &mut rng).unwrap();
        for link in net.edges() {
            let forward = net.neighbors(link.source).unwrap();
            let backward = net.neighbors(link.target).unwrap();
            assert!(forward.iter().any(|&(id, w)| id == link.target && w == link.weight));
            assert!(backward.iter().any(|&(id, w)| id == link.source && w == link.weight));
        }
    }

    #[test]
    fn single_artist_zero_degree_is_legal() {
        let mut rng = StdRng::seed_from_u64(1);
        let net = InfluenceNetwork::build(1, 0, &mut rng).unwrap();
        assert_eq!(net.edge_count(), 0);
        assert_eq!(net.degree(ArtistId::new(0)), 0);
    }

    #[test]
    fn from_edges_rejects_self_loops() {
        let err = InfluenceNetwork::from_edges(3, &[(1, 1, 0.5)]).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }

    #[test]
    fn from_edges_rejects_out_of_range_endpoints() {
        let err = InfluenceNetwork::from_edges(3, &[(0, 5, 0.5)]).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownArtist {
                id: ArtistId::new(5)
            }
        );
    }
}
