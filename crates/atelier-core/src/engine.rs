//! Engine orchestration: init, step, parameter injection, frame export.
//!
//! [`SimulationEngine`] owns everything a run consists of: the parameters,
//! the style store, the influence network, the tick counter, and the seeded
//! generator. Observers only ever receive [`Frame`] copies.
//!
//! The engine is an explicit value with no global state; callers decide
//! where it lives and how it is shared. The observer server wraps one
//! engine in an async mutex so all mutations are serialized, which is what
//! preserves the synchronous-update contract under concurrent control
//! traffic.
//!
//! # State machine
//!
//! `Uninitialized -> Ready` on [`init`](SimulationEngine::init), after
//! which [`step`](SimulationEngine::step) self-loops on `Ready`. `init`
//! is always legal and replaces the previous run wholesale; a failed
//! `init` leaves any existing run untouched.

use atelier_types::{ArtistId, Frame, FrameNode, ParamUpdate, SimParams};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::error::SimError;
use crate::network::InfluenceNetwork;
use crate::styles::StyleStore;
use crate::update;

/// The live state of an initialized run.
#[derive(Debug, Clone)]
struct RunState {
    /// The parameters this run was built from (alpha and noise may have
    /// been injected mid-run).
    params: SimParams,
    /// Per-artist style vectors.
    store: StyleStore,
    /// The immutable influence topology.
    network: InfluenceNetwork,
    /// The run's single random generator. Initial styles, topology,
    /// weights, and per-tick noise all draw from it in a fixed order.
    rng: StdRng,
    /// Monotonic tick counter, 0 immediately after initialization.
    tick: u64,
    /// Display-only genre labels; `None` until a clustering pass runs.
    genres: Vec<Option<u32>>,
}

/// The simulation engine: owns a run and advances it one tick at a time.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    run: Option<RunState>,
}

impl SimulationEngine {
    /// Create an engine with no live run. Every operation except
    /// [`init`](Self::init) fails with [`SimError::NotInitialized`]
    /// until one is started.
    pub const fn new() -> Self {
        Self { run: None }
    }

    /// Whether a run is live.
    pub const fn is_initialized(&self) -> bool {
        self.run.is_some()
    }

    /// The current tick, if a run is live.
    pub fn tick(&self) -> Option<u64> {
        self.run.as_ref().map(|run| run.tick)
    }

    /// The live run's parameters, if any.
    pub fn params(&self) -> Option<&SimParams> {
        self.run.as_ref().map(|run| &run.params)
    }

    /// Start a fresh run: draw initial styles, generate the influence
    /// network, and reset the tick counter to 0.
    ///
    /// Returns the tick-0 frame. Always legal; replaces any previous run.
    /// On error the previous run (if any) is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if any parameter is outside
    /// its allowed range.
    pub fn init(&mut self, params: SimParams) -> Result<Frame, SimError> {
        validate_params(&params)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        // u32 counts fit usize on every supported target.
        #[allow(clippy::cast_possible_truncation)]
        let (count, dim) = (params.num_artists as usize, params.style_dim as usize);
        let store = StyleStore::random(count, dim, &mut rng);
        let network = InfluenceNetwork::build(params.num_artists, params.avg_degree, &mut rng)?;

        info!(
            num_artists = params.num_artists,
            style_dim = params.style_dim,
            avg_degree = params.avg_degree,
            seed = params.seed,
            edges = network.edge_count(),
            "Simulation initialized"
        );

        let genres = vec![None; count];
        let run = RunState {
            params,
            store,
            network,
            rng,
            tick: 0,
            genres,
        };
        let frame = build_frame(&run);
        self.run = Some(run);
        Ok(frame)
    }

    /// Advance the run by exactly one tick and return the new frame.
    ///
    /// The whole population is updated synchronously from the pre-tick
    /// snapshot before any vector is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInitialized`] before `init`, or propagates
    /// an internal invariant violation from the update rule.
    pub fn step(&mut self) -> Result<Frame, SimError> {
        let run = self.run.as_mut().ok_or(SimError::NotInitialized)?;

        let next = update::advance(
            &run.store,
            &run.network,
            run.params.alpha,
            run.params.noise,
            run.params.noise_kind,
            &mut run.rng,
        )?;
        run.store.replace_all(next)?;
        run.tick = run.tick.saturating_add(1);

        debug!(tick = run.tick, "Tick complete");
        Ok(build_frame(run))
    }

    /// Inject new values for `alpha` and/or `noise` into the live run.
    ///
    /// Both provided fields are validated before either is applied, so a
    /// rejected update changes nothing. The tick counter, population,
    /// dimensionality, and topology are never affected; structural
    /// changes require [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInitialized`] before `init`, or
    /// [`SimError::InvalidParameter`] for an out-of-range value.
    pub fn set_parameters(&mut self, patch: ParamUpdate) -> Result<(), SimError> {
        let run = self.run.as_mut().ok_or(SimError::NotInitialized)?;

        if let Some(alpha) = patch.alpha {
            validate_alpha(alpha)?;
        }
        if let Some(noise) = patch.noise {
            validate_noise(noise)?;
        }

        if let Some(alpha) = patch.alpha {
            run.params.alpha = alpha;
        }
        if let Some(noise) = patch.noise {
            run.params.noise = noise;
        }
        info!(
            alpha = run.params.alpha,
            noise = run.params.noise,
            tick = run.tick,
            "Parameters updated"
        );
        Ok(())
    }

    /// The latest frame without advancing the run.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NotInitialized`] before `init`.
    pub fn current_frame(&self) -> Result<Frame, SimError> {
        self.run
            .as_ref()
            .map(build_frame)
            .ok_or(SimError::NotInitialized)
    }
}

/// Export an immutable snapshot of the run.
fn build_frame(run: &RunState) -> Frame {
    let nodes = (0..run.params.num_artists)
        .map(|i| FrameNode {
            id: ArtistId::new(i),
        })
        .collect();
    Frame {
        tick: run.tick,
        nodes,
        links: run.network.edges().to_vec(),
        styles: run.store.to_rows(),
        genres: run.genres.clone(),
    }
}

fn validate_params(params: &SimParams) -> Result<(), SimError> {
    if params.num_artists == 0 {
        return Err(SimError::invalid(
            "num_artists",
            "population must hold at least one artist",
        ));
    }
    if params.style_dim == 0 {
        return Err(SimError::invalid(
            "style_dim",
            "style space needs at least one dimension",
        ));
    }
    if params.avg_degree >= params.num_artists {
        return Err(SimError::invalid(
            "avg_degree",
            format!(
                "average degree {} must be below the population size {}",
                params.avg_degree, params.num_artists
            ),
        ));
    }
    validate_alpha(params.alpha)?;
    validate_noise(params.noise)?;
    Ok(())
}

fn validate_alpha(alpha: f32) -> Result<(), SimError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(SimError::invalid(
            "alpha",
            format!("influence rate must lie in [0, 1], got {alpha}"),
        ));
    }
    Ok(())
}

fn validate_noise(noise: f32) -> Result<(), SimError> {
    if noise < 0.0 || !noise.is_finite() {
        return Err(SimError::invalid(
            "noise",
            format!("noise magnitude must be finite and non-negative, got {noise}"),
        ));
    }
    Ok(())
}
