//! REST endpoint handlers for the observer server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service status |
//! | `POST` | `/api/init` | (Re-)initialize the simulation, returns the tick-0 frame |
//! | `POST` | `/api/step` | Advance one tick, returns the new frame |
//! | `POST` | `/api/params` | Inject `alpha`/`noise` mid-run, returns an acknowledgement |
//! | `GET` | `/api/frame` | Latest frame without advancing |
//!
//! Manual steps and re-initializations are also fanned out on the
//! broadcast channel so `WebSocket` observers stay coherent with REST
//! drivers.

use std::sync::Arc;

use atelier_types::{NoiseKind, ParamUpdate, SimParams};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use validator::Validate;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/init`.
///
/// Every field is optional and defaults to the stock configuration.
/// Ranges guard the API boundary; the engine re-validates the semantic
/// constraints (notably `avg_degree < num_artists`).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct InitRequest {
    /// Population size `N`.
    #[validate(range(min = 5, max = 500))]
    pub num_artists: u32,
    /// Style space dimensionality `D`.
    #[validate(range(min = 2, max = 20))]
    pub style_dim: u32,
    /// Target average degree `k`.
    #[validate(range(min = 1, max = 50))]
    pub avg_degree: u32,
    /// Influence rate.
    #[validate(range(min = 0.0, max = 1.0))]
    pub alpha: f32,
    /// Noise magnitude.
    #[validate(range(min = 0.0, max = 1.0))]
    pub noise: f32,
    /// RNG seed.
    pub seed: u64,
    /// Noise distribution.
    pub noise_kind: NoiseKind,
}

impl Default for InitRequest {
    fn default() -> Self {
        let params = SimParams::default();
        Self {
            num_artists: params.num_artists,
            style_dim: params.style_dim,
            avg_degree: params.avg_degree,
            alpha: params.alpha,
            noise: params.noise,
            seed: params.seed,
            noise_kind: params.noise_kind,
        }
    }
}

impl InitRequest {
    /// Convert into engine parameters, clamping the requested degree to
    /// the fully-connected maximum `N - 1`.
    pub fn into_params(self) -> SimParams {
        SimParams {
            num_artists: self.num_artists,
            style_dim: self.style_dim,
            avg_degree: self.avg_degree.min(self.num_artists.saturating_sub(1)),
            alpha: self.alpha,
            noise: self.noise,
            seed: self.seed,
            noise_kind: self.noise_kind,
        }
    }
}

// ---------------------------------------------------------------------------
// GET / -- service status
// ---------------------------------------------------------------------------

/// Report service status: whether a run is live, its tick, and whether
/// continuous mode is active.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine.lock().await;
    Json(serde_json::json!({
        "service": "atelier-observer",
        "status": "running",
        "initialized": engine.is_initialized(),
        "tick": engine.tick(),
        "playing": state.driver.is_playing(),
    }))
}

// ---------------------------------------------------------------------------
// POST /api/init -- (re-)initialize
// ---------------------------------------------------------------------------

/// Initialize a fresh run and return its tick-0 frame.
///
/// If continuous mode is active it is paused first; playback resumes
/// only on an explicit subsequent `play`.
pub async fn init(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InitRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    body.validate()
        .map_err(|e| ObserverError::InvalidBody(e.to_string()))?;

    if state.driver.is_playing() {
        state.driver.pause();
    }

    let frame = {
        let mut engine = state.engine.lock().await;
        let frame = engine.init(body.into_params())?;
        // Published before the lock is released so concurrent step
        // sources cannot reorder frames on the stream.
        state.broadcast_frame(frame.clone());
        frame
    };
    Ok(Json(frame))
}

// ---------------------------------------------------------------------------
// POST /api/step -- advance one tick
// ---------------------------------------------------------------------------

/// Advance the simulation by exactly one tick and return the new frame.
pub async fn step(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let frame = {
        let mut engine = state.engine.lock().await;
        let frame = engine.step()?;
        // Published under the lock; ticks reach the stream in order.
        state.broadcast_frame(frame.clone());
        frame
    };
    Ok(Json(frame))
}

// ---------------------------------------------------------------------------
// POST /api/params -- mid-run parameter injection
// ---------------------------------------------------------------------------

/// Inject new `alpha`/`noise` values for subsequent ticks.
///
/// Structural parameters are rejected at deserialization (unknown
/// fields), so this endpoint can never change the population, the
/// dimensionality, or the topology. Does not emit a frame.
pub async fn set_params(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ParamUpdate>,
) -> Result<impl IntoResponse, ObserverError> {
    let mut engine = state.engine.lock().await;
    engine.set_parameters(patch)?;
    let params = engine
        .params()
        .ok_or_else(|| ObserverError::Internal(String::from("run vanished mid-update")))?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "alpha": params.alpha,
        "noise": params.noise,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/frame -- latest snapshot
// ---------------------------------------------------------------------------

/// Return the latest frame without advancing the simulation.
pub async fn get_frame(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let frame = state.engine.lock().await.current_frame()?;
    Ok(Json(frame))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn init_request_defaults_match_engine_defaults() {
        let request = InitRequest::default();
        assert!(request.validate().is_ok());
        assert_eq!(request.into_params(), SimParams::default());
    }

    #[test]
    fn tiny_population_is_rejected_at_the_boundary() {
        let request = InitRequest {
            num_artists: 2,
            ..InitRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn degree_is_clamped_to_population() {
        let request = InitRequest {
            num_artists: 10,
            avg_degree: 40,
            ..InitRequest::default()
        };
        // 40 is inside the API range but above N - 1; the conversion
        // clamps instead of failing.
        assert!(request.validate().is_ok());
        assert_eq!(request.into_params().avg_degree, 9);
    }
}
