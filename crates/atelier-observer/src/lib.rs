//! Observer server for the Atelier simulation.
//!
//! This crate provides the Axum HTTP server and the continuous-mode tick
//! driver that together form the simulation's control protocol:
//!
//! - **REST endpoints** for init / step / parameter injection / frame
//!   retrieval
//! - **`WebSocket` endpoint** (`/ws`) streaming one frame per tick and
//!   accepting asynchronous control commands (play, pause, step,
//!   `set_params`, `set_speed`, init)
//! - **Tick driver** that steps the engine on a fixed, runtime-adjustable
//!   cadence while in continuous mode
//!
//! # Architecture
//!
//! One [`SimulationEngine`](atelier_core::SimulationEngine) is injected
//! into the shared [`AppState`] behind an async mutex; REST handlers, the
//! `WebSocket` control path, and the driver all serialize their mutations
//! through it. Frames fan out on a broadcast channel where lagging
//! receivers skip to the newest frame, so a slow observer never holds up
//! the engine and a disconnect never disturbs anyone else.

pub mod config;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::ObserverConfig;
pub use driver::{DriverState, run_driver};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, StreamEvent};
