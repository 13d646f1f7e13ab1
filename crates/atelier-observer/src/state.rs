//! Shared application state for the observer server.
//!
//! [`AppState`] injects the engine, the frame broadcast channel, and the
//! driver control block into the Axum handlers. The engine sits behind a
//! single async mutex so every mutation -- manual steps, driver ticks,
//! parameter injection, re-initialization -- is serialized; that is what
//! upholds the synchronous-update contract when control traffic arrives
//! concurrently with the periodic driver.
//!
//! The engine is a plain injected value, not a process-wide singleton:
//! constructing a second [`AppState`] yields a fully isolated simulation.

use std::sync::Arc;

use atelier_core::SimulationEngine;
use atelier_types::Frame;
use tokio::sync::{Mutex, broadcast};

use crate::driver::DriverState;

/// Capacity of the frame broadcast channel.
///
/// Only the latest event is retained: a subscriber that falls behind
/// gets `RecvError::Lagged` and resumes at the newest frame rather than
/// draining a backlog of stale ticks. Only the latest state matters for
/// a live visualization, and a slow observer can never block the engine.
const BROADCAST_CAPACITY: usize = 1;

/// An event fanned out to every connected observer.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A new frame was produced (by the driver or a manual step).
    Frame(Arc<Frame>),
    /// A recoverable engine error occurred in continuous mode.
    Error(String),
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// The simulation engine. All mutations go through this mutex.
    pub engine: Mutex<SimulationEngine>,
    /// Broadcast sender fanning frames out to `WebSocket` clients.
    tx: broadcast::Sender<StreamEvent>,
    /// Control block for the continuous-mode tick driver.
    pub driver: DriverState,
}

impl AppState {
    /// Create application state around an engine and a driver control
    /// block.
    pub fn new(engine: SimulationEngine, driver: DriverState) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            engine: Mutex::new(engine),
            tx,
            driver,
        }
    }

    /// Subscribe to the stream of frames and continuous-mode errors.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }

    /// Fan a frame out to all connected observers.
    ///
    /// Returns the number of receivers that got the frame; 0 when no
    /// observer is connected, which is not an error.
    pub fn broadcast_frame(&self, frame: Frame) -> usize {
        self.tx
            .send(StreamEvent::Frame(Arc::new(frame)))
            .unwrap_or(0)
    }

    /// Fan a recoverable error out to all connected observers.
    pub fn broadcast_error(&self, message: String) -> usize {
        self.tx.send(StreamEvent::Error(message)).unwrap_or(0)
    }
}
