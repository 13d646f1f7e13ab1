//! The continuous-mode tick driver.
//!
//! While playing, a dedicated Tokio task steps the engine on a fixed,
//! runtime-adjustable cadence and fans each frame out to observers. The
//! driver is the only source of autonomous mutation; everything else is
//! triggered by an external command.
//!
//! Control state lives in [`DriverState`]: lock-free atomics shared
//! between the driver task and the Axum handlers, with a
//! [`Notify`] to wake the task on `play`. A `pause` takes effect before
//! the next scheduled tick -- the engine mutex guarantees it can never
//! interrupt a tick midway. If a tick fails, the driver pauses itself and
//! reports the error to observers instead of silently stalling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Lowest accepted tick interval, to prevent runaway ticking.
const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Shared control block for the tick driver.
///
/// Atomic fields allow lock-free reads on the driver's hot path; the
/// handlers mutate them from any task.
#[derive(Debug)]
pub struct DriverState {
    /// Whether continuous mode is active.
    playing: AtomicBool,
    /// Wakes the driver task when playback starts.
    play_notify: Notify,
    /// Delay between scheduled ticks, in milliseconds.
    tick_interval_ms: AtomicU64,
}

impl DriverState {
    /// Create a paused control block with the given tick interval.
    pub const fn new(tick_interval_ms: u64) -> Self {
        Self {
            playing: AtomicBool::new(false),
            play_notify: Notify::const_new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
        }
    }

    /// Whether continuous mode is active.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Enter continuous mode and wake the driver task.
    pub fn play(&self) {
        self.playing.store(true, Ordering::Release);
        self.play_notify.notify_one();
        info!("Continuous mode started");
    }

    /// Leave continuous mode. Takes effect before the next scheduled
    /// tick; a tick already in flight completes normally.
    pub fn pause(&self) {
        self.playing.store(false, Ordering::Release);
        info!("Continuous mode paused");
    }

    /// The current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the tick interval at runtime.
    ///
    /// Takes effect at the next scheduled sleep. Returns the previous
    /// interval, or `None` if the value was rejected (below
    /// [`MIN_TICK_INTERVAL_MS`]).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    /// Wait until continuous mode is active.
    ///
    /// Returns immediately when already playing; otherwise parks until
    /// [`play`](Self::play) is called.
    pub async fn wait_until_playing(&self) {
        while !self.playing.load(Ordering::Acquire) {
            self.play_notify.notified().await;
        }
    }
}

/// Run the driver loop forever.
///
/// Spawned once at startup; the task parks while paused and therefore
/// holds no timers across pauses. Cancelling the task (runtime shutdown)
/// is safe at every await point -- the engine mutex is never held across
/// the inter-tick sleep.
pub async fn run_driver(state: Arc<AppState>) {
    loop {
        state.driver.wait_until_playing().await;

        // Serialize against manual steps and re-inits, and broadcast
        // before releasing the lock so frames reach the stream in tick
        // order. The lock is not held across the inter-tick sleep.
        let result = {
            let mut engine = state.engine.lock().await;
            // A pause (or a re-init's implicit pause) may have landed
            // while this task waited for the lock; that command wins.
            if !state.driver.is_playing() {
                continue;
            }
            engine.step().map(|frame| state.broadcast_frame(frame))
        };

        match result {
            Ok(receivers) => {
                debug!(receivers, "Driver tick broadcast");
            }
            Err(e) => {
                // Pause first so a persistent fault cannot spin the loop.
                state.driver.pause();
                error!(error = %e, "Driver tick failed; pausing");
                state.broadcast_error(e.to_string());
                continue;
            }
        }

        let interval = state.driver.tick_interval_ms();
        tokio::time::sleep(Duration::from_millis(interval)).await;
    }
}
