//! `WebSocket` handler: real-time frame streaming plus control commands.
//!
//! Clients connect to `GET /ws`, immediately receive the current frame
//! (when a run is live), and from then on get a `{"type": "frame"}`
//! message for every tick -- whether produced by the continuous driver,
//! a REST step, or another client's `step` command. The handler reads
//! from a [`broadcast::Receiver`](tokio::sync::broadcast::Receiver), so
//! a client that falls behind skips to the most recent frame instead of
//! blocking the engine.
//!
//! Control messages flow the other way at any time:
//!
//! ```json
//! {"type": "play"}
//! {"type": "pause"}
//! {"type": "step"}
//! {"type": "set_params", "params": {"alpha": 0.9}}
//! {"type": "set_speed", "tick_ms": 100}
//! {"type": "init", "params": {"num_artists": 200, "seed": 7}}
//! ```
//!
//! Recoverable failures (malformed messages, engine rejections) come
//! back as `{"type": "error"}` without closing the channel; a client
//! disconnecting never disturbs the engine or other observers.

use std::sync::Arc;

use atelier_types::{Frame, ParamUpdate};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use crate::handlers::InitRequest;
use crate::state::{AppState, StreamEvent};

/// Control commands a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ControlMessage {
    /// Enter continuous mode.
    Play,
    /// Leave continuous mode before the next scheduled tick.
    Pause,
    /// Advance exactly one tick.
    Step,
    /// Inject `alpha`/`noise` mid-run.
    SetParams {
        /// The partial parameter record.
        #[serde(default)]
        params: ParamUpdate,
    },
    /// Change the continuous-mode tick interval.
    SetSpeed {
        /// New interval in milliseconds.
        tick_ms: u64,
    },
    /// Re-initialize the simulation. Implicitly pauses playback.
    Init {
        /// Initialization parameters; omitted fields use defaults.
        #[serde(default)]
        params: InitRequest,
    },
}

/// Messages the server pushes to a client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage<'a> {
    /// A new simulation frame.
    Frame {
        /// The frame payload.
        frame: &'a Frame,
    },
    /// Acknowledgement of a control command that emits no frame.
    Ack {
        /// The acknowledged command.
        action: &'static str,
    },
    /// A recoverable error; the channel stays open.
    Error {
        /// Human-readable description.
        message: String,
    },
}

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one client connection: stream frames out, apply control
/// messages in.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut rx = state.subscribe();

    // Greet the client with the current state so it can render before
    // the first tick arrives.
    let greeting = {
        let engine = state.engine.lock().await;
        engine.current_frame().ok()
    };
    if let Some(frame) = greeting {
        if send_message(&mut socket, &ServerMessage::Frame { frame: &frame })
            .await
            .is_err()
        {
            return;
        }
    }

    loop {
        tokio::select! {
            // A frame or error produced by the engine.
            event = rx.recv() => {
                match event {
                    Ok(StreamEvent::Frame(frame)) => {
                        let message = ServerMessage::Frame { frame: &frame };
                        if send_message(&mut socket, &message).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Ok(StreamEvent::Error(message)) => {
                        let message = ServerMessage::Error { message };
                        if send_message(&mut socket, &message).await.is_err() {
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping to newest frame");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // A control message (or disconnect) from the client.
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_command(text.as_str(), &state).await {
                            if send_message(&mut socket, &reply).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Binary and pong frames are ignored.
                    }
                }
            }
        }
    }
}

/// Apply one control message.
///
/// Commands that produce a frame (`step`, `init`) publish it on the
/// broadcast channel so every observer sees it; only acknowledgements
/// and errors are returned to the issuing client directly.
async fn handle_command(text: &str, state: &Arc<AppState>) -> Option<ServerMessage<'static>> {
    let command: ControlMessage = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(e) => {
            warn!(error = %e, "Malformed control message");
            return Some(ServerMessage::Error {
                message: format!("malformed control message: {e}"),
            });
        }
    };

    match command {
        ControlMessage::Play => {
            state.driver.play();
            Some(ServerMessage::Ack { action: "play" })
        }
        ControlMessage::Pause => {
            state.driver.pause();
            Some(ServerMessage::Ack { action: "pause" })
        }
        ControlMessage::Step => {
            // Broadcast under the lock so ticks reach the stream in order.
            let result = {
                let mut engine = state.engine.lock().await;
                engine.step().map(|frame| state.broadcast_frame(frame))
            };
            match result {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
        ControlMessage::SetParams { params } => {
            let result = {
                let mut engine = state.engine.lock().await;
                engine.set_parameters(params)
            };
            match result {
                Ok(()) => Some(ServerMessage::Ack {
                    action: "set_params",
                }),
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
        ControlMessage::SetSpeed { tick_ms } => {
            match state.driver.set_tick_interval_ms(tick_ms) {
                Some(_) => Some(ServerMessage::Ack { action: "set_speed" }),
                None => Some(ServerMessage::Error {
                    message: format!("tick interval {tick_ms}ms is below the minimum"),
                }),
            }
        }
        ControlMessage::Init { params } => {
            if let Err(e) = params.validate() {
                return Some(ServerMessage::Error {
                    message: format!("invalid init parameters: {e}"),
                });
            }
            // Re-init implicitly pauses; an explicit play resumes.
            if state.driver.is_playing() {
                state.driver.pause();
            }
            let result = {
                let mut engine = state.engine.lock().await;
                engine
                    .init(params.into_params())
                    .map(|frame| state.broadcast_frame(frame))
            };
            match result {
                Ok(_) => Some(ServerMessage::Ack { action: "init" }),
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// Serialize and send one server message as a text frame.
async fn send_message(
    socket: &mut WebSocket,
    message: &ServerMessage<'_>,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize server message: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn control_messages_parse() {
        assert!(matches!(
            serde_json::from_str::<ControlMessage>(r#"{"type": "play"}"#).unwrap(),
            ControlMessage::Play
        ));
        assert!(matches!(
            serde_json::from_str::<ControlMessage>(r#"{"type": "pause"}"#).unwrap(),
            ControlMessage::Pause
        ));
        assert!(matches!(
            serde_json::from_str::<ControlMessage>(r#"{"type": "set_speed", "tick_ms": 50}"#)
                .unwrap(),
            ControlMessage::SetSpeed { tick_ms: 50 }
        ));
    }

    #[test]
    fn set_params_accepts_partial_record() {
        let command: ControlMessage =
            serde_json::from_str(r#"{"type": "set_params", "params": {"noise": 0.1}}"#).unwrap();
        match command {
            ControlMessage::SetParams { params } => {
                assert_eq!(params.noise, Some(0.1));
                assert_eq!(params.alpha, None);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn set_params_rejects_structural_fields() {
        let result = serde_json::from_str::<ControlMessage>(
            r#"{"type": "set_params", "params": {"num_artists": 50}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_command_type_is_an_error() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"type": "warp"}"#).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let ack = serde_json::to_value(ServerMessage::Ack { action: "play" }).unwrap();
        assert_eq!(ack["type"], "ack");
        let err = serde_json::to_value(ServerMessage::Error {
            message: String::from("boom"),
        })
        .unwrap();
        assert_eq!(err["type"], "error");
        assert_eq!(err["message"], "boom");
    }
}
