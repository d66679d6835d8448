//! WebSocket upgrade handlers for the two subscriber channels

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::ws::hub::Channel;
use crate::ws::protocol::ControlCommand;

/// Overlay channel upgrade: read-only telemetry stream
pub async fn telemetry_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_telemetry_socket(socket, state))
}

/// Control channel upgrade: full-store stream plus inbound commands
pub async fn control_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_control_socket(socket, state))
}

async fn handle_telemetry_socket(socket: WebSocket, state: AppState) {
    let snapshot = match serde_json::to_string(&state.store.telemetry_projection()) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize telemetry snapshot");
            return;
        }
    };

    let (id, rx) = state.hub.subscribe(Channel::Telemetry, snapshot);
    info!(
        subscriber_id = %id,
        total = state.hub.count(Channel::Telemetry),
        "Overlay viewer connected"
    );

    let (ws_sink, mut ws_stream) = socket.split();
    let writer_handle = spawn_writer(id, ws_sink, rx);

    // Reader loop: the overlay sends nothing we act on; wait for close.
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!(subscriber_id = %id, "Overlay viewer initiated close");
                break;
            }
            Ok(Message::Text(_)) | Ok(Message::Binary(_)) => {
                debug!(subscriber_id = %id, "Ignoring inbound message on telemetry channel");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(subscriber_id = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
    state.hub.unsubscribe(Channel::Telemetry, id);
    info!(
        subscriber_id = %id,
        total = state.hub.count(Channel::Telemetry),
        "Overlay viewer disconnected"
    );
}

async fn handle_control_socket(socket: WebSocket, state: AppState) {
    let snapshot = match serde_json::to_string(&state.store.control_projection()) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize control snapshot");
            return;
        }
    };

    let (id, rx) = state.hub.subscribe(Channel::Control, snapshot);
    info!(
        subscriber_id = %id,
        total = state.hub.count(Channel::Control),
        "Control panel connected"
    );

    let (ws_sink, mut ws_stream) = socket.split();
    let writer_handle = spawn_writer(id, ws_sink, rx);

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ControlCommand>(&text) {
                Ok(command) => {
                    let projections = state.store.apply_command(command);
                    state.hub.broadcast(&projections);
                }
                Err(e) => {
                    // Bad input never drops the connection.
                    warn!(
                        subscriber_id = %id,
                        error = %e,
                        "Failed to parse control command"
                    );
                }
            },
            Ok(Message::Close(_)) => {
                debug!(subscriber_id = %id, "Control panel initiated close");
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!(subscriber_id = %id, "Received binary message, ignoring");
            }
            Ok(_) => {}
            Err(e) => {
                debug!(subscriber_id = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
    state.hub.unsubscribe(Channel::Control, id);
    info!(
        subscriber_id = %id,
        total = state.hub.count(Channel::Control),
        "Control panel disconnected"
    );
}

/// Writer task: drain the subscriber queue into the socket
fn spawn_writer(
    id: Uuid,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(json) = rx.recv().await {
            if let Err(e) = ws_sink.send(Message::Text(json)).await {
                debug!(subscriber_id = %id, error = %e, "WebSocket send failed");
                break;
            }
        }
    })
}
