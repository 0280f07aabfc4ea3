//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, UserId},
    ui::{session::Session, state::AppState},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> UserId (Domain Model)
    let user_id = match UserId::try_from(query.user_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket upgrade: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that drains the connection's channel into the WebSocket and pings
/// the client every `ping_interval`.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        // the first tick completes immediately
        ping.tick().await;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sender.close().await;
    })
}

/// Reads client frames until close, error or `idle_timeout` of silence.
///
/// Acks go out through the pusher so they share the connection's outbound queue
/// with broadcasts.
async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    mut session: Session,
) {
    loop {
        let next = match tokio::time::timeout(state.idle_timeout, receiver.next()).await {
            Ok(next) => next,
            Err(_) => {
                tracing::info!(
                    connection_id = %session.connection_id(),
                    user_id = %session.user_id(),
                    "Connection idle for {:?}, dropping it",
                    state.idle_timeout
                );
                break;
            }
        };

        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!(connection_id = %session.connection_id(), "WebSocket error: {}", e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                if let Some(ack) = session.handle_text(&state, text.as_str()).await
                    && let Err(e) = state
                        .message_pusher
                        .push_to(session.connection_id(), &ack)
                        .await
                {
                    tracing::warn!(
                        connection_id = %session.connection_id(),
                        "Failed to ack: {}",
                        e
                    );
                    break;
                }
            }
            Message::Close(_) => {
                tracing::info!(connection_id = %session.connection_id(), "Client requested close");
                break;
            }
            // pong and ping only reset the idle timer
            _ => {}
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();

    state
        .connect_participant_usecase
        .execute(connection_id.clone(), &user_id, tx)
        .await;

    let (sender, receiver) = socket.split();
    let session = Session::new(connection_id.clone(), user_id.clone());

    let mut send_task = pusher_loop(rx, sender, state.ping_interval);
    let mut recv_task = tokio::spawn(receive_loop(receiver, state.clone(), session));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // explicit close and idle timeout share this path
    state
        .disconnect_participant_usecase
        .execute(&connection_id, &user_id)
        .await;
}
