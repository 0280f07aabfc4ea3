//! In-process server and WebSocket client helpers for integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use wayfare_server::{
    config::ServerConfig,
    domain::{UserId, UserProfile},
    infrastructure::user_directory::InMemoryUserDirectory,
    ui::{AppState, Server},
};
use wayfare_shared::time::SystemClock;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(3);

/// Server running on an ephemeral port for the duration of a test
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let directory = InMemoryUserDirectory::from_profiles(
            [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")].map(|(id, name)| {
                UserProfile {
                    id: UserId::new(id.to_string()).unwrap(),
                    name: name.to_string(),
                    profile_picture: None,
                    verified: true,
                }
            }),
        );
        let state = AppState::in_memory(&config, Arc::new(directory), Arc::new(SystemClock));
        let server = Server::new(state, config.typing_sweep_interval);

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = server.serve(listener, shutdown).await {
                eprintln!("test server failed: {e}");
            }
        });

        TestServer {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn ws_url(&self, user_id: &str) -> String {
        format!("ws://{}/ws?user_id={}", self.addr, user_id)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = reqwest::get(self.http_url(path)).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// WebSocket client speaking the `{event, data, ack}` framing
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer, user_id: &str) -> Self {
        let (stream, _) = connect_async(server.ws_url(user_id)).await.unwrap();
        TestClient { stream }
    }

    /// Connect and join `room` in one step.
    pub async fn joined(server: &TestServer, user_id: &str, room: &str) -> Self {
        let mut client = Self::connect(server, user_id).await;
        let ack = client.request("joinChat", json!(room)).await;
        assert_eq!(ack["data"]["success"], true);
        client
    }

    pub async fn emit(&mut self, event: &str, data: Value) {
        self.send_frame(json!({"event": event, "data": data})).await;
    }

    pub async fn send_frame(&mut self, frame: Value) {
        self.stream
            .send(Message::text(frame.to_string()))
            .await
            .unwrap();
    }

    /// Send a frame with an ack id and wait for the matching ack, returning it.
    ///
    /// Broadcast frames received meanwhile are dropped.
    pub async fn request(&mut self, event: &str, data: Value) -> Value {
        let ack_id = next_ack_id();
        let frame = json!({"event": event, "data": data, "ack": ack_id});
        self.stream
            .send(Message::text(frame.to_string()))
            .await
            .unwrap();
        loop {
            let frame = self.next_frame().await;
            if frame["event"] == "ack" && frame["ack"] == ack_id {
                return frame;
            }
        }
    }

    /// Next text frame from the server, skipping control frames.
    pub async fn next_frame(&mut self) -> Value {
        self.try_next_frame(RECEIVE_TIMEOUT)
            .await
            .expect("timed out waiting for a frame")
    }

    pub async fn try_next_frame(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let msg = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .ok()??
                .ok()?;
            if let Message::Text(text) = msg {
                return Some(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    }

    /// Wait for the next frame with the given event name, skipping others.
    pub async fn expect_event(&mut self, event: &str) -> Value {
        loop {
            let frame = self.next_frame().await;
            if frame["event"] == event {
                return frame;
            }
        }
    }

    /// Assert nothing but acks arrives within `wait`.
    pub async fn expect_no_broadcast(&mut self, wait: Duration) {
        while let Some(frame) = self.try_next_frame(wait).await {
            assert_eq!(frame["event"], "ack", "unexpected broadcast: {frame}");
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

fn next_ack_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
