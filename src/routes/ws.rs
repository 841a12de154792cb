// WebSocket session manager: admission, greeting, request/response loop

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::{ServerMessage, Session};

pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Close code sent to peers refused at the admission cap.
pub const CLOSE_TOO_MANY_CONNECTIONS: u16 = 32001;

pub const REJECTION_TEXT: &str = "Too many connections";

/// Atomically claim a session slot. Never admits past `max` and the count
/// never goes negative; the matching release is `SessionGuard`'s drop.
pub fn try_admit(open: &AtomicUsize, max: usize) -> bool {
    open.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
        if n < max { Some(n + 1) } else { None }
    })
    .is_ok()
}

/// Releases an admission slot exactly once on drop.
pub struct SessionGuard(Arc<AtomicUsize>);

impl SessionGuard {
    pub fn new(open: Arc<AtomicUsize>) -> Self {
        Self(open)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub(super) async fn ws_status(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = handle_session(socket, state).await {
            tracing::info!(error = %e, "session ended with error");
        }
    })
}

/// One viewer connection, start to finish. A send failure propagates, the
/// loop exits, and the guard releases the slot; nothing here is fatal to
/// other sessions or the process.
async fn handle_session(mut socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    if !try_admit(&state.open_sessions, state.config.session.max_connections) {
        tracing::info!("connection refused: session cap reached");
        send_json(&mut socket, &ServerMessage::Error(REJECTION_TEXT.into())).await?;
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: CLOSE_TOO_MANY_CONNECTIONS,
                reason: REJECTION_TEXT.into(),
            })))
            .await;
        return Ok(());
    }
    let _guard = SessionGuard::new(state.open_sessions.clone());

    let id = state.next_session_id.fetch_add(1, Ordering::Relaxed);
    let mut session = Session::new(id);
    tracing::info!(session_id = id, "viewer admitted");

    // Warm up the port table now so it has usually settled by the time
    // the viewer sends its first request.
    state.collector.prime_ports();

    let uptime = state.collector.uptime().await;
    send_json(&mut socket, &ServerMessage::Uptime(uptime)).await?;

    while let Some(msg) = socket.recv().await {
        match msg {
            // Any well-formed text frame is a snapshot request; content is
            // ignored. Requests are served one at a time, in order.
            Ok(Message::Text(_)) => {
                let snapshot = state.collector.collect(&mut session).await;
                send_json(&mut socket, &ServerMessage::Message(vec![snapshot])).await?;
            }
            Ok(Message::Close(_)) | Err(_) => break,
            // Binary, ping, pong: not part of the protocol, ignored.
            Ok(_) => {}
        }
    }

    tracing::info!(session_id = id, "viewer disconnected");
    Ok(())
}

async fn send_json(socket: &mut WebSocket, msg: &ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into())))
        .await
        .map_err(|_| anyhow::anyhow!("send timed out"))??;
    Ok(())
}
