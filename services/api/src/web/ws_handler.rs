//! services/api/src/web/ws_handler.rs
//!
//! The control loop for a live notification WebSocket. Each connection keeps
//! its own inbox view, patched by the live feed and by the client's requests.

use crate::{
    error::workflow_error,
    web::{
        dto::NotificationResponse,
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::Response,
    Extension,
};
use booking_core::{NotificationInbox, SessionContext};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

type WsSender = SplitSink<WebSocket, Message>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, StatusCode> {
    let account_id = session.account_id().ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, app_state, account_id)))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, account_id: Uuid) {
    info!("New WebSocket connection established for account: {}", account_id);
    let (mut sender, mut receiver) = socket.split();

    // --- 1. Live feed ---
    // Subscribed before the snapshot so nothing inserted in between is missed;
    // pushes the snapshot already holds are dropped by the inbox.
    let (push_tx, mut push_rx) = mpsc::unbounded_channel();
    let subscription = match app_state
        .notifications
        .subscribe_inserts(account_id, move |notification| {
            let _ = push_tx.send(notification);
        })
        .await
    {
        Ok(subscription) => subscription,
        Err(e) => {
            let (_, message) = workflow_error("Failed to subscribe to notifications", e);
            let _ = send(&mut sender, &ServerMessage::Error { message }).await;
            return;
        }
    };

    // --- 2. Initial snapshot ---
    let mut inbox = match app_state.notifications.list(account_id).await {
        Ok(inbox) => inbox,
        Err(e) => {
            let (_, message) = workflow_error("Failed to load notifications", e);
            let _ = send(&mut sender, &ServerMessage::Error { message }).await;
            subscription.unsubscribe().await;
            return;
        }
    };
    if !send(&mut sender, &snapshot(&inbox)).await {
        subscription.unsubscribe().await;
        return;
    }

    // --- 3. Main Message Loop ---
    loop {
        tokio::select! {
            Some(notification) = push_rx.recv() => {
                let pushed = NotificationResponse::from(&notification);
                if !inbox.record_insert(notification) {
                    continue;
                }
                let msg = ServerMessage::NotificationReceived {
                    notification: pushed,
                    unseen_count: inbox.unseen_count(),
                };
                if !send(&mut sender, &msg).await {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(msg) => handle_client_message(&app_state, account_id, &mut inbox, msg).await,
                        Err(e) => {
                            warn!("Unreadable client message from {}: {}", account_id, e);
                            ServerMessage::Error { message: format!("Invalid message: {}", e) }
                        }
                    };
                    if !send(&mut sender, &reply).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket error for account {}: {}", account_id, e);
                    break;
                }
            },
        }
    }

    subscription.unsubscribe().await;
    info!("WebSocket connection closed for account: {}", account_id);
}

async fn handle_client_message(
    app_state: &AppState,
    account_id: Uuid,
    inbox: &mut NotificationInbox,
    msg: ClientMessage,
) -> ServerMessage {
    match msg {
        ClientMessage::MarkSeen { notification_id } => {
            match app_state.notifications.mark_seen(account_id, notification_id).await {
                Ok(_) => {
                    if !inbox.record_seen(notification_id) {
                        // Seen elsewhere before this connection knew about it.
                        if let Ok(fresh) = app_state.notifications.list(account_id).await {
                            inbox.reconcile(fresh.all().to_vec());
                        }
                    }
                    ServerMessage::NotificationSeen {
                        notification_id,
                        unseen_count: inbox.unseen_count(),
                    }
                }
                Err(e) => {
                    let (_, message) = workflow_error("Failed to mark notification seen", e);
                    ServerMessage::Error { message }
                }
            }
        }
        ClientMessage::Refresh => match app_state.notifications.list(account_id).await {
            Ok(fresh) => {
                inbox.reconcile(fresh.all().to_vec());
                snapshot(inbox)
            }
            Err(e) => {
                let (_, message) = workflow_error("Failed to load notifications", e);
                ServerMessage::Error { message }
            }
        },
    }
}

fn snapshot(inbox: &NotificationInbox) -> ServerMessage {
    ServerMessage::Snapshot {
        unseen: inbox.unseen().into_iter().map(NotificationResponse::from).collect(),
        seen: inbox.seen().into_iter().map(NotificationResponse::from).collect(),
    }
}

/// Serializes and sends one message. Returns `false` once the client is gone.
async fn send(sender: &mut WsSender, msg: &ServerMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(json.into())).await.is_ok()
}
