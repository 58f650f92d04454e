//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API
//! server for the live notification inbox.

use crate::web::dto::NotificationResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Marks one of the caller's notifications as seen.
    MarkSeen { notification_id: Uuid },

    /// Asks for a fresh snapshot, replacing whatever the client holds.
    Refresh,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full inbox. Sent on connect and after `refresh`.
    Snapshot {
        unseen: Vec<NotificationResponse>,
        seen: Vec<NotificationResponse>,
    },

    /// A notification was just inserted for this account.
    NotificationReceived {
        notification: NotificationResponse,
        unseen_count: usize,
    },

    /// A `mark_seen` went through.
    NotificationSeen {
        notification_id: Uuid,
        unseen_count: usize,
    },

    /// Reports a problem with the last request; the connection stays open.
    Error { message: String },
}
