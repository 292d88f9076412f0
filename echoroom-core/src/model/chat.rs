use crate::model::connection::ConnectionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Room-scoped chat line. `sender` and `sent_at` are filled in by the server
/// at relay time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub from: ConnectionId,
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}
