use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// On-disk shape of a user in `users.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub version: String,
    pub last_active: DateTime<Utc>,
}

/// On-disk shape of an event in `activity.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub user_id: String,
    pub action: String,
    #[serde(default)]
    pub messages_sent: u64,
    pub timestamp: DateTime<Utc>,
}
