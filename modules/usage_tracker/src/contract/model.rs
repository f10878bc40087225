use chrono::{DateTime, Utc};

/// Registered client user (no serde: storage and REST layers own their formats)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub version: String,
    pub last_active: DateTime<Utc>,
}

/// One usage event reported by a client. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub user_id: String,
    pub action: String,
    pub messages_sent: u64,
    pub timestamp: DateTime<Utc>,
}

/// Registration input; required fields stay optional until the service validates them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRegistration {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

/// Activity input; `user_id` and `action` are required.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewActivity {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub messages_sent: Option<u64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Outcome of a registration call. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(User),
    AlreadyRegistered(User),
}

impl Registration {
    pub fn user(&self) -> &User {
        match self {
            Self::Created(u) | Self::AlreadyRegistered(u) => u,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            Self::Created(u) | Self::AlreadyRegistered(u) => u,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Admin summary counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total_users: usize,
    pub active_today: usize,
    pub total_messages: u64,
}
