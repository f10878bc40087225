use crate::contract::model::{ActivityEvent, User};
use crate::infra::storage::entity::{ActivityRecord, UserRecord};

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            registered_at: r.registered_at,
            version: r.version,
            last_active: r.last_active,
        }
    }
}

impl From<&User> for UserRecord {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            registered_at: u.registered_at,
            version: u.version.clone(),
            last_active: u.last_active,
        }
    }
}

impl From<ActivityRecord> for ActivityEvent {
    fn from(r: ActivityRecord) -> Self {
        Self {
            user_id: r.user_id,
            action: r.action,
            messages_sent: r.messages_sent,
            timestamp: r.timestamp,
        }
    }
}

impl From<&ActivityEvent> for ActivityRecord {
    fn from(e: &ActivityEvent) -> Self {
        Self {
            user_id: e.user_id.clone(),
            action: e.action.clone(),
            messages_sent: e.messages_sent,
            timestamp: e.timestamp,
        }
    }
}
