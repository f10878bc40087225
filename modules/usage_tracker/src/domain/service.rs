use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::contract::model::{
    ActivityEvent, NewActivity, NewRegistration, Registration, Stats, User,
};
use crate::domain::error::DomainError;
use crate::domain::repo::RecordStore;
use crate::domain::stats;

/// Domain service: registration, activity logging and stats over a `RecordStore`.
///
/// Every call runs a full load → mutate → save cycle; nothing is cached
/// between calls. Mutating calls are serialized through `write_lock` so two
/// requests in this process cannot overwrite each other's update.
#[derive(Clone)]
pub struct Service {
    store: Arc<dyn RecordStore>,
    config: ServiceConfig,
    write_lock: Arc<Mutex<()>>,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum number of activity events kept; older ones are evicted first.
    pub activity_retention: usize,
    /// Version recorded for users registering without one.
    pub default_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            activity_retention: 1000,
            default_version: "1.0.0".to_string(),
        }
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String, DomainError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::validation(field))
}

/// Drop the oldest events so at most `limit` remain.
fn apply_retention(events: &mut Vec<ActivityEvent>, limit: usize) {
    if events.len() > limit {
        let excess = events.len() - limit;
        events.drain(..excess);
    }
}

impl Service {
    pub fn new(store: Arc<dyn RecordStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            config,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Register a user unless one with the same id or email already exists.
    #[instrument(name = "usage_tracker.service.register", skip(self, input))]
    pub async fn register(&self, input: NewRegistration) -> Result<Registration, DomainError> {
        let id = require(input.id, "id")?;
        let username = require(input.username, "username")?;
        let email = require(input.email, "email")?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load_users().await;

        if let Some(existing) = users.iter().find(|u| u.id == id || u.email == email) {
            debug!(user_id = %existing.id, "User already registered");
            return Ok(Registration::AlreadyRegistered(existing.clone()));
        }

        let now = Utc::now();
        let user = User {
            id,
            username,
            email,
            registered_at: input.registered_at.unwrap_or(now),
            version: input
                .version
                .unwrap_or_else(|| self.config.default_version.clone()),
            last_active: now,
        };

        users.push(user.clone());
        self.store.save_users(&users).await?;

        info!(user_id = %user.id, total_users = users.len(), "Registered new user");
        Ok(Registration::Created(user))
    }

    /// Append an activity event and bump the user's `last_active`.
    ///
    /// An unknown `user_id` is tolerated: the event is still stored.
    #[instrument(name = "usage_tracker.service.record_activity", skip(self, input))]
    pub async fn record_activity(&self, input: NewActivity) -> Result<ActivityEvent, DomainError> {
        let user_id = require(input.user_id, "userId")?;
        let action = require(input.action, "action")?;
        let timestamp = input.timestamp.unwrap_or_else(Utc::now);

        let _guard = self.write_lock.lock().await;

        let mut users = self.store.load_users().await;
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.last_active = timestamp;
                self.store.save_users(&users).await?;
            }
            None => debug!(user_id = %user_id, "Activity for unknown user; last_active not updated"),
        }

        let event = ActivityEvent {
            user_id,
            action,
            messages_sent: input.messages_sent.unwrap_or(0),
            timestamp,
        };

        let mut events = self.store.load_activity().await;
        events.push(event.clone());
        apply_retention(&mut events, self.config.activity_retention);
        self.store.save_activity(&events).await?;

        debug!(action = %event.action, stored = events.len(), "Recorded activity");
        Ok(event)
    }

    #[instrument(name = "usage_tracker.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Vec<User> {
        self.store.load_users().await
    }

    #[instrument(name = "usage_tracker.service.list_activity", skip(self))]
    pub async fn list_activity(&self) -> Vec<ActivityEvent> {
        self.store.load_activity().await
    }

    #[instrument(name = "usage_tracker.service.stats", skip(self))]
    pub async fn stats(&self) -> Stats {
        let users = self.store.load_users().await;
        let events = self.store.load_activity().await;
        stats::aggregate(&users, &events, Utc::now())
    }
}
