use crate::contract::model::{ActivityEvent, User};
use async_trait::async_trait;

/// Port for the domain layer: the two persisted collections.
///
/// Loads are fail-open: an absent, unreadable or malformed collection comes
/// back empty instead of failing. Saves replace the whole collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_users(&self) -> Vec<User>;
    async fn save_users(&self, users: &[User]) -> anyhow::Result<()>;
    async fn load_activity(&self) -> Vec<ActivityEvent>;
    async fn save_activity(&self, events: &[ActivityEvent]) -> anyhow::Result<()>;
}
