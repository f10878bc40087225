//! JSON-file-backed implementation of the `RecordStore` port.
//!
//! Each collection lives in its own file inside the data directory and is
//! rewritten in full on every save: the new content goes to a sibling
//! `*.json.tmp` file which is then renamed over the old one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::contract::model::{ActivityEvent, User};
use crate::domain::repo::RecordStore;
use crate::infra::storage::entity::{ActivityRecord, UserRecord};

pub const USERS_FILE: &str = "users.json";
pub const ACTIVITY_FILE: &str = "activity.json";

pub struct JsonFileStore {
    dir: PathBuf,
    users_path: PathBuf,
    activity_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            users_path: dir.join(USERS_FILE),
            activity_path: dir.join(ACTIVITY_FILE),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn activity_path(&self) -> &Path {
        &self.activity_path
    }

    /// Create the data directory and seed missing collection files with `[]`.
    /// Existing files are left untouched.
    pub async fn init(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create data dir {}", self.dir.display()))?;

        for path in [&self.users_path, &self.activity_path] {
            if tokio::fs::try_exists(path)
                .await
                .with_context(|| format!("probe {}", path.display()))?
            {
                continue;
            }
            tokio::fs::write(path, b"[]")
                .await
                .with_context(|| format!("seed {}", path.display()))?;
            info!(path = %path.display(), "Initialized empty collection");
        }
        Ok(())
    }

    async fn read_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Collection file missing; using empty collection");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Collection file unreadable; using empty collection");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Collection file corrupt; using empty collection");
                Vec::new()
            }
        }
    }

    async fn write_collection<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(items)
            .with_context(|| format!("serialize {}", path.display()))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("replace {}", path.display()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for JsonFileStore {
    async fn load_users(&self) -> Vec<User> {
        Self::read_collection::<UserRecord>(&self.users_path)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    async fn save_users(&self, users: &[User]) -> anyhow::Result<()> {
        let records: Vec<UserRecord> = users.iter().map(Into::into).collect();
        Self::write_collection(&self.users_path, &records).await
    }

    async fn load_activity(&self) -> Vec<ActivityEvent> {
        Self::read_collection::<ActivityRecord>(&self.activity_path)
            .await
            .into_iter()
            .map(Into::into)
            .collect()
    }

    async fn save_activity(&self, events: &[ActivityEvent]) -> anyhow::Result<()> {
        let records: Vec<ActivityRecord> = events.iter().map(Into::into).collect();
        Self::write_collection(&self.activity_path, &records).await
    }
}
