use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{ActivityEvent, NewActivity, NewRegistration, Registration, Stats, User};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub version: String,
    pub last_active: DateTime<Utc>,
}

/// REST DTO for an activity event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEventDto {
    pub user_id: String,
    pub action: String,
    pub messages_sent: u64,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/register body. Required fields are checked by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

/// POST /api/activity body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReq {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub messages_sent: Option<u64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// `{success: true, user}` for a new user, `{message, user}` for a repeat registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResp {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityListDto {
    pub activity: Vec<ActivityEventDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_users: usize,
    pub active_today: usize,
    pub total_messages: u64,
}

pub const ALREADY_REGISTERED: &str = "User already registered";

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            registered_at: u.registered_at,
            version: u.version,
            last_active: u.last_active,
        }
    }
}

impl From<ActivityEvent> for ActivityEventDto {
    fn from(e: ActivityEvent) -> Self {
        Self {
            user_id: e.user_id,
            action: e.action,
            messages_sent: e.messages_sent,
            timestamp: e.timestamp,
        }
    }
}

impl From<RegisterReq> for NewRegistration {
    fn from(req: RegisterReq) -> Self {
        Self {
            id: req.id,
            username: req.username,
            email: req.email,
            registered_at: req.registered_at,
            version: req.version,
        }
    }
}

impl From<ActivityReq> for NewActivity {
    fn from(req: ActivityReq) -> Self {
        Self {
            user_id: req.user_id,
            action: req.action,
            messages_sent: req.messages_sent,
            timestamp: req.timestamp,
        }
    }
}

impl From<Registration> for RegisterResp {
    fn from(r: Registration) -> Self {
        match r {
            Registration::Created(user) => Self {
                success: Some(true),
                message: None,
                user: user.into(),
            },
            Registration::AlreadyRegistered(user) => Self {
                success: None,
                message: Some(ALREADY_REGISTERED.to_string()),
                user: user.into(),
            },
        }
    }
}

impl From<Stats> for StatsDto {
    fn from(s: Stats) -> Self {
        Self {
            total_users: s.total_users,
            active_today: s.active_today,
            total_messages: s.total_messages,
        }
    }
}
