use chrono::{DateTime, Utc};

use crate::contract::model::{ActivityEvent, Stats, User};

/// Action that closes a client session and carries its final message count.
pub const SESSION_END_ACTION: &str = "stop";

/// Summary counters as of `now`.
///
/// Only session-end events count towards `total_messages`; other actions may
/// carry running counts that would otherwise be summed twice. The total
/// saturates at `u64::MAX`.
pub fn aggregate(users: &[User], events: &[ActivityEvent], now: DateTime<Utc>) -> Stats {
    let today = now.date_naive();

    let active_today = users
        .iter()
        .filter(|u| u.last_active.date_naive() == today)
        .count();

    let total_messages = events
        .iter()
        .filter(|e| e.action == SESSION_END_ACTION)
        .fold(0u64, |total, e| total.saturating_add(e.messages_sent));

    Stats {
        total_users: users.len(),
        active_today,
        total_messages,
    }
}
