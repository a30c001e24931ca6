use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form text attached to a task session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub session_id: i64,
}
