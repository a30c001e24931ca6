use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bucket of work. Names are unique and projects are never renamed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
