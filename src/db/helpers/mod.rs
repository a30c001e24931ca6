use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::SessionStatus;

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_status(value: &str) -> Result<SessionStatus> {
    match value {
        "in_progress" => Ok(SessionStatus::InProgress),
        "paused" => Ok(SessionStatus::Paused),
        "completed" => Ok(SessionStatus::Completed),
        "reset" => Ok(SessionStatus::Reset),
        other => Err(anyhow!("unknown session status {other}")),
    }
}

/// True when the error is SQLite rejecting a row for a constraint (UNIQUE, FOREIGN KEY, ...).
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            SessionStatus::InProgress,
            SessionStatus::Paused,
            SessionStatus::Completed,
            SessionStatus::Reset,
        ] {
            assert_eq!(parse_status(status.as_str()).unwrap(), status);
        }
        assert!(parse_status("Running").is_err());
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(to_u64(-1, "duration_seconds").is_err());
        assert_eq!(to_u64(42, "duration_seconds").unwrap(), 42);
    }

    #[test]
    fn datetimes_parse_as_utc() {
        let parsed = parse_datetime("2024-03-01T10:00:00+02:00", "start_time").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T08:00:00+00:00");
        assert!(parse_optional_datetime(None, "end_time").unwrap().is_none());
        assert!(parse_datetime("yesterday", "start_time").is_err());
    }
}
