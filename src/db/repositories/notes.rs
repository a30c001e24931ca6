use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Note};

fn row_to_note(row: &Row) -> Result<Note> {
    let created_at: String = row.get("created_at")?;

    Ok(Note {
        id: row.get("id")?,
        content: row.get("content")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        session_id: row.get("session_id")?,
    })
}

impl Database {
    pub async fn add_note(&self, session_id: i64, content: &str) -> Result<Note> {
        let content = content.to_string();
        self.execute(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO notes (content, created_at, session_id) VALUES (?1, ?2, ?3)",
                params![content, now.to_rfc3339(), session_id],
            )
            .with_context(|| format!("failed to insert note for session {session_id}"))?;

            Ok(Note {
                id: conn.last_insert_rowid(),
                content,
                created_at: now,
                session_id,
            })
        })
        .await
    }

    /// Notes for a session, oldest first.
    pub async fn get_notes_for_session(&self, session_id: i64) -> Result<Vec<Note>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at, session_id
                 FROM notes
                 WHERE session_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            let mut notes = Vec::new();
            while let Some(row) = rows.next()? {
                notes.push(row_to_note(row)?);
            }

            Ok(notes)
        })
        .await
    }
}
