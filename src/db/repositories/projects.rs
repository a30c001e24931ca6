use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{is_constraint_violation, parse_datetime},
    models::Project,
};

fn row_to_project(row: &Row) -> Result<Project> {
    let created_at: String = row.get("created_at")?;

    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Insert a project unless one with the same name exists.
    ///
    /// Returns `None` when the name is taken. The lookup and the insert run in the
    /// same DB task; the UNIQUE constraint on `projects.name` catches any writer
    /// that slips in between.
    pub async fn add_project(&self, name: &str) -> Result<Option<Project>> {
        let name = name.to_string();
        self.execute(move |conn| {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM projects WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                info!("Project '{}' already exists", name);
                return Ok(None);
            }

            let now = Utc::now();
            match conn.execute(
                "INSERT INTO projects (name, created_at) VALUES (?1, ?2)",
                params![name, now.to_rfc3339()],
            ) {
                Ok(_) => {}
                Err(err) if is_constraint_violation(&err) => {
                    warn!("Project '{}' could not be added: {}", name, err);
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }

            Ok(Some(Project {
                id: conn.last_insert_rowid(),
                name,
                created_at: now,
            }))
        })
        .await
    }

    /// All projects ordered by name.
    pub async fn get_all_projects(&self) -> Result<Vec<Project>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, created_at
                 FROM projects
                 ORDER BY name ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut projects = Vec::new();
            while let Some(row) = rows.next()? {
                projects.push(row_to_project(row)?);
            }

            Ok(projects)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("tasky.db")).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn duplicate_name_returns_none_without_second_row() {
        let (_dir, db) = open();

        let first = db.add_project("Writing").await.unwrap().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "Writing");

        assert!(db.add_project("Writing").await.unwrap().is_none());
        assert_eq!(db.get_all_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unique_constraint_backs_up_the_lookup() {
        let (_dir, db) = open();
        db.add_project("Reading").await.unwrap().unwrap();

        let err = db
            .execute(|conn| {
                conn.execute(
                    "INSERT INTO projects (name, created_at) VALUES ('Reading', '2024-01-01T00:00:00+00:00')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap_err();
        let sqlite_err = err.downcast_ref::<rusqlite::Error>().unwrap();
        assert!(is_constraint_violation(sqlite_err));
    }

    #[tokio::test]
    async fn projects_are_listed_by_name() {
        let (_dir, db) = open();
        for name in ["Writing", "Admin", "Music"] {
            db.add_project(name).await.unwrap();
        }

        let names: Vec<String> = db
            .get_all_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Admin", "Music", "Writing"]);
    }
}
