//! # Activity Repository
//!
//! Database operations for the append-only activity log.
//!
//! ## Append-Only Contract
//! Entries are inserted as a side effect of state-changing operations and
//! are never updated or deleted. There is deliberately no update or delete
//! method on this repository.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use kaos_core::Activity;

/// Repository for activity log operations.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, activity_type, description, timestamp, related_id";

impl ActivityRepository {
    /// Creates a new ActivityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ActivityRepository { pool }
    }

    /// Returns the most recent entries, newest first.
    ///
    /// Equal timestamps are tie-broken by rowid, which follows insertion
    /// order on this append-only table.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Activity>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM activities ORDER BY timestamp DESC, rowid DESC LIMIT ?1"
        );
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(activities)
    }

    /// Appends an entry on a transaction connection.
    ///
    /// Used by composite operations so the log entry commits or rolls back
    /// together with the state change it describes.
    pub async fn insert_tx(&self, conn: &mut SqliteConnection, activity: &Activity) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activities (id, activity_type, description, timestamp, related_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&activity.id)
        .bind(activity.activity_type)
        .bind(&activity.description)
        .bind(activity.timestamp)
        .bind(&activity.related_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}
