//! # Activity Log
//!
//! Read side of the append-only audit trail, plus the constructor the other
//! services use to build entries.
//!
//! Entries are only ever written inside the transaction of the operation
//! they describe; there is no standalone "log something" operation and no
//! mutation or deletion API.

use chrono::Utc;

use crate::error::EngineResult;
use kaos_core::{Activity, ActivityType, DEFAULT_ACTIVITY_LIMIT};
use kaos_db::{generate_id, Database};

/// Builds a new activity entry stamped with the current time.
pub(crate) fn record(
    activity_type: ActivityType,
    description: String,
    related_id: Option<String>,
) -> Activity {
    Activity {
        id: generate_id(),
        activity_type,
        description,
        timestamp: Utc::now(),
        related_id,
    }
}

/// The recent-activity feed.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    db: Database,
}

impl ActivityLog {
    /// Creates a new ActivityLog over the given database.
    pub fn new(db: Database) -> Self {
        ActivityLog { db }
    }

    /// Returns the most recent entries, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_ACTIVITY_LIMIT`] (10).
    pub async fn recent(&self, limit: Option<u32>) -> EngineResult<Vec<Activity>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        let activities = self.db.activities().recent(limit).await?;
        Ok(activities)
    }
}
