//! # Reseller Repository
//!
//! Database operations for the reseller registry. Resellers are small and
//! long-lived; the registry only grows.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kaos_core::Reseller;

/// Repository for reseller database operations.
#[derive(Debug, Clone)]
pub struct ResellerRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, name, phone, address, created_at";

impl ResellerRepository {
    /// Creates a new ResellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ResellerRepository { pool }
    }

    /// Lists all resellers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Reseller>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM resellers ORDER BY created_at DESC");
        let resellers = sqlx::query_as::<_, Reseller>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(resellers)
    }

    /// Gets a reseller by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Reseller>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM resellers WHERE id = ?1");
        let reseller = sqlx::query_as::<_, Reseller>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(reseller)
    }

    /// Gets a reseller by ID on a transaction connection.
    pub async fn get_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Reseller>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM resellers WHERE id = ?1");
        let reseller = sqlx::query_as::<_, Reseller>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(reseller)
    }

    /// Gets several resellers at once (for detail-view joins).
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Reseller>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {SELECT_COLUMNS} FROM resellers WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Reseller>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let resellers = query.fetch_all(&self.pool).await?;

        Ok(resellers)
    }

    /// Inserts a new reseller.
    pub async fn insert_tx(
        &self,
        conn: &mut SqliteConnection,
        reseller: &Reseller,
    ) -> DbResult<()> {
        debug!(name = %reseller.name, "Inserting reseller");

        sqlx::query(
            r#"
            INSERT INTO resellers (id, name, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&reseller.id)
        .bind(&reseller.name)
        .bind(&reseller.phone)
        .bind(&reseller.address)
        .bind(reseller.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Updates a reseller's contact fields.
    pub async fn update(&self, reseller: &Reseller) -> DbResult<()> {
        debug!(id = %reseller.id, "Updating reseller");

        let result = sqlx::query(
            r#"
            UPDATE resellers SET
                name = ?2,
                phone = ?3,
                address = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&reseller.id)
        .bind(&reseller.name)
        .bind(&reseller.phone)
        .bind(&reseller.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reseller", &reseller.id));
        }

        Ok(())
    }
}
