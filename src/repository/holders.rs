//! Holders repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::holder::{HolderId, HolderRow},
};

#[derive(Clone)]
pub struct HoldersRepository {
    pool: Pool<Postgres>,
}

impl HoldersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all holders in insertion order
    pub async fn list(&self) -> AppResult<Vec<HolderRow>> {
        let rows = sqlx::query_as::<_, HolderRow>("SELECT id, name FROM holders ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Find holder by ID
    pub async fn find_by_id(&self, id: HolderId) -> AppResult<Option<HolderRow>> {
        let row = sqlx::query_as::<_, HolderRow>("SELECT id, name FROM holders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Get holder by ID
    pub async fn get_by_id(&self, id: HolderId) -> AppResult<HolderRow> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Holder {} not found", id)))
    }

    /// Find a holder by exact name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<HolderRow>> {
        let row = sqlx::query_as::<_, HolderRow>("SELECT id, name FROM holders WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create a holder
    pub async fn create(&self, name: &str) -> AppResult<HolderRow> {
        sqlx::query_as::<_, HolderRow>("INSERT INTO holders (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, format!("Holder '{}' already exists", name)))
    }

    /// Rename a holder
    pub async fn rename(&self, id: HolderId, name: &str) -> AppResult<HolderRow> {
        sqlx::query_as::<_, HolderRow>("UPDATE holders SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, format!("Holder '{}' already exists", name)))?
            .ok_or_else(|| AppError::NotFound(format!("Holder {} not found", id)))
    }

    /// Delete a holder; its books go with it
    pub async fn delete(&self, id: HolderId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM holders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Holder {} not found", id)));
        }
        Ok(())
    }
}
