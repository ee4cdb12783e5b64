//! # Flavor Repository
//!
//! Database operations for the flavor catalog.
//!
//! Availability is never stored: it is derived from stock levels by the
//! ledger, so this table stays a plain name registry.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crumb_core::types::Flavor;

/// Repository for flavor catalog operations.
#[derive(Debug, Clone)]
pub struct FlavorRepository {
    pool: SqlitePool,
}

impl FlavorRepository {
    /// Creates a new FlavorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FlavorRepository { pool }
    }

    /// Inserts a new flavor. The name must be unique.
    pub async fn insert(&self, flavor: &Flavor) -> DbResult<()> {
        debug!(id = %flavor.id, name = %flavor.name, "Inserting flavor");

        sqlx::query("INSERT INTO flavors (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&flavor.id)
            .bind(&flavor.name)
            .bind(flavor.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Lists all flavors in catalog order (oldest first).
    pub async fn list(&self) -> DbResult<Vec<Flavor>> {
        let flavors = sqlx::query_as::<_, Flavor>(
            "SELECT id, name, created_at FROM flavors ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(flavors)
    }

    /// Gets a flavor by name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Flavor>> {
        let flavor = sqlx::query_as::<_, Flavor>(
            "SELECT id, name, created_at FROM flavors WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flavor)
    }

    /// Deletes a flavor from the catalog.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM flavors WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Flavor", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_list_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let oreo = Flavor::new("Oreo Rellenor Oreo");
        db.flavors().insert(&oreo).await.unwrap();

        let listed = db.flavors().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Oreo Rellenor Oreo");

        let found = db.flavors().get_by_name("Oreo Rellenor Oreo").await.unwrap();
        assert_eq!(found.unwrap().id, oreo.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.flavors().insert(&Flavor::new("Red Velvet")).await.unwrap();
        let err = db.flavors().insert(&Flavor::new("Red Velvet")).await;
        assert!(err.is_err());
    }
}
