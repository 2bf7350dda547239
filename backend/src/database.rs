// Module database - PostgreSQL backend for persisted client state
// Architecture: implements the Store trait; handlers never see SQL

use async_trait::async_trait;
use serde_json::Value;
use shared::GeoPoint;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::store::{BlobUpdate, PinnedLocation, StateKey, Store, StoreError};

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create new database connection pool
    ///
    /// # Errors
    /// Returns StoreError if the URL is empty or the connection fails
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        if database_url.trim().is_empty() {
            return Err(StoreError::Config("database URL is empty".to_string()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        // sqlx::query() cannot run multiple statements, raw_sql can
        let mut conn = self.pool.acquire().await?;

        let migration_sql = include_str!("../migrations/20260101_create_client_state.sql");

        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl Store for Database {
    async fn get_blob(&self, key: StateKey) -> Result<Option<Value>, StoreError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM client_state WHERE key = $1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn put_blob(&self, key: StateKey, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO client_state (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Stored client state {}", key.as_str());
        Ok(())
    }

    async fn update_blob(&self, key: StateKey, update: BlobUpdate) -> Result<Value, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serialises updates of one key, even before its row exists
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(key.as_str())
            .execute(&mut *tx)
            .await?;

        let current =
            sqlx::query_scalar::<_, Value>("SELECT value FROM client_state WHERE key = $1")
                .bind(key.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let value = update(current)?;

        sqlx::query(
            r#"
            INSERT INTO client_state (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key.as_str())
        .bind(&value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!("Updated client state {}", key.as_str());
        Ok(value)
    }

    async fn delete_blob(&self, key: StateKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM client_state WHERE key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_location(&self, point: GeoPoint) -> Result<PinnedLocation, StoreError> {
        let location = sqlx::query_as::<_, PinnedLocation>(
            "INSERT INTO pinned_locations (lat, lng) VALUES ($1, $2) RETURNING *",
        )
        .bind(point.lat)
        .bind(point.lon)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            "Location saved: ({}, {}) (ID: {})",
            location.lat,
            location.lng,
            location.id
        );
        Ok(location)
    }

    async fn list_locations(&self) -> Result<Vec<PinnedLocation>, StoreError> {
        let locations = sqlx::query_as::<_, PinnedLocation>(
            "SELECT * FROM pinned_locations ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
