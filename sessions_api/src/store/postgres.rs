//! PostgreSQL record store.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::config::DatabaseConfig;
use super::{Record, RecordId, RecordStore, StoreError, StoreResult, UniqueIndex};

/// PostgreSQL implementation of [`RecordStore`].
///
/// All kinds share one `records` table (kind discriminator + JSONB fields);
/// field-equality queries use JSONB containment and uniqueness constraints
/// become partial unique indexes, so conflicting inserts fail atomically at
/// the storage layer.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    unique: Vec<UniqueIndex>,
}

impl PgRecordStore {
    /// Create a new store backed by a connection pool
    ///
    /// # Errors
    ///
    /// * `StoreError::Database` - Pool creation or connection failed
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self {
            pool,
            unique: Vec::new(),
        })
    }

    /// Declare a uniqueness constraint on one field of a record kind.
    /// Takes effect on the next [`ensure_schema`](Self::ensure_schema) call.
    pub fn with_unique(mut self, kind: impl Into<String>, field: impl Into<String>) -> Self {
        self.unique.push(UniqueIndex {
            kind: kind.into(),
            field: field.into(),
        });
        self
    }

    /// Create the records table and declared unique indexes if absent.
    ///
    /// Kind and field names are startup configuration, not request input;
    /// index names are still restricted to identifier characters and the
    /// literals quote-escaped before being spliced into DDL.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                 id TEXT PRIMARY KEY,
                 kind TEXT NOT NULL,
                 fields JSONB NOT NULL,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             )",
        )
        .execute(&self.pool)
        .await?;

        for constraint in &self.unique {
            let stmt = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON records ((fields->>'{}')) WHERE kind = '{}'",
                index_name(&constraint.kind, &constraint.field),
                literal(&constraint.field),
                literal(&constraint.kind),
            );
            sqlx::query(&stmt).execute(&self.pool).await?;
        }

        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_insert_error(&self, kind: &str, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                let field = self
                    .unique
                    .iter()
                    .find(|u| {
                        u.kind == kind
                            && db.constraint() == Some(index_name(&u.kind, &u.field).as_str())
                    })
                    .map(|u| u.field.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                return StoreError::Conflict {
                    kind: kind.to_string(),
                    field,
                };
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, kind: &str, fields: Map<String, Value>) -> StoreResult<RecordId> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO records (id, kind, fields) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(kind)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_insert_error(kind, e))?;

        Ok(id)
    }

    async fn find(&self, kind: &str, query: &Map<String, Value>) -> StoreResult<Option<Record>> {
        // The id is not part of the JSONB document; split it out of the query
        let mut fields_query = query.clone();
        let id = fields_query.remove("id");

        let row = match id {
            Some(id) => {
                sqlx::query(
                    "SELECT id, fields FROM records
                     WHERE kind = $1 AND id = $2 AND fields @> $3
                     LIMIT 1",
                )
                .bind(kind)
                .bind(id.as_str().unwrap_or_default())
                .bind(Value::Object(fields_query))
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, fields FROM records
                     WHERE kind = $1 AND fields @> $2
                     LIMIT 1",
                )
                .bind(kind)
                .bind(Value::Object(fields_query))
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row.map(|r| {
            let fields: Value = r.get("fields");
            Record {
                id: r.get("id"),
                fields: fields.as_object().cloned().unwrap_or_default(),
            }
        }))
    }

    async fn delete(&self, kind: &str, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM records WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: kind.to_string(),
            });
        }
        Ok(())
    }
}

fn index_name(kind: &str, field: &str) -> String {
    format!("records_{}_{}_key", ident(kind), ident(field))
}

fn ident(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

fn literal(raw: &str) -> String {
    raw.replace('\'', "''")
}
