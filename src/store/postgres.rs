//! PostgreSQL stores. One `_sys_<kind>` table per entity kind with a JSONB payload,
//! plus `_sys_drafts` for edit-session drafts. Tables live in the configured settings
//! schema (`ServerConfig::settings_schema`).

use super::{DraftKey, DraftStore, EntityStore};
use crate::entity::{unique_key_string, EntityId, ListableEntity};
use crate::error::{AppError, ConfigError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::marker::PhantomData;
use std::str::FromStr;

/// Schema-qualified table name (e.g. "settings._sys_glossary"). `schema` is validated
/// as an identifier when the config is read.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

pub fn table_for_kind(kind: &str) -> String {
    format!("_sys_{}", kind)
}

const DRAFTS_TABLE: &str = "_sys_drafts";

/// Schema used when none is configured.
pub const DEFAULT_SCHEMA: &str = "settings";

/// Create the settings schema and one table per entity kind, plus the drafts table.
pub async fn ensure_settings_tables(pool: &PgPool, schema: &str, kinds: &[&str]) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;

    for kind in kinds {
        let q_table = qualified_table(schema, &table_for_kind(kind));
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                payload JSONB NOT NULL,
                unique_key TEXT UNIQUE,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            q_table
        );
        sqlx::query(&ddl).execute(pool).await?;
    }

    let q_drafts = qualified_table(schema, DRAFTS_TABLE);
    let drafts_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            kind TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            slot TEXT NOT NULL,
            value JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (kind, entity_id, slot)
        )
        "#,
        q_drafts
    );
    sqlx::query(&drafts_ddl).execute(pool).await?;
    tracing::debug!(schema = %schema, kinds = kinds.len(), "settings tables ensured");
    Ok(())
}

/// JSONB-backed collection for one entity kind.
pub struct PgEntityStore<E> {
    pool: PgPool,
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: ListableEntity> PgEntityStore<E> {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgEntityStore {
            pool,
            table: qualified_table(schema, &table_for_kind(E::KIND)),
            _entity: PhantomData,
        }
    }

    fn decode(id: i64, payload: Value) -> Result<E, AppError> {
        let mut entity: E = serde_json::from_value(payload)
            .map_err(|e| AppError::Internal(format!("stored {} {} is unreadable: {}", E::KIND, id, e)))?;
        entity.set_id(EntityId(id));
        Ok(entity)
    }

    fn encode(entity: &E) -> Result<Value, AppError> {
        let mut payload = serde_json::to_value(entity)
            .map_err(|e| AppError::Internal(format!("cannot encode {}: {}", E::KIND, e)))?;
        // The id lives in its own column.
        if let Value::Object(ref mut map) = payload {
            map.remove("id");
        }
        Ok(payload)
    }
}

#[async_trait]
impl<E: ListableEntity> EntityStore<E> for PgEntityStore<E> {
    async fn load_all(&self) -> Result<Vec<E>, AppError> {
        let rows: Vec<(i64, Value)> = sqlx::query_as(&format!("SELECT id, payload FROM {} ORDER BY id", self.table))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(|(id, payload)| Self::decode(id, payload)).collect()
    }

    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>, AppError> {
        let row: Option<(i64, Value)> = sqlx::query_as(&format!("SELECT id, payload FROM {} WHERE id = $1", self.table))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(id, payload)| Self::decode(id, payload)).transpose()
    }

    async fn persist(&self, entity: &mut E) -> Result<(), AppError> {
        let payload = Self::encode(entity)?;
        let key = unique_key_string(entity);
        match entity.id() {
            Some(id) => {
                let result = sqlx::query(&format!(
                    "UPDATE {} SET payload = $2, unique_key = $3, updated_at = NOW() WHERE id = $1",
                    self.table
                ))
                .bind(id.0)
                .bind(&payload)
                .bind(key)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(AppError::NotFound(format!("{} {}", E::KIND, id)));
                }
            }
            None => {
                let (id,): (i64,) = sqlx::query_as(&format!(
                    "INSERT INTO {} (payload, unique_key, updated_at) VALUES ($1, $2, NOW()) RETURNING id",
                    self.table
                ))
                .bind(&payload)
                .bind(key)
                .fetch_one(&self.pool)
                .await?;
                entity.set_id(EntityId(id));
            }
        }
        Ok(())
    }

    async fn remove(&self, entity: &E) -> Result<(), AppError> {
        let id = entity
            .id()
            .ok_or_else(|| AppError::NotFound(format!("{} without id", E::KIND)))?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {}", E::KIND, id)));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

pub struct PgDraftStore {
    pool: PgPool,
    table: String,
}

impl PgDraftStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgDraftStore {
            pool,
            table: qualified_table(schema, DRAFTS_TABLE),
        }
    }
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn get(&self, key: &DraftKey) -> Result<Option<Value>, AppError> {
        let q_table = &self.table;
        let row: Option<(Value,)> = sqlx::query_as(&format!(
            "SELECT value FROM {} WHERE kind = $1 AND entity_id = $2 AND slot = $3",
            q_table
        ))
        .bind(&key.kind)
        .bind(&key.id)
        .bind(&key.slot)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(v,)| v))
    }

    async fn put(&self, key: &DraftKey, value: &Value) -> Result<(), AppError> {
        let q_table = &self.table;
        let sql = format!(
            r#"
            INSERT INTO {} (kind, entity_id, slot, value, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (kind, entity_id, slot)
            DO UPDATE SET value = $4, updated_at = NOW()
            "#,
            q_table
        );
        sqlx::query(&sql)
            .bind(&key.kind)
            .bind(&key.id)
            .bind(&key.slot)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &DraftKey) -> Result<bool, AppError> {
        let q_table = &self.table;
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE kind = $1 AND entity_id = $2 AND slot = $3",
            q_table
        ))
        .bind(&key.kind)
        .bind(&key.id)
        .bind(&key.slot)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Create the database named in `database_url` when it is missing. Runs CREATE DATABASE
/// over a connection to the `postgres` maintenance database on the same server.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let target = DatabaseTarget::parse(database_url)?;
    let Some(name) = target.name.filter(|n| n != "postgres") else {
        return Ok(());
    };
    let opts = sqlx::postgres::PgConnectOptions::from_str(&target.maintenance_url).map_err(|e| {
        ConfigError::Invalid {
            key: "DATABASE_URL",
            message: e.to_string(),
        }
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        tracing::info!(database = %name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Database named by a connection URL, and the URL of the maintenance database
/// on the same server (query parameters kept).
#[derive(Debug, PartialEq)]
struct DatabaseTarget {
    maintenance_url: String,
    name: Option<String>,
}

impl DatabaseTarget {
    fn parse(url: &str) -> Result<Self, ConfigError> {
        let authority_start = url.find("://").map(|i| i + 3).ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            message: format!("{}: missing scheme", url),
        })?;
        let (base, rest) = url.split_at(authority_start);
        let (authority, tail) = match rest.find(|c: char| c == '/' || c == '?') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let (path, query) = match tail.find('?') {
            Some(i) => tail.split_at(i),
            None => (tail, ""),
        };
        let name = path.trim_start_matches('/').trim();
        Ok(DatabaseTarget {
            maintenance_url: format!("{}{}/postgres{}", base, authority, query),
            name: (!name.is_empty()).then(|| name.to_string()),
        })
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
