//! Contracts for the services this backend talks to but does not implement:
//! element path lookup, permission checks, cache-tag invalidation.

use crate::error::{AppError, ConfigError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

/// Element families addressable by id and by path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Document,
    Asset,
    Object,
}

impl FromStr for ElementKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(ElementKind::Document),
            "asset" => Ok(ElementKind::Asset),
            "object" => Ok(ElementKind::Object),
            _ => Err(AppError::BadRequest(format!("unknown element type: {}", s))),
        }
    }
}

#[async_trait]
pub trait ElementResolver: Send + Sync {
    async fn id_by_path(&self, kind: ElementKind, path: &str) -> Result<Option<i64>, AppError>;

    async fn path_by_id(&self, kind: ElementKind, id: i64) -> Result<Option<String>, AppError>;
}

/// Element tree held in memory, loadable from a JSON file of `{kind, id, path}` rows.
#[derive(Clone, Debug, Default)]
pub struct StaticElementResolver {
    by_path: HashMap<(ElementKind, String), i64>,
    by_id: HashMap<(ElementKind, i64), String>,
}

#[derive(Deserialize)]
struct ElementRow {
    kind: ElementKind,
    id: i64,
    path: String,
}

impl StaticElementResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ElementKind, id: i64, path: &str) -> Self {
        self.insert(kind, id, path);
        self
    }

    pub fn insert(&mut self, kind: ElementKind, id: i64, path: &str) {
        self.by_path.insert((kind, path.to_string()), id);
        self.by_id.insert((kind, id), path.to_string());
    }

    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let rows: Vec<ElementRow> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let mut resolver = Self::new();
        for row in rows {
            resolver.insert(row.kind, row.id, &row.path);
        }
        Ok(resolver)
    }
}

#[async_trait]
impl ElementResolver for StaticElementResolver {
    async fn id_by_path(&self, kind: ElementKind, path: &str) -> Result<Option<i64>, AppError> {
        Ok(self.by_path.get(&(kind, path.to_string())).copied())
    }

    async fn path_by_id(&self, kind: ElementKind, id: i64) -> Result<Option<String>, AppError> {
        Ok(self.by_id.get(&(kind, id)).cloned())
    }
}

#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Ok when `user` holds `permission`; PermissionDenied otherwise.
    async fn check(&self, user: Option<&str>, permission: &str) -> Result<(), AppError>;
}

/// Grants everything. Used when no permission source is configured.
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn check(&self, _user: Option<&str>, _permission: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Fixed user → permission grants.
#[derive(Clone, Debug, Default)]
pub struct StaticPermissions {
    grants: HashMap<String, HashSet<String>>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, user: &str, permission: &str) -> Self {
        self.grants
            .entry(user.to_string())
            .or_default()
            .insert(permission.to_string());
        self
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissions {
    async fn check(&self, user: Option<&str>, permission: &str) -> Result<(), AppError> {
        let allowed = user
            .and_then(|u| self.grants.get(u))
            .map(|perms| perms.contains(permission))
            .unwrap_or(false);
        if allowed {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(permission.to_string()))
        }
    }
}

#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn clear_tags(&self, tags: &[&str]) -> Result<(), AppError>;
}

/// Records the tags it was asked to clear; the output cache lives elsewhere.
#[derive(Default)]
pub struct LoggingInvalidator {
    cleared: std::sync::Mutex<Vec<String>>,
}

impl LoggingInvalidator {
    pub fn cleared(&self) -> Vec<String> {
        self.cleared.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CacheInvalidator for LoggingInvalidator {
    async fn clear_tags(&self, tags: &[&str]) -> Result<(), AppError> {
        tracing::info!(?tags, "clearing cache tags");
        if let Ok(mut guard) = self.cleared.lock() {
            guard.extend(tags.iter().map(|t| t.to_string()));
        }
        Ok(())
    }
}
