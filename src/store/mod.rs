//! Storage contracts for settings entities and edit-session drafts.

pub mod memory;
pub mod postgres;

use crate::entity::{EntityId, ListableEntity};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

pub use memory::{MemoryDraftStore, MemoryStore};
pub use postgres::{ensure_database_exists, ensure_settings_tables, PgDraftStore, PgEntityStore, DEFAULT_SCHEMA};

/// Collection handle the list controller borrows per request.
#[async_trait]
pub trait EntityStore<E: ListableEntity>: Send + Sync {
    /// All entities, in storage order (ascending id).
    async fn load_all(&self) -> Result<Vec<E>, AppError>;

    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>, AppError>;

    fn create_new(&self) -> E {
        E::default()
    }

    /// Insert (assigning the id) or overwrite one entity.
    async fn persist(&self, entity: &mut E) -> Result<(), AppError>;

    async fn remove(&self, entity: &E) -> Result<(), AppError>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Slot used for the copy of a draft that should be used by the next save.
pub const SAVE_SLOT: &str = "_useForSave";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftKey {
    pub kind: String,
    pub id: String,
    pub slot: String,
}

impl DraftKey {
    pub fn new(kind: &str, id: &str) -> Self {
        DraftKey {
            kind: kind.to_string(),
            id: id.to_string(),
            slot: String::new(),
        }
    }

    pub fn slot(&self, slot: &str) -> Self {
        DraftKey {
            slot: slot.to_string(),
            ..self.clone()
        }
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, key: &DraftKey) -> Result<Option<Value>, AppError>;

    async fn put(&self, key: &DraftKey, value: &Value) -> Result<(), AppError>;

    /// True when something was removed.
    async fn remove(&self, key: &DraftKey) -> Result<bool, AppError>;
}
