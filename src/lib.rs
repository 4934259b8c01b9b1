//! Settings admin: generic settings-list CRUD backend speaking the ExtJS grid protocol.

pub mod collaborators;
pub mod config;
pub mod entities;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use collaborators::{
    AllowAll, CacheInvalidator, ElementKind, ElementResolver, LoggingInvalidator, PermissionChecker,
    StaticElementResolver, StaticPermissions,
};
pub use config::{ServerConfig, StoreBackend};
pub use entity::{EntityId, ListableEntity};
pub use error::{AppError, ConfigError};
pub use query::{ListQuery, ListResult, SortDirection, SortSpec};
pub use response::Envelope;
pub use routes::{app, common_routes, draft_routes, settings_routes};
pub use service::{DraftService, ListAction, ListController, ListRequest, ListResponse};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_settings_tables};
