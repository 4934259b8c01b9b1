//! Shared application state for all routes: one store per settings list plus the
//! collaborators the controller borrows per request.

use crate::collaborators::{
    AllowAll, CacheInvalidator, ElementResolver, LoggingInvalidator, PermissionChecker, StaticElementResolver,
};
use crate::entities::{
    Glossary, PredefinedMetadata, PredefinedProperty, StaticRoute, TagConfig, ThumbnailConfig, VideoThumbnailConfig,
    WebsiteSetting,
};
use crate::entity::ListableEntity;
use crate::error::AppError;
use crate::service::{DraftService, ListController};
use crate::store::{DraftStore, EntityStore, MemoryDraftStore, MemoryStore, PgDraftStore, PgEntityStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct EntityStores {
    pub static_routes: Arc<dyn EntityStore<StaticRoute>>,
    pub glossary: Arc<dyn EntityStore<Glossary>>,
    pub metadata: Arc<dyn EntityStore<PredefinedMetadata>>,
    pub properties: Arc<dyn EntityStore<PredefinedProperty>>,
    pub website_settings: Arc<dyn EntityStore<WebsiteSetting>>,
    pub tags: Arc<dyn EntityStore<TagConfig>>,
    pub thumbnails: Arc<dyn EntityStore<ThumbnailConfig>>,
    pub video_thumbnails: Arc<dyn EntityStore<VideoThumbnailConfig>>,
}

/// Typed lookup of the store for entity `E`.
pub trait HasStore<E: ListableEntity> {
    fn store(&self) -> &dyn EntityStore<E>;
}

macro_rules! has_store {
    ($($field:ident => $entity:ty),* $(,)?) => {
        $(impl HasStore<$entity> for EntityStores {
            fn store(&self) -> &dyn EntityStore<$entity> {
                self.$field.as_ref()
            }
        })*
    };
}

has_store! {
    static_routes => StaticRoute,
    glossary => Glossary,
    metadata => PredefinedMetadata,
    properties => PredefinedProperty,
    website_settings => WebsiteSetting,
    tags => TagConfig,
    thumbnails => ThumbnailConfig,
    video_thumbnails => VideoThumbnailConfig,
}

impl EntityStores {
    pub fn in_memory() -> Self {
        EntityStores {
            static_routes: Arc::new(MemoryStore::new()),
            glossary: Arc::new(MemoryStore::new()),
            metadata: Arc::new(MemoryStore::new()),
            properties: Arc::new(MemoryStore::new()),
            website_settings: Arc::new(MemoryStore::new()),
            tags: Arc::new(MemoryStore::new()),
            thumbnails: Arc::new(MemoryStore::new()),
            video_thumbnails: Arc::new(MemoryStore::new()),
        }
    }

    pub fn postgres(pool: &PgPool, schema: &str) -> Self {
        EntityStores {
            static_routes: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            glossary: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            metadata: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            properties: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            website_settings: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            tags: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            thumbnails: Arc::new(PgEntityStore::new(pool.clone(), schema)),
            video_thumbnails: Arc::new(PgEntityStore::new(pool.clone(), schema)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub stores: EntityStores,
    pub drafts: Arc<dyn DraftStore>,
    pub elements: Arc<dyn ElementResolver>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub cache: Arc<dyn CacheInvalidator>,
}

impl AppState {
    /// In-process stores, no element tree, every permission granted.
    pub fn in_memory() -> Self {
        AppState {
            stores: EntityStores::in_memory(),
            drafts: Arc::new(MemoryDraftStore::new()),
            elements: Arc::new(StaticElementResolver::new()),
            permissions: Arc::new(AllowAll),
            cache: Arc::new(LoggingInvalidator::default()),
        }
    }

    /// PostgreSQL stores in `schema` on `pool`; tables must already exist (`ensure_settings_tables`).
    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        AppState {
            stores: EntityStores::postgres(&pool, schema),
            drafts: Arc::new(PgDraftStore::new(pool, schema)),
            elements: Arc::new(StaticElementResolver::new()),
            permissions: Arc::new(AllowAll),
            cache: Arc::new(LoggingInvalidator::default()),
        }
    }

    pub fn with_elements(mut self, elements: Arc<dyn ElementResolver>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    pub fn store<E: ListableEntity>(&self) -> &dyn EntityStore<E>
    where
        EntityStores: HasStore<E>,
    {
        <EntityStores as HasStore<E>>::store(&self.stores)
    }

    pub fn list_controller<E: ListableEntity>(&self) -> ListController<'_, E>
    where
        EntityStores: HasStore<E>,
    {
        ListController {
            store: self.store::<E>(),
            elements: self.elements.as_ref(),
            permissions: self.permissions.as_ref(),
            cache: self.cache.as_ref(),
        }
    }

    pub fn draft_service(&self) -> DraftService<'_> {
        DraftService::new(self.drafts.as_ref())
    }

    /// Ping every settings store, keyed by entity kind.
    pub async fn store_health(&self) -> Vec<(&'static str, Result<(), AppError>)> {
        let s = &self.stores;
        vec![
            (StaticRoute::KIND, s.static_routes.ping().await),
            (Glossary::KIND, s.glossary.ping().await),
            (PredefinedMetadata::KIND, s.metadata.ping().await),
            (PredefinedProperty::KIND, s.properties.ping().await),
            (WebsiteSetting::KIND, s.website_settings.ping().await),
            (TagConfig::KIND, s.tags.ping().await),
            (ThumbnailConfig::KIND, s.thumbnails.ping().await),
            (VideoThumbnailConfig::KIND, s.video_thumbnails.ping().await),
        ]
    }
}
