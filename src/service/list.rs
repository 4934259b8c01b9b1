//! Generic list/create/update/destroy dispatch over any `ListableEntity`.

use crate::collaborators::{CacheInvalidator, ElementResolver, PermissionChecker};
use crate::entities::now_unix;
use crate::entity::{apply_fields, unique_key, EntityId, ListableEntity};
use crate::error::AppError;
use crate::query::{ListQuery, ListResult};
use crate::response::Envelope;
use crate::store::EntityStore;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What a settings-list request asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum ListAction {
    List(ListQuery),
    Create(Map<String, Value>),
    Update(EntityId, Map<String, Value>),
    Destroy(EntityId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListRequest {
    pub action: ListAction,
    /// Acting admin user, checked against the entity's permission.
    pub user: Option<String>,
}

impl ListRequest {
    pub fn new(action: ListAction) -> Self {
        ListRequest { action, user: None }
    }

    pub fn by(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    /// Infer the action from grid parameters: no `data` means list, otherwise
    /// `xaction` selects create, update or destroy.
    pub fn from_params(params: &HashMap<String, Value>) -> Result<Self, AppError> {
        let data = match params.get("data") {
            None | Some(Value::Null) => return Ok(Self::new(ListAction::List(ListQuery::from_params(params)))),
            Some(Value::String(raw)) if raw.is_empty() => {
                return Ok(Self::new(ListAction::List(ListQuery::from_params(params))))
            }
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::BadRequest(format!("data is not valid JSON: {}", e)))?,
            Some(other) => other.clone(),
        };

        let xaction = params.get("xaction").and_then(Value::as_str).unwrap_or("");
        let action = match xaction {
            "create" => ListAction::Create(into_fields(data)?),
            "update" => {
                let fields = into_fields(data)?;
                let id = fields.get("id").and_then(EntityId::from_value).ok_or_else(missing_id)?;
                ListAction::Update(id, fields)
            }
            "destroy" => {
                let id = match &data {
                    Value::Object(fields) => fields.get("id").and_then(EntityId::from_value),
                    scalar => EntityId::from_value(scalar),
                };
                ListAction::Destroy(id.ok_or_else(missing_id)?)
            }
            "" => return Err(AppError::BadRequest("data given without xaction".into())),
            other => return Err(AppError::BadRequest(format!("unknown xaction: {}", other))),
        };
        Ok(Self::new(action))
    }
}

fn into_fields(data: Value) -> Result<Map<String, Value>, AppError> {
    match data {
        Value::Object(fields) => Ok(fields),
        _ => Err(AppError::BadRequest("data must be an object".into())),
    }
}

fn missing_id() -> AppError {
    AppError::NotFound("missing id".into())
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListResponse {
    Many(ListResult<Value>),
    One(Value),
    Removed,
}

impl ListResponse {
    pub fn into_envelope(self) -> Envelope {
        match self {
            ListResponse::Many(result) => Envelope::many(result.items, result.total),
            ListResponse::One(item) => Envelope::one(item),
            ListResponse::Removed => Envelope::empty(),
        }
    }
}

/// Borrows the store and collaborators for one request; holds no state of its own.
pub struct ListController<'a, E: ListableEntity> {
    pub store: &'a dyn EntityStore<E>,
    pub elements: &'a dyn ElementResolver,
    pub permissions: &'a dyn PermissionChecker,
    pub cache: &'a dyn CacheInvalidator,
}

impl<'a, E: ListableEntity> ListController<'a, E> {
    /// Reading a list is open to every admin user; mutations need `E::PERMISSION`.
    pub async fn handle(&self, request: ListRequest) -> Result<ListResponse, AppError> {
        if !matches!(request.action, ListAction::List(_)) {
            self.permissions.check(request.user.as_deref(), E::PERMISSION).await?;
        }
        match request.action {
            ListAction::List(query) => self.list(&query).await,
            ListAction::Create(fields) => self.create(fields).await,
            ListAction::Update(id, fields) => self.update(id, fields).await,
            ListAction::Destroy(id) => self.destroy(id).await,
        }
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResponse, AppError> {
        let rows = self
            .store
            .load_all()
            .await?
            .into_iter()
            .map(|e| {
                let fields = e.field_values();
                (e, fields)
            })
            .collect();
        let page = query.apply(rows);
        let mut items = Vec::with_capacity(page.items.len());
        for entity in &page.items {
            items.push(entity.present(self.elements).await?);
        }
        Ok(ListResponse::Many(ListResult {
            items,
            total: page.total,
        }))
    }

    async fn create(&self, mut fields: Map<String, Value>) -> Result<ListResponse, AppError> {
        fields.remove("id");
        E::normalize_input(&mut fields, None, self.elements).await?;
        let mut entity = self.store.create_new();
        apply_fields(&mut entity, &fields)?;
        self.save(&mut entity, true).await?;
        tracing::info!(kind = E::KIND, id = ?entity.id(), "created");
        Ok(ListResponse::One(entity.present(self.elements).await?))
    }

    async fn update(&self, id: EntityId, mut fields: Map<String, Value>) -> Result<ListResponse, AppError> {
        let current = self.find(id).await?;
        fields.remove("id");
        E::normalize_input(&mut fields, Some(&current), self.elements).await?;
        let mut entity = current;
        apply_fields(&mut entity, &fields)?;
        self.save(&mut entity, false).await?;
        tracing::info!(kind = E::KIND, %id, "updated");
        Ok(ListResponse::One(entity.present(self.elements).await?))
    }

    async fn destroy(&self, id: EntityId) -> Result<ListResponse, AppError> {
        let entity = self.find(id).await?;
        self.store.remove(&entity).await?;
        self.invalidate().await?;
        tracing::info!(kind = E::KIND, %id, "removed");
        Ok(ListResponse::Removed)
    }

    async fn find(&self, id: EntityId) -> Result<E, AppError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", E::KIND, id)))
    }

    async fn save(&self, entity: &mut E, created: bool) -> Result<(), AppError> {
        self.ensure_unique(entity).await?;
        entity.touch(now_unix(), created);
        self.store.persist(entity).await?;
        self.invalidate().await
    }

    async fn ensure_unique(&self, entity: &E) -> Result<(), AppError> {
        let Some(key) = unique_key(entity) else {
            return Ok(());
        };
        let clash = self
            .store
            .load_all()
            .await?
            .iter()
            .any(|other| other.id() != entity.id() && unique_key(other).as_ref() == Some(&key));
        if clash {
            return Err(AppError::DuplicateKey(format!("{} {:?}", E::KIND, key)));
        }
        Ok(())
    }

    async fn invalidate(&self) -> Result<(), AppError> {
        if E::CACHE_TAGS.is_empty() {
            return Ok(());
        }
        self.cache.clear_tags(E::CACHE_TAGS).await
    }
}
