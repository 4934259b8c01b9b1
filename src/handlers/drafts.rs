//! Edit-session draft endpoints: /drafts/:kind/:id.

use crate::entities::draft_permission;
use crate::entity::value;
use crate::error::AppError;
use crate::extractors::{AdminUser, ListParams};
use crate::response::Envelope;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

async fn authorize(state: &AppState, user: Option<&str>, kind: &str) -> Result<(), AppError> {
    let permission =
        draft_permission(kind).ok_or_else(|| AppError::NotFound(format!("unknown draft kind: {}", kind)))?;
    state.permissions.check(user, permission).await
}

/// POST /drafts/:kind/:id with body `{data, useForSave?}`.
pub async fn save_draft(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path((kind, id)): Path<(String, String)>,
    ListParams(params): ListParams,
) -> Result<Json<Envelope>, AppError> {
    authorize(&state, user.as_deref(), &kind).await?;
    let fields = match params.get("data") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
            .map_err(|e| AppError::BadRequest(format!("data is not valid JSON: {}", e)))?,
        Some(other) => other.clone(),
        None => return Err(AppError::BadRequest("data is required".into())),
    };
    let Value::Object(fields) = fields else {
        return Err(AppError::BadRequest("data must be an object".into()));
    };
    let use_for_save = match params.get("useForSave") {
        Some(v) => value::flag("useForSave", v)?,
        None => false,
    };
    let draft = state.draft_service().save(&kind, &id, fields, use_for_save).await?;
    Ok(Json(Envelope::one(draft)))
}

/// GET /drafts/:kind/:id
pub async fn load_draft(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Envelope>, AppError> {
    authorize(&state, user.as_deref(), &kind).await?;
    let draft = state
        .draft_service()
        .load(&kind, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no draft for {} {}", kind, id)))?;
    Ok(Json(Envelope::one(draft)))
}

/// DELETE /drafts/:kind/:id
pub async fn discard_draft(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Envelope>, AppError> {
    authorize(&state, user.as_deref(), &kind).await?;
    let removed = state.draft_service().discard(&kind, &id).await?;
    tracing::debug!(%kind, %id, removed, "draft discarded");
    Ok(Json(Envelope::empty()))
}
