//! One handler for every settings list, monomorphized per entity type.

use crate::entity::ListableEntity;
use crate::error::AppError;
use crate::extractors::{AdminUser, ListParams};
use crate::response::Envelope;
use crate::service::ListRequest;
use crate::state::{AppState, EntityStores, HasStore};
use axum::extract::State;
use axum::Json;

/// GET/POST /settings/<list>: list, or create/update/destroy when `data` is sent.
pub async fn entity_list<E>(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    ListParams(params): ListParams,
) -> Result<Json<Envelope>, AppError>
where
    E: ListableEntity,
    EntityStores: HasStore<E>,
{
    let request = ListRequest::from_params(&params)?.by(user);
    let response = state.list_controller::<E>().handle(request).await?;
    Ok(Json(response.into_envelope()))
}
