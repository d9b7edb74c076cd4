//! Planned item handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use tracing::info;

use super::read_json;
use crate::{resolve_owner, AppError, AppState, SuccessResponse};
use cashcast_core::models::{NewPlannedItem, PlannedItem};

/// GET /api/planned-items - List the owner's planned items
pub async fn list_planned_items(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<PlannedItem>>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    Ok(Json(state.db.list_planned_items(&owner)?))
}

/// POST /api/planned-items - Add a planned item
pub async fn create_planned_item(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<PlannedItem>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    let req: NewPlannedItem = read_json(request).await?;

    let id = state.db.insert_planned_item(&owner, &req)?;
    info!(owner = %owner, id, kind = %req.kind, "Planned item created");

    let item = state
        .db
        .list_planned_items(&owner)?
        .into_iter()
        .find(|item| item.id == id)
        .ok_or_else(|| AppError::internal("Planned item not found after creation"))?;

    Ok(Json(item))
}

/// DELETE /api/planned-items/:id - Remove a planned item
pub async fn delete_planned_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;

    state.db.delete_planned_item(&owner, id)?;
    info!(owner = %owner, id, "Planned item deleted");

    Ok(Json(SuccessResponse { success: true }))
}
