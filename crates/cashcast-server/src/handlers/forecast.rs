//! Budget and forecast handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::read_json;
use crate::{resolve_owner, AppError, AppState, SuccessResponse};
use cashcast_core::forecast::{Budget, BudgetEdit, Horizon, RollingForecast, VarianceReport};

/// Query parameters selecting a forecast horizon
#[derive(Debug, Deserialize)]
pub struct HorizonQuery {
    pub horizon: Option<String>,
}

impl HorizonQuery {
    fn parse(&self) -> Result<Horizon, AppError> {
        let raw = self.horizon.as_deref().ok_or_else(|| {
            AppError::bad_request("Missing horizon. Valid values: sixMonths, yearEnd")
        })?;
        Ok(raw.parse()?)
    }
}

/// Request body for applying edits
#[derive(Debug, Deserialize)]
pub struct EditBudgetRequest {
    pub budget: Budget,
    pub edits: Vec<BudgetEdit>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBudgetResponse {
    pub success: bool,
    /// Whether a saved budget existed
    pub deleted: bool,
}

/// POST /api/forecast/budget/generate?horizon= - Project a fresh (unsaved) budget
pub async fn generate_budget(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HorizonQuery>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    let horizon = query.parse()?;

    let budget = state.service().generate(&owner, horizon)?;
    Ok(Json(budget))
}

/// GET /api/forecast/budget - Load the saved budget
pub async fn load_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;

    let budget = state
        .service()
        .load(&owner)?
        .ok_or_else(|| AppError::not_found("No saved budget"))?;
    Ok(Json(budget))
}

/// PUT /api/forecast/budget - Save (replace) the budget
pub async fn save_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    let budget: Budget = read_json(request).await?;

    state.service().save(&owner, &budget)?;
    info!(owner = %owner, months = budget.forecast_months.len(), "Budget saved via API");

    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/forecast/budget - Remove the saved budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<DeleteBudgetResponse>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;

    let deleted = state.service().delete(&owner)?;
    Ok(Json(DeleteBudgetResponse {
        success: true,
        deleted,
    }))
}

/// POST /api/forecast/budget/edits - Apply edits to a budget without saving
pub async fn edit_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    let req: EditBudgetRequest = read_json(request).await?;

    let edited = state.service().apply_edits(&owner, &req.budget, &req.edits)?;
    Ok(Json(edited))
}

/// GET /api/forecast/rolling?horizon= - Actual + forecast timeline with runway
pub async fn rolling_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HorizonQuery>,
    request: Request,
) -> Result<Json<RollingForecast>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;
    let horizon = query.parse()?;

    let forecast = state.service().rolling_forecast(&owner, horizon)?;
    Ok(Json(forecast))
}

/// GET /api/forecast/variance - Saved plan versus actuals
pub async fn variance(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<VarianceReport>, AppError> {
    let owner = resolve_owner(request.headers(), state.config.require_auth)?;

    let report = state.service().variance(&owner)?;
    Ok(Json(report))
}
