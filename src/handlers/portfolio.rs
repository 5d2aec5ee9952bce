use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::portfolio_item;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::schemas::{ApiResponse, AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortfolioItemResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Reference to the showcase image
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<portfolio_item::Model> for PortfolioItemResponse {
    fn from(model: portfolio_item::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image: model.image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List all portfolio items
#[utoipa::path(
    get,
    path = "/portfolio/",
    tag = "portfolio",
    responses(
        (status = 200, description = "Every portfolio item", body = ApiResponse<Vec<PortfolioItemResponse>>),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_portfolio_items(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PortfolioItemResponse>>>> {
    trace!("Entering list_portfolio_items function");

    let items = portfolio_item::Entity::find()
        .order_by_asc(portfolio_item::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} portfolio items", items.len());

    let items: Vec<PortfolioItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok(items, "Portfolio items retrieved successfully")))
}

/// Get a portfolio item by ID
#[utoipa::path(
    get,
    path = "/portfolio/{item_id}/",
    tag = "portfolio",
    params(
        ("item_id" = i32, Path, description = "Portfolio item ID")
    ),
    responses(
        (status = 200, description = "Portfolio item", body = ApiResponse<PortfolioItemResponse>),
        (status = 404, description = "Portfolio item not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_portfolio_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Json<ApiResponse<PortfolioItemResponse>>> {
    let item = portfolio_item::Entity::find_by_id(item_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio item {}", item_id)))?;

    Ok(Json(ApiResponse::ok(item.into(), "Portfolio item retrieved successfully")))
}
