use axum::{
    extract::{Extension, State},
    response::Json,
};
use model::entities::{discussion, order, portfolio_item};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::context::CurrentAccount;
use crate::error::Result;
use crate::schemas::{AccountSummary, ApiResponse, AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientDashboardPage {
    pub account: AccountSummary,
    /// Orders placed by this client
    pub order_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DesignerDashboardPage {
    pub account: AccountSummary,
    /// Size of the studio catalog
    pub portfolio_item_count: u64,
    /// Discussions opened by this designer
    pub discussion_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleViewPage {
    pub title: String,
    pub account: AccountSummary,
}

/// Client dashboard
#[utoipa::path(
    get,
    path = "/client_dashboard/",
    tag = "dashboards",
    responses(
        (status = 200, description = "Client dashboard", body = ApiResponse<ClientDashboardPage>),
        (status = 303, description = "Not signed in, or not a client")
    )
)]
#[instrument(skip(state, caller), fields(account_id = caller.account.id))]
pub async fn client_dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<ClientDashboardPage>>> {
    let order_count = order::Entity::find()
        .filter(order::Column::ClientId.eq(caller.account.id))
        .count(&state.db)
        .await?;

    let page = ClientDashboardPage {
        account: caller.account.into(),
        order_count,
    };
    Ok(Json(ApiResponse::ok(page, "Client dashboard")))
}

/// Designer dashboard
#[utoipa::path(
    get,
    path = "/designer_dashboard/",
    tag = "dashboards",
    responses(
        (status = 200, description = "Designer dashboard", body = ApiResponse<DesignerDashboardPage>),
        (status = 303, description = "Not signed in, or not a designer")
    )
)]
#[instrument(skip(state, caller), fields(account_id = caller.account.id))]
pub async fn designer_dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<DesignerDashboardPage>>> {
    let portfolio_item_count = portfolio_item::Entity::find().count(&state.db).await?;
    let discussion_count = discussion::Entity::find()
        .filter(discussion::Column::AuthorId.eq(caller.account.id))
        .count(&state.db)
        .await?;

    let page = DesignerDashboardPage {
        account: caller.account.into(),
        portfolio_item_count,
        discussion_count,
    };
    Ok(Json(ApiResponse::ok(page, "Designer dashboard")))
}

#[utoipa::path(
    get,
    path = "/client_specific_view/",
    tag = "dashboards",
    responses(
        (status = 200, description = "Client-only page", body = ApiResponse<RoleViewPage>),
        (status = 303, description = "Not signed in, or not a client")
    )
)]
#[instrument(skip(caller), fields(account_id = caller.account.id))]
pub async fn client_specific_view(Extension(caller): Extension<CurrentAccount>) -> Json<ApiResponse<RoleViewPage>> {
    let page = RoleViewPage {
        title: "Client area".to_string(),
        account: caller.account.into(),
    };
    Json(ApiResponse::ok(page, "Client area"))
}

#[utoipa::path(
    get,
    path = "/designer_specific_view/",
    tag = "dashboards",
    responses(
        (status = 200, description = "Designer-only page", body = ApiResponse<RoleViewPage>),
        (status = 303, description = "Not signed in, or not a designer")
    )
)]
#[instrument(skip(caller), fields(account_id = caller.account.id))]
pub async fn designer_specific_view(Extension(caller): Extension<CurrentAccount>) -> Json<ApiResponse<RoleViewPage>> {
    let page = RoleViewPage {
        title: "Designer studio".to_string(),
        account: caller.account.into(),
    };
    Json(ApiResponse::ok(page, "Designer studio"))
}
