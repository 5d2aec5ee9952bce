use axum::{
    extract::{Extension, Path, State},
    response::{Json, Redirect},
    Form,
};
use chrono::{DateTime, Utc};
use model::entities::order;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::context::CurrentAccount;
use crate::error::{AppError, FormErrors, Result};
use crate::schemas::{ApiResponse, AppState, FormPage};

/// A new order. The owner is always the client submitting it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default)]
pub struct OrderForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub client_id: i32,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            client_id: model.client_id,
            title: model.title,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListPage {
    /// The caller's own orders, oldest first
    pub orders: Vec<OrderResponse>,
    pub form: FormPage,
}

/// List the caller's orders
#[utoipa::path(
    get,
    path = "/orders/",
    tag = "orders",
    responses(
        (status = 200, description = "Orders placed by the signed-in client", body = ApiResponse<OrderListPage>),
        (status = 303, description = "Not signed in, or not a client")
    )
)]
#[instrument(skip(state, caller), fields(account_id = caller.account.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<OrderListPage>>> {
    trace!("Entering list_orders function");

    let orders = order::Entity::find()
        .filter(order::Column::ClientId.eq(caller.account.id))
        .order_by_asc(order::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} orders", orders.len());

    let page = OrderListPage {
        orders: orders.into_iter().map(Into::into).collect(),
        form: FormPage::new("Place an order", "/orders/", &["title", "description"]),
    };
    Ok(Json(ApiResponse::ok(page, "Orders retrieved successfully")))
}

/// Place an order
#[utoipa::path(
    post,
    path = "/orders/",
    tag = "orders",
    request_body(content = OrderForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Order placed; redirect to its detail page"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, form), fields(account_id = caller.account.id))]
pub async fn place_order(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Form(form): Form<OrderForm>,
) -> Result<Redirect> {
    let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();
    errors.require("title", &form.title);
    errors.require("description", &form.description);
    errors.finish()?;

    let new_order = order::ActiveModel {
        client_id: Set(caller.account.id),
        title: Set(form.title.clone()),
        description: Set(form.description.clone()),
        ..Default::default()
    };
    let order = new_order.insert(&state.db).await?;
    info!("Client {} placed order {}", caller.account.id, order.id);

    Ok(Redirect::to(&format!("/orders/{}/", order.id)))
}

/// Get one of the caller's orders
#[utoipa::path(
    get,
    path = "/orders/{order_id}/",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderResponse>),
        (status = 303, description = "Not signed in, or not a client"),
        (status = 404, description = "No such order for this client", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller), fields(account_id = caller.account.id))]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Path(order_id): Path<i32>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    // Another client's order answers exactly like a missing one.
    let order = order::Entity::find_by_id(order_id)
        .filter(order::Column::ClientId.eq(caller.account.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))?;

    Ok(Json(ApiResponse::ok(order.into(), "Order retrieved successfully")))
}
