use crate::guards::{require_login, require_role};
use crate::handlers::{
    auth::{sign_in, sign_in_page, sign_out, sign_up, sign_up_page},
    dashboards::{client_dashboard, client_specific_view, designer_dashboard, designer_specific_view},
    discussions::{
        add_comment, add_comment_page, comment_on_discussion, get_discussion, list_discussions,
        start_discussion,
    },
    health::health_check,
    orders::{get_order, list_orders, place_order},
    pages::{about_us, home},
    password_reset::{confirm_password_reset, password_reset_page, reset_confirm_page, request_password_reset},
    portfolio::{get_portfolio_item, list_portfolio_items},
    settings::{change_password, change_password_page, settings_page, update_settings},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use model::Role;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Open to everyone
    let public = Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/about_us/", get(about_us))
        .route("/sign_up/", get(sign_up_page).post(sign_up))
        .route("/sign_in/", get(sign_in_page).post(sign_in))
        .route("/sign_out/", get(sign_out).post(sign_out))
        .route("/custom_password_reset/", get(password_reset_page).post(request_password_reset))
        .route("/reset/:token/", get(reset_confirm_page).post(confirm_password_reset))
        .route("/portfolio/", get(list_portfolio_items))
        .route("/portfolio/:item_id/", get(get_portfolio_item));

    // Any signed-in account
    let signed_in = Router::new()
        .route("/settings/", get(settings_page).post(update_settings))
        .route("/change_password/", get(change_password_page).post(change_password))
        .route("/discussions/", get(list_discussions).post(start_discussion))
        .route("/discussions/:discussion_id/", get(get_discussion).post(comment_on_discussion))
        .route("/add_comment/:discussion_id/", get(add_comment_page).post(add_comment));

    // Clients only
    let clients = Router::new()
        .route("/orders/", get(list_orders).post(place_order))
        .route("/orders/:order_id/", get(get_order))
        .route("/client_dashboard/", get(client_dashboard))
        .route("/client_specific_view/", get(client_specific_view))
        .route_layer(from_fn_with_state(Role::Client, require_role));

    // Designers only
    let designers = Router::new()
        .route("/designer_dashboard/", get(designer_dashboard))
        .route("/designer_specific_view/", get(designer_specific_view))
        .route_layer(from_fn_with_state(Role::Designer, require_role));

    // The login guard is added last so it runs before any role guard
    let gated = signed_in
        .merge(clients)
        .merge(designers)
        .route_layer(from_fn_with_state(state.clone(), require_login));

    Router::new()
        .merge(public)
        .merge(gated)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
