use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use model::Role;
use model::entities::account;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::config::Settings;
use crate::password_reset::{ResetMailer, ResetTokenStore};
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Signed-in sessions keyed by the id carried in the session cookie
    pub sessions: SessionStore,
    /// Outstanding password reset tokens
    pub reset_tokens: ResetTokenStore,
    /// Delivery of password reset links
    pub mailer: Arc<dyn ResetMailer>,
    pub settings: Arc<Settings>,
}

/// API response wrapper. Every page is delivered in one of these.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Per-field messages when a submitted form was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
            fields: None,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Describes the form a page accepts on POST.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormPage {
    pub title: String,
    /// Where the form is submitted to
    pub action: String,
    /// Field names in display order
    pub fields: Vec<String>,
}

impl FormPage {
    pub fn new(title: &str, action: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            action: action.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Public view of an account. The password hash is never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub profile_picture: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub social_links: Option<serde_json::Value>,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl From<account::Model> for AccountSummary {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            bio: model.bio,
            profile_picture: model.profile_picture,
            social_links: model.social_links,
            last_login: model.last_login,
            date_joined: model.created_at,
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::pages::home,
        crate::handlers::pages::about_us,
        crate::handlers::auth::sign_up_page,
        crate::handlers::auth::sign_up,
        crate::handlers::auth::sign_in_page,
        crate::handlers::auth::sign_in,
        crate::handlers::auth::sign_out,
        crate::handlers::settings::settings_page,
        crate::handlers::settings::update_settings,
        crate::handlers::settings::change_password_page,
        crate::handlers::settings::change_password,
        crate::handlers::password_reset::password_reset_page,
        crate::handlers::password_reset::request_password_reset,
        crate::handlers::password_reset::reset_confirm_page,
        crate::handlers::password_reset::confirm_password_reset,
        crate::handlers::portfolio::list_portfolio_items,
        crate::handlers::portfolio::get_portfolio_item,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::place_order,
        crate::handlers::orders::get_order,
        crate::handlers::discussions::list_discussions,
        crate::handlers::discussions::start_discussion,
        crate::handlers::discussions::get_discussion,
        crate::handlers::discussions::comment_on_discussion,
        crate::handlers::discussions::add_comment_page,
        crate::handlers::discussions::add_comment,
        crate::handlers::dashboards::client_dashboard,
        crate::handlers::dashboards::designer_dashboard,
        crate::handlers::dashboards::client_specific_view,
        crate::handlers::dashboards::designer_specific_view,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            FormPage,
            AccountSummary,
            Role,
            crate::handlers::pages::HomePage,
            crate::handlers::pages::AboutPage,
            crate::handlers::auth::SignUpForm,
            crate::handlers::auth::SignInForm,
            crate::handlers::settings::SettingsPage,
            crate::handlers::settings::UserUpdateForm,
            crate::handlers::settings::ChangePasswordForm,
            crate::handlers::password_reset::PasswordResetForm,
            crate::handlers::password_reset::SetPasswordForm,
            crate::handlers::portfolio::PortfolioItemResponse,
            crate::handlers::orders::OrderForm,
            crate::handlers::orders::OrderResponse,
            crate::handlers::orders::OrderListPage,
            crate::handlers::discussions::DiscussionForm,
            crate::handlers::discussions::CommentForm,
            crate::handlers::discussions::DiscussionSummary,
            crate::handlers::discussions::CommentResponse,
            crate::handlers::discussions::DiscussionListPage,
            crate::handlers::discussions::DiscussionDetailPage,
            crate::handlers::discussions::AddCommentPage,
            crate::handlers::dashboards::ClientDashboardPage,
            crate::handlers::dashboards::DesignerDashboardPage,
            crate::handlers::dashboards::RoleViewPage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pages", description = "Static site pages"),
        (name = "auth", description = "Sign up, sign in and sign out"),
        (name = "settings", description = "Self-service profile and password management"),
        (name = "password-reset", description = "Mail-triggered password reset"),
        (name = "portfolio", description = "Read-only showcase catalog"),
        (name = "orders", description = "Client work orders"),
        (name = "discussions", description = "Discussion forum"),
        (name = "dashboards", description = "Role-gated dashboards"),
    ),
    info(
        title = "DesignDesk",
        description = "Design studio site - client orders, designer portfolio and discussion forum",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
