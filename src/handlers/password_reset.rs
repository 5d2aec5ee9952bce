use axum::{
    extract::{Path, State},
    response::{Json, Redirect},
    Form,
};
use model::entities::account;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, FormErrors, Result};
use crate::guards::SIGN_IN_PATH;
use crate::password::{check_new_password, hash_password};
use crate::schemas::{ApiResponse, AppState, FormPage};

fn link_not_found() -> AppError {
    AppError::NotFound("Password reset link".to_string())
}

/// The active account a live token resets. A token issued before the
/// account's latest password change is dropped.
async fn account_for_token(state: &AppState, token: &str) -> Result<account::Model> {
    let grant = state.reset_tokens.peek(token).await.ok_or_else(link_not_found)?;
    let account = account::Entity::find_by_id(grant.account_id)
        .one(&state.db)
        .await?
        .filter(|account| account.is_active);

    match account {
        Some(account) if grant.matches(&account) => Ok(account),
        _ => {
            debug!("Dropping stale password reset token for account {}", grant.account_id);
            state.reset_tokens.consume(token).await;
            Err(link_not_found())
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default)]
pub struct PasswordResetForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SetPasswordForm {
    pub new_password1: String,
    pub new_password2: String,
}

/// Password reset request page
#[utoipa::path(
    get,
    path = "/custom_password_reset/",
    tag = "password-reset",
    responses(
        (status = 200, description = "Email form", body = ApiResponse<FormPage>)
    )
)]
#[instrument]
pub async fn password_reset_page() -> Json<ApiResponse<FormPage>> {
    let form = FormPage::new("Password reset", "/custom_password_reset/", &["email"]);
    Json(ApiResponse::ok(form, "Password reset"))
}

/// Mail a reset link to every active account using `email`.
///
/// The response is the same whether or not the address is known.
#[utoipa::path(
    post,
    path = "/custom_password_reset/",
    tag = "password-reset",
    request_body(content = PasswordResetForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Request accepted; redirect to sign-in"),
        (status = 400, description = "Invalid email", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, form))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Form(form): Form<PasswordResetForm>,
) -> Result<Redirect> {
    trace!("Entering request_password_reset function");

    let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();
    if form.email.trim().is_empty() {
        errors = FormErrors::new();
        errors.add("email", "This field is required.");
    }
    errors.finish()?;

    let email = form.email.trim();
    let accounts = account::Entity::find()
        .filter(account::Column::Email.eq(email))
        .filter(account::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    if accounts.is_empty() {
        debug!("Password reset requested for an address with no active account");
    }
    for account in accounts {
        let token = state.reset_tokens.issue(&account).await;
        let link = format!(
            "{}/reset/{}/",
            state.settings.public_url.trim_end_matches('/'),
            token
        );
        state.mailer.send_reset_link(&account.email, &account.username, &link);
        info!("Issued password reset token for account {}", account.id);
    }

    Ok(Redirect::to(SIGN_IN_PATH))
}

/// New password form for a reset token
#[utoipa::path(
    get,
    path = "/reset/{token}/",
    tag = "password-reset",
    params(
        ("token" = String, Path, description = "Token from the reset link")
    ),
    responses(
        (status = 200, description = "New password form", body = ApiResponse<FormPage>),
        (status = 404, description = "Unknown, used or expired token", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, token))]
pub async fn reset_confirm_page(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<FormPage>>> {
    account_for_token(&state, &token).await?;
    let form = FormPage::new(
        "Enter new password",
        format!("/reset/{}/", token),
        &["new_password1", "new_password2"],
    );
    Ok(Json(ApiResponse::ok(form, "Enter new password")))
}

/// Set a new password through a reset token. The token is spent on success.
#[utoipa::path(
    post,
    path = "/reset/{token}/",
    tag = "password-reset",
    params(
        ("token" = String, Path, description = "Token from the reset link")
    ),
    request_body(content = SetPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Password set; redirect to sign-in"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Unknown, used or expired token", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, token, form))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<SetPasswordForm>,
) -> Result<Redirect> {
    let account = account_for_token(&state, &token).await?;

    let mut errors = FormErrors::new();
    check_new_password(
        "new_password1",
        "new_password2",
        &form.new_password1,
        &form.new_password2,
        &account.username,
        &mut errors,
    );
    errors.finish()?;

    let password_hash = hash_password(form.new_password1.clone()).await?;
    let mut active: account::ActiveModel = account.into();
    active.password_hash = Set(password_hash);
    let account = active.update(&state.db).await?;
    state.reset_tokens.consume(&token).await;
    info!("Account {} reset its password", account.id);

    Ok(Redirect::to(SIGN_IN_PATH))
}
