use axum::{
    extract::{Extension, State},
    response::{Json, Redirect},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use model::entities::account;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::{check_username, non_empty, parse_social_links, username_conflict, username_taken, USERNAME_TAKEN};
use crate::context::CurrentAccount;
use crate::error::{FormErrors, Result};
use crate::guards::HOME_PATH;
use crate::password::{check_new_password, hash_password, verify_password};
use crate::schemas::{AccountSummary, ApiResponse, AppState, FormPage};

pub const SETTINGS_PATH: &str = "/settings/";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsPage {
    pub form: FormPage,
    /// Current profile values
    pub profile: AccountSummary,
}

/// Profile fields an account may change about itself. Role and password
/// are not among them.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default)]
pub struct UserUpdateForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub profile_picture: String,
    pub bio: String,
    pub social_links: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

/// Profile settings page
#[utoipa::path(
    get,
    path = "/settings/",
    tag = "settings",
    responses(
        (status = 200, description = "Profile form with current values", body = ApiResponse<SettingsPage>),
        (status = 303, description = "Not signed in; redirect to sign-in")
    )
)]
#[instrument(skip(caller), fields(account_id = caller.account.id))]
pub async fn settings_page(Extension(caller): Extension<CurrentAccount>) -> Json<ApiResponse<SettingsPage>> {
    let page = SettingsPage {
        form: FormPage::new(
            "Settings",
            SETTINGS_PATH,
            &["username", "email", "profile_picture", "bio", "social_links"],
        ),
        profile: caller.account.into(),
    };
    Json(ApiResponse::ok(page, "Settings"))
}

/// Update the caller's own profile
#[utoipa::path(
    post,
    path = "/settings/",
    tag = "settings",
    request_body(content = UserUpdateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Profile saved; redirect home"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, form), fields(account_id = caller.account.id))]
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Form(form): Form<UserUpdateForm>,
) -> Result<Redirect> {
    trace!("Entering update_settings function");

    let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();
    check_username(&form.username, &mut errors);
    let social_links = parse_social_links(&form.social_links, &mut errors);
    if !errors.has("username")
        && username_taken(&state.db, &form.username, Some(caller.account.id)).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }
    errors.finish()?;

    let mut active: account::ActiveModel = caller.account.into();
    active.username = Set(form.username.clone());
    active.email = Set(form.email.trim().to_string());
    active.profile_picture = Set(non_empty(&form.profile_picture));
    active.bio = Set(form.bio.clone());
    active.social_links = Set(social_links);

    let account = active.update(&state.db).await.map_err(username_conflict)?;
    info!("Account {} updated its profile", account.id);

    Ok(Redirect::to(HOME_PATH))
}

/// Password change form page
#[utoipa::path(
    get,
    path = "/change_password/",
    tag = "settings",
    responses(
        (status = 200, description = "Password change form", body = ApiResponse<FormPage>),
        (status = 303, description = "Not signed in; redirect to sign-in")
    )
)]
#[instrument]
pub async fn change_password_page() -> Json<ApiResponse<FormPage>> {
    let form = FormPage::new(
        "Change password",
        "/change_password/",
        &["old_password", "new_password1", "new_password2"],
    );
    Json(ApiResponse::ok(form, "Change password"))
}

/// Change the caller's password.
///
/// Every other session of the account stops working. The session making the
/// request is replaced by a fresh one so the caller stays signed in.
#[utoipa::path(
    post,
    path = "/change_password/",
    tag = "settings",
    request_body(content = ChangePasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Password changed; redirect to settings"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, jar, form), fields(account_id = caller.account.id))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> Result<(CookieJar, Redirect)> {
    trace!("Entering change_password function");

    let mut errors = FormErrors::new();
    if form.old_password.is_empty() {
        errors.add("old_password", "This field is required.");
    } else if !verify_password(form.old_password.clone(), caller.account.password_hash.clone()).await {
        errors.add(
            "old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        );
    }
    check_new_password(
        "new_password1",
        "new_password2",
        &form.new_password1,
        &form.new_password2,
        &caller.account.username,
        &mut errors,
    );
    errors.finish()?;

    let password_hash = hash_password(form.new_password1.clone()).await?;
    let mut active: account::ActiveModel = caller.account.into();
    active.password_hash = Set(password_hash);
    let account = active.update(&state.db).await?;

    let session_id = state.sessions.rotate(&caller.session_id, &account).await;
    let jar = jar.add(state.sessions.cookie(session_id, state.settings.secure_cookies));
    info!("Account {} changed its password", account.id);

    Ok((jar, Redirect::to(SETTINGS_PATH)))
}
