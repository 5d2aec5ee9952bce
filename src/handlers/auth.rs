use axum::{
    extract::{Query, State},
    response::{Json, Redirect},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use model::{Role, entities::account};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateUrl};

use crate::context::RequestContext;
use crate::error::{AppError, FormErrors, Result};
use crate::guards::{HOME_PATH, safe_next, sign_in_url};
use crate::password::{check_new_password, hash_password, verify_password};
use crate::schemas::{ApiResponse, AppState, FormPage};
use crate::session::removal_cookie;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
const REQUIRED: &str = "This field is required.";

/// Sign-up form. Passwords are typed twice.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default)]
pub struct SignUpForm {
    /// 150 characters or fewer. Letters, digits and @/./+/-/_ only.
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub password1: String,
    pub password2: String,
    /// `client` or `designer`
    pub role: String,
    pub bio: String,
    /// Reference to an uploaded profile image
    pub profile_picture: String,
    /// JSON object mapping a network name to a profile URL
    pub social_links: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
    /// Local path to continue to after signing in
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Record an error when `username` is empty or uses characters outside
/// letters, digits and `@ . + - _`.
pub(crate) fn check_username(username: &str, errors: &mut FormErrors) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

/// Parse the optional social links field: empty means none, otherwise a
/// JSON object whose values are all URLs.
pub(crate) fn parse_social_links(raw: &str, errors: &mut FormErrors) -> Option<serde_json::Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let invalid = "Enter a JSON object mapping each network to a URL.";
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(links)) => {
            let all_urls = links
                .values()
                .all(|link| link.as_str().is_some_and(|url| url.validate_url()));
            if all_urls {
                Some(serde_json::Value::Object(links))
            } else {
                errors.add("social_links", invalid);
                None
            }
        }
        _ => {
            errors.add("social_links", invalid);
            None
        }
    }
}

pub(crate) fn parse_role(raw: &str, errors: &mut FormErrors) -> Option<Role> {
    match raw.trim().to_lowercase().as_str() {
        "client" => Some(Role::Client),
        "designer" => Some(Role::Designer),
        "" => {
            errors.add("role", REQUIRED);
            None
        }
        other => {
            errors.add(
                "role",
                format!("Select a valid choice. {} is not one of the available choices.", other),
            );
            None
        }
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Whether `username` belongs to an account other than `except_id`.
pub(crate) async fn username_taken(
    db: &DatabaseConnection,
    username: &str,
    except_id: Option<i32>,
) -> Result<bool> {
    let mut query = account::Entity::find().filter(account::Column::Username.eq(username));
    if let Some(id) = except_id {
        query = query.filter(account::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Translate a unique-constraint failure on `username` into a form error.
pub(crate) fn username_conflict(db_error: DbErr) -> AppError {
    match db_error.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!("Username collided on write: {}", db_error);
            let mut errors = FormErrors::new();
            errors.add("username", USERNAME_TAKEN);
            AppError::Validation(errors)
        }
        _ => AppError::Database(db_error),
    }
}

/// Sign-up form page
#[utoipa::path(
    get,
    path = "/sign_up/",
    tag = "auth",
    responses(
        (status = 200, description = "Sign-up form", body = ApiResponse<FormPage>)
    )
)]
#[instrument]
pub async fn sign_up_page() -> Json<ApiResponse<FormPage>> {
    let form = FormPage::new(
        "Sign up",
        "/sign_up/",
        &["username", "email", "password1", "password2", "role", "bio", "profile_picture", "social_links"],
    );
    Json(ApiResponse::ok(form, "Sign up"))
}

/// Register a new account and sign it in
#[utoipa::path(
    post,
    path = "/sign_up/",
    tag = "auth",
    request_body(content = SignUpForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created and signed in; redirect home"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, context, jar, form), fields(username = %form.username))]
pub async fn sign_up(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> Result<(CookieJar, Redirect)> {
    trace!("Entering sign_up function");

    let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();
    check_username(&form.username, &mut errors);
    let role = parse_role(&form.role, &mut errors);
    let social_links = parse_social_links(&form.social_links, &mut errors);
    check_new_password(
        "password1",
        "password2",
        &form.password1,
        &form.password2,
        &form.username,
        &mut errors,
    );
    if !errors.has("username") && username_taken(&state.db, &form.username, None).await? {
        errors.add("username", USERNAME_TAKEN);
    }
    errors.finish()?;
    let role = role.ok_or_else(|| AppError::Internal("role missing after validation".to_string()))?;

    let password_hash = hash_password(form.password1.clone()).await?;
    let new_account = account::ActiveModel {
        username: Set(form.username.clone()),
        email: Set(form.email.trim().to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        bio: Set(form.bio.clone()),
        profile_picture: Set(non_empty(&form.profile_picture)),
        social_links: Set(social_links),
        ..Default::default()
    };

    let account = new_account.insert(&state.db).await.map_err(username_conflict)?;
    info!("Registered account {} ({}) as {}", account.id, account.username, account.role);

    if let Some(previous) = context.session_id {
        state.sessions.remove(&previous).await;
    }
    let session_id = state.sessions.create(&account).await;
    let jar = jar.add(state.sessions.cookie(session_id, state.settings.secure_cookies));

    Ok((jar, Redirect::to(HOME_PATH)))
}

/// Sign-in form page
#[utoipa::path(
    get,
    path = "/sign_in/",
    tag = "auth",
    params(NextQuery),
    responses(
        (status = 200, description = "Sign-in form", body = ApiResponse<FormPage>)
    )
)]
#[instrument]
pub async fn sign_in_page(Query(query): Query<NextQuery>) -> Json<ApiResponse<FormPage>> {
    let action = match query.next.as_deref() {
        Some(next) => sign_in_url(safe_next(Some(next))),
        None => "/sign_in/".to_string(),
    };
    let form = FormPage::new("Sign in", action, &["username", "password"]);
    Json(ApiResponse::ok(form, "Sign in"))
}

/// Authenticate with username and password
#[utoipa::path(
    post,
    path = "/sign_in/",
    tag = "auth",
    params(NextQuery),
    request_body(content = SignInForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirect to `next` or home"),
        (status = 400, description = "Missing fields", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, context, jar, query, form), fields(username = %form.username))]
pub async fn sign_in(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<SignInForm>,
) -> Result<(CookieJar, Redirect)> {
    trace!("Entering sign_in function");

    let mut errors = FormErrors::new();
    if form.username.is_empty() {
        errors.add("username", REQUIRED);
    }
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }
    errors.finish()?;

    let Some(account) = account::Entity::find()
        .filter(account::Column::Username.eq(&form.username))
        .one(&state.db)
        .await?
    else {
        debug!("Sign-in for unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(form.password.clone(), account.password_hash.clone()).await {
        debug!("Wrong password for account {}", account.id);
        return Err(AppError::InvalidCredentials);
    }
    if !account.is_active {
        debug!("Sign-in refused for inactive account {}", account.id);
        return Err(AppError::InvalidCredentials);
    }

    let mut active: account::ActiveModel = account.into();
    active.last_login = Set(Some(Utc::now()));
    let account = active.update(&state.db).await?;

    if let Some(previous) = context.session_id {
        state.sessions.remove(&previous).await;
    }
    let session_id = state.sessions.create(&account).await;
    let jar = jar.add(state.sessions.cookie(session_id, state.settings.secure_cookies));
    info!("Account {} signed in", account.id);

    let next = form.next.or(query.next);
    Ok((jar, Redirect::to(safe_next(next.as_deref()))))
}

/// End the current session
#[utoipa::path(
    get,
    path = "/sign_out/",
    tag = "auth",
    responses(
        (status = 303, description = "Signed out; redirect home")
    )
)]
#[instrument(skip(state, context, jar))]
pub async fn sign_out(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(session_id) = context.session_id {
        state.sessions.remove(&session_id).await;
        if let Some(account) = context.account {
            info!("Account {} signed out", account.id);
        }
    }
    (jar.remove(removal_cookie()), Redirect::to(HOME_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_username() {
        let mut errors = FormErrors::new();
        check_username("alice.w+studio@x-1_", &mut errors);
        assert!(errors.is_empty());

        let mut errors = FormErrors::new();
        check_username("alice smith", &mut errors);
        assert!(errors.has("username"));

        let mut errors = FormErrors::new();
        check_username("", &mut errors);
        assert_eq!(errors.into_inner()["username"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_parse_social_links() {
        let mut errors = FormErrors::new();
        assert_eq!(parse_social_links("  ", &mut errors), None);
        assert!(errors.is_empty());

        let links = parse_social_links(
            r#"{"behance": "https://www.behance.net/dana", "x": "https://x.com/dana"}"#,
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
        assert_eq!(links["behance"], "https://www.behance.net/dana");

        for bad in [r#"["https://x.com"]"#, r#"{"x": "not a url"}"#, r#"{"x": 3}"#, "{oops"] {
            let mut errors = FormErrors::new();
            assert_eq!(parse_social_links(bad, &mut errors), None, "{}", bad);
            assert!(errors.has("social_links"), "{}", bad);
        }
    }

    #[test]
    fn test_parse_role() {
        let mut errors = FormErrors::new();
        assert_eq!(parse_role("client", &mut errors), Some(Role::Client));
        assert_eq!(parse_role("Designer", &mut errors), Some(Role::Designer));
        assert!(errors.is_empty());

        assert_eq!(parse_role("admin", &mut errors), None);
        assert!(errors.has("role"));
    }
}
