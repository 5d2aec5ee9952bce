//! Who is making the request.
//!
//! `RequestContext` is resolved once per request from the session cookie and
//! cached in the request extensions. `CurrentAccount` is inserted by the
//! login guard and is only present on routes behind it.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use model::entities::account;
use sea_orm::EntityTrait;
use tracing::{debug, trace};

use crate::error::AppError;
use crate::schemas::AppState;
use crate::session::session_id_from;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// The signed-in account, if the session is valid.
    pub account: Option<account::Model>,
    /// Id of the session cookie, if one was presented and is still live.
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// The signed-in caller on a login-gated route.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account: account::Model,
    pub session_id: String,
}

/// Resolve the caller from the session cookie in `headers`.
///
/// A session whose account vanished, was deactivated, or changed password
/// since the session was issued is dropped and the caller is anonymous.
pub async fn resolve(headers: &HeaderMap, state: &AppState) -> Result<RequestContext, AppError> {
    let jar = CookieJar::from_headers(headers);
    let Some(session_id) = session_id_from(&jar) else {
        trace!("No session cookie presented");
        return Ok(RequestContext::anonymous());
    };

    let Some(session) = state.sessions.get(&session_id).await else {
        debug!("Session cookie refers to an unknown or expired session");
        return Ok(RequestContext::anonymous());
    };

    let account = account::Entity::find_by_id(session.account_id)
        .one(&state.db)
        .await?;

    match account {
        Some(account) if account.is_active && session.matches(&account) => Ok(RequestContext {
            account: Some(account),
            session_id: Some(session_id),
        }),
        _ => {
            debug!(
                "Dropping stale session for account {} issued at {}",
                session.account_id, session.created_at
            );
            state.sessions.remove(&session_id).await;
            Ok(RequestContext::anonymous())
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(context) = parts.extensions.get::<RequestContext>() {
            return Ok(context.clone());
        }

        let context = resolve(&parts.headers, state).await?;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}
