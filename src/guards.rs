//! Route guards.
//!
//! Gated routers stack `require_role` under `require_login`, so a request
//! is always authenticated before its role is checked.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use model::Role;
use tracing::{debug, warn};

use crate::context::{CurrentAccount, RequestContext};

pub const SIGN_IN_PATH: &str = "/sign_in/";
pub const HOME_PATH: &str = "/";

/// Send anonymous callers to the sign-in page, remembering where they were
/// going. Signed-in callers continue with a `CurrentAccount` extension.
pub async fn require_login(context: RequestContext, mut request: Request, next: Next) -> Response {
    match (context.account, context.session_id) {
        (Some(account), Some(session_id)) => {
            request
                .extensions_mut()
                .insert(CurrentAccount { account, session_id });
            next.run(request).await
        }
        _ => {
            let target = request
                .uri()
                .path_and_query()
                .map_or_else(|| request.uri().path(), |pq| pq.as_str());
            debug!("Anonymous request to {} redirected to sign-in", target);
            Redirect::to(&sign_in_url(target)).into_response()
        }
    }
}

/// Let the request through only when the caller holds `role`. Anyone else is
/// quietly sent to the home page.
pub async fn require_role(State(role): State<Role>, request: Request, next: Next) -> Response {
    let Some(caller) = request.extensions().get::<CurrentAccount>() else {
        warn!("Role guard reached without a signed-in caller");
        return Redirect::to(SIGN_IN_PATH).into_response();
    };

    if caller.account.has_role(role) {
        next.run(request).await
    } else {
        debug!(
            "Account {} ({}) denied {} route {}",
            caller.account.id,
            caller.account.role,
            role,
            request.uri().path()
        );
        Redirect::to(HOME_PATH).into_response()
    }
}

/// Sign-in page that returns to `next` afterwards.
pub fn sign_in_url(next: &str) -> String {
    format!("{}?next={}", SIGN_IN_PATH, urlencoding::encode(next))
}

/// Only local paths are honoured as a post-sign-in destination.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") => {
            path
        }
        _ => HOME_PATH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/orders/3/")), "/orders/3/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_sign_in_url_encodes_path_and_query() {
        assert_eq!(sign_in_url("/orders/"), "/sign_in/?next=%2Forders%2F");
        assert_eq!(
            sign_in_url("/discussions/?topic=a b&x=1"),
            "/sign_in/?next=%2Fdiscussions%2F%3Ftopic%3Da%20b%26x%3D1"
        );
    }
}
