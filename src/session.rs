//! Server-side session table.
//!
//! The cookie only carries an opaque id. Each entry remembers the password
//! hash the account had when the session was issued, so replacing the hash
//! invalidates every session created before the change.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use model::entities::account;
use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE_NAME: &str = "designdesk_session";

#[derive(Debug, Clone)]
pub struct SessionData {
    pub account_id: i32,
    /// Password hash of the account at issue time.
    pub auth_hash: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    /// A session stays valid while the account still has the hash it was
    /// issued against.
    pub fn matches(&self, account: &account::Model) -> bool {
        self.account_id == account.id && self.auth_hash == account.password_hash
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Cache<String, SessionData>,
    ttl: Duration,
}

impl SessionStore {
    /// Sessions leave the table only when they expire or are removed, never
    /// to make room for new ones.
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder().time_to_live(ttl).build();
        Self { sessions, ttl }
    }

    /// Start a session for `account` and return its id.
    pub async fn create(&self, account: &account::Model) -> String {
        let session_id = Uuid::new_v4().to_string();
        let data = SessionData {
            account_id: account.id,
            auth_hash: account.password_hash.clone(),
            created_at: Utc::now(),
        };
        self.sessions.insert(session_id.clone(), data).await;
        debug!("Started session for account {}", account.id);
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionData> {
        self.sessions.get(session_id).await
    }

    pub async fn remove(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }

    /// Replace `session_id` with a fresh session bound to the account's
    /// current hash.
    pub async fn rotate(&self, session_id: &str, account: &account::Model) -> String {
        self.remove(session_id).await;
        self.create(account).await
    }

    pub fn cookie(&self, session_id: String, secure: bool) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.ttl.as_secs() as i64);
        Cookie::build((SESSION_COOKIE_NAME, session_id))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .path("/")
            .build()
    }
}

/// Cookie that makes the browser drop the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}

pub fn session_id_from(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Role;

    fn account(id: i32, hash: &str) -> account::Model {
        let now = Utc::now();
        account::Model {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            password_hash: hash.to_string(),
            role: Role::Client,
            bio: String::new(),
            profile_picture: None,
            social_links: None,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_session_is_bound_to_password_hash() {
        let store = SessionStore::new(Duration::from_secs(60));
        let alice = account(1, "hash-one");

        let session_id = store.create(&alice).await;
        let session = store.get(&session_id).await.unwrap();
        assert!(session.matches(&alice));

        let rehashed = account(1, "hash-two");
        assert!(!session.matches(&rehashed));
        assert!(!session.matches(&account(2, "hash-one")));
    }

    #[tokio::test]
    async fn test_rotate_replaces_the_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let alice = account(1, "hash-one");
        let old_id = store.create(&alice).await;

        let rehashed = account(1, "hash-two");
        let new_id = store.rotate(&old_id, &rehashed).await;

        assert_ne!(old_id, new_id);
        assert!(store.get(&old_id).await.is_none());
        assert!(store.get(&new_id).await.unwrap().matches(&rehashed));
    }

    #[tokio::test]
    async fn test_every_new_session_is_kept() {
        let store = SessionStore::new(Duration::from_secs(60));
        let alice = account(1, "hash-one");

        let mut ids = Vec::new();
        for _ in 0..2_000 {
            ids.push(store.create(&alice).await);
        }
        store.sessions.run_pending_tasks().await;

        for id in &ids {
            assert!(store.get(id).await.is_some());
        }
        assert_eq!(store.sessions.entry_count(), 2_000);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let cookie = store.cookie("abc".to_string(), true);

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
