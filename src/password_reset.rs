//! Single-use password reset tokens and the hand-off to mail delivery.

use std::fmt::Debug;
use std::time::Duration;

use model::entities::account;
use moka::future::Cache;
use tracing::info;
use uuid::Uuid;

const RESET_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Delivers a reset link to the owner of an email address.
///
/// Actual mail transport lives outside this service.
pub trait ResetMailer: Send + Sync + Debug {
    fn send_reset_link(&self, email: &str, username: &str, link: &str);
}

/// Writes reset links to the log instead of sending mail.
#[derive(Debug, Default)]
pub struct LogMailer;

impl ResetMailer for LogMailer {
    fn send_reset_link(&self, email: &str, username: &str, link: &str) {
        info!(email, username, link, "Password reset link issued");
    }
}

/// What a reset token was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetGrant {
    pub account_id: i32,
    /// Password hash of the account at issue time.
    pub auth_hash: String,
}

impl ResetGrant {
    /// Any password change since issue voids the grant.
    pub fn matches(&self, account: &account::Model) -> bool {
        self.account_id == account.id && self.auth_hash == account.password_hash
    }
}

/// Outstanding reset tokens.
#[derive(Debug, Clone)]
pub struct ResetTokenStore {
    tokens: Cache<String, ResetGrant>,
}

impl Default for ResetTokenStore {
    fn default() -> Self {
        Self::new(RESET_TOKEN_TTL)
    }
}

impl ResetTokenStore {
    pub fn new(ttl: Duration) -> Self {
        let tokens = Cache::builder().time_to_live(ttl).build();
        Self { tokens }
    }

    pub async fn issue(&self, account: &account::Model) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let grant = ResetGrant {
            account_id: account.id,
            auth_hash: account.password_hash.clone(),
        };
        self.tokens.insert(token.clone(), grant).await;
        token
    }

    /// The grant behind a token, without using the token up.
    pub async fn peek(&self, token: &str) -> Option<ResetGrant> {
        self.tokens.get(token).await
    }

    /// Use the token up.
    pub async fn consume(&self, token: &str) -> Option<ResetGrant> {
        self.tokens.remove(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
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
    async fn test_tokens_are_single_use() {
        let store = ResetTokenStore::default();
        let token = store.issue(&account(7, "hash-one")).await;

        assert_eq!(store.peek(&token).await.map(|g| g.account_id), Some(7));
        assert_eq!(store.peek(&token).await.map(|g| g.account_id), Some(7));
        assert_eq!(store.consume(&token).await.map(|g| g.account_id), Some(7));
        assert_eq!(store.consume(&token).await, None);
        assert_eq!(store.peek(&token).await, None);
    }

    #[tokio::test]
    async fn test_grant_is_bound_to_password_hash() {
        let store = ResetTokenStore::default();
        let token = store.issue(&account(7, "hash-one")).await;
        let grant = store.peek(&token).await.unwrap();

        assert!(grant.matches(&account(7, "hash-one")));
        assert!(!grant.matches(&account(7, "hash-two")));
        assert!(!grant.matches(&account(8, "hash-one")));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = ResetTokenStore::default();
        assert_eq!(store.peek("nope").await, None);
    }
}
