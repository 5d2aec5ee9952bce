use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;

use crate::password_reset::{LogMailer, ResetTokenStore};
use crate::schemas::AppState;
use crate::session::SessionStore;

/// Django's default session lifetime: two weeks.
const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Runtime settings, layered from defaults and `DESIGNDESK_*` environment
/// variables. CLI arguments override individual values.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub session_ttl_secs: u64,
    /// Mark the session cookie `Secure`; enable behind HTTPS.
    pub secure_cookies: bool,
    /// Base URL used when building links sent by mail.
    pub public_url: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("database_url", "sqlite://designdesk.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("session_ttl_secs", DEFAULT_SESSION_TTL_SECS)?
            .set_default("secure_cookies", false)?
            .set_default("public_url", "http://localhost:3000")?
            .add_source(Environment::with_prefix("DESIGNDESK").try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Initialize application state against the configured database
pub async fn initialize_app_state(settings: Settings) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    Ok(AppState {
        db,
        sessions: SessionStore::new(settings.session_ttl()),
        reset_tokens: ResetTokenStore::default(),
        mailer: Arc::new(LogMailer),
        settings: Arc::new(settings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_environment() {
        let settings = Settings::load().expect("defaults should deserialize");
        assert!(!settings.bind_address.is_empty());
        assert!(settings.session_ttl_secs > 0);
        assert_eq!(settings.session_ttl(), Duration::from_secs(settings.session_ttl_secs));
    }
}
