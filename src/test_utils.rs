#[cfg(test)]
pub mod test_utils {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::config::Settings;
    use crate::password_reset::{ResetMailer, ResetTokenStore};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::session::{SESSION_COOKIE_NAME, SessionStore};
    use axum::Router;
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::{TestResponse, TestServer};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use serde::Serialize;
    use tracing_subscriber::EnvFilter;

    /// Satisfies every password rule for the usernames used in tests.
    pub const TEST_PASSWORD: &str = "kerning-matters-42";

    /// A reset link handed to the mailer.
    #[derive(Debug, Clone)]
    pub struct SentLink {
        pub email: String,
        pub username: String,
        pub link: String,
    }

    /// Keeps reset links in memory so tests can follow them.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMailer {
        sent: Arc<Mutex<Vec<SentLink>>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<SentLink> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl ResetMailer for RecordingMailer {
        fn send_reset_link(&self, email: &str, username: &str, link: &str) {
            self.sent.lock().unwrap().push(SentLink {
                email: email.to_string(),
                username: username.to_string(),
                link: link.to_string(),
            });
        }
    }

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    pub fn test_settings() -> Settings {
        Settings {
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            session_ttl_secs: 3600,
            secure_cookies: false,
            public_url: "http://designdesk.test".to_string(),
        }
    }

    /// Create AppState for testing, delivering reset links to `mailer`
    pub async fn setup_test_app_state(mailer: RecordingMailer) -> AppState {
        let db = setup_test_db().await;
        let settings = test_settings();

        AppState {
            db,
            sessions: SessionStore::new(Duration::from_secs(settings.session_ttl_secs)),
            reset_tokens: ResetTokenStore::default(),
            mailer: Arc::new(mailer),
            settings: Arc::new(settings),
        }
    }

    /// Route logs to the test harness. `RUST_LOG` picks the level, `warn` otherwise.
    pub fn init_test_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        init_test_tracing();
        let state = setup_test_app_state(RecordingMailer::default()).await;
        create_router(state)
    }

    /// A test server plus direct handles on its state and outgoing mail.
    pub async fn setup_test_server() -> (TestServer, AppState, RecordingMailer) {
        init_test_tracing();
        let mailer = RecordingMailer::default();
        let state = setup_test_app_state(mailer.clone()).await;
        let server = TestServer::new(create_router(state.clone())).unwrap();
        (server, state, mailer)
    }

    /// Where a redirect response points.
    pub fn location(response: &TestResponse) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .expect("response has no Location header")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// The `Cookie` header value that replays the session set by `response`.
    pub fn session_cookie(response: &TestResponse) -> HeaderValue {
        let prefix = format!("{}=", SESSION_COOKIE_NAME);
        let pair = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(&prefix))
            .and_then(|value| value.split(';').next())
            .expect("response did not set a session cookie")
            .to_string();
        HeaderValue::from_str(&pair).unwrap()
    }

    #[derive(Serialize)]
    struct SignUp<'a> {
        username: &'a str,
        email: String,
        password1: &'a str,
        password2: &'a str,
        role: &'a str,
    }

    /// Register `username` with `role` and return its session cookie.
    pub async fn sign_up(server: &TestServer, username: &str, role: &str) -> HeaderValue {
        let response = server
            .post("/sign_up/")
            .form(&SignUp {
                username,
                email: format!("{}@example.com", username),
                password1: TEST_PASSWORD,
                password2: TEST_PASSWORD,
                role,
            })
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        session_cookie(&response)
    }

    /// Sign in again with `password` and return the new session cookie.
    pub async fn sign_in(server: &TestServer, username: &str, password: &str) -> HeaderValue {
        let response = server
            .post("/sign_in/")
            .form(&[("username", username), ("password", password)])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        session_cookie(&response)
    }
}
