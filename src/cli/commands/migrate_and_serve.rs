use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::{connect, run_migrations};
use super::serve::listen;
use crate::config::{Settings, initialize_app_state};

pub async fn migrate_and_serve(settings: Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", settings.database_url);

    let db = connect(&settings.database_url).await?;
    run_migrations(&db).await?;
    drop(db);

    let bind_address = settings.bind_address.clone();
    let state = match initialize_app_state(settings).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    listen(state, &bind_address).await
}
