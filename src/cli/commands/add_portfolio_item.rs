use anyhow::{Result, bail};
use model::entities::portfolio_item;
use sea_orm::{ActiveModelTrait, Set};
use tracing::{info, trace};

use super::initdb::connect;

/// Insert one catalog entry. The catalog has no write routes, so this is
/// how administrators manage it.
pub async fn add_portfolio_item(
    database_url: &str,
    title: &str,
    description: &str,
    image: &str,
) -> Result<()> {
    trace!("Entering add_portfolio_item function");

    if title.trim().is_empty() {
        bail!("title must not be empty");
    }
    if title.trim().chars().count() > 255 {
        bail!("title must be at most 255 characters");
    }
    if image.trim().is_empty() {
        bail!("image must not be empty");
    }

    let db = connect(database_url).await?;
    let item = portfolio_item::ActiveModel {
        title: Set(title.trim().to_string()),
        description: Set(description.to_string()),
        image: Set(image.trim().to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    info!("Added portfolio item {} ({})", item.id, item.title);
    println!("Added portfolio item {}: {}", item.id, item.title);
    Ok(())
}
