use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};
use utoipa::ToSchema;

use crate::context::RequestContext;
use crate::schemas::{AccountSummary, ApiResponse};

pub const SITE_NAME: &str = "DesignDesk";

/// Landing page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HomePage {
    pub site_name: String,
    /// The signed-in visitor, if any
    pub account: Option<AccountSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AboutPage {
    pub title: String,
    pub body: String,
}

/// Home page
#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses(
        (status = 200, description = "Home page", body = ApiResponse<HomePage>)
    )
)]
#[instrument(skip(context))]
pub async fn home(context: RequestContext) -> Json<ApiResponse<HomePage>> {
    trace!("Rendering home page");
    let page = HomePage {
        site_name: SITE_NAME.to_string(),
        account: context.account.map(AccountSummary::from),
    };
    Json(ApiResponse::ok(page, "Home"))
}

/// About the studio
#[utoipa::path(
    get,
    path = "/about_us/",
    tag = "pages",
    responses(
        (status = 200, description = "About page", body = ApiResponse<AboutPage>)
    )
)]
#[instrument]
pub async fn about_us() -> Json<ApiResponse<AboutPage>> {
    let page = AboutPage {
        title: format!("About {}", SITE_NAME),
        body: "We are an independent design studio. Clients place orders for brand, \
               print and web work; our designers share their portfolio and talk \
               craft with everyone in the discussion forum."
            .to_string(),
    };
    Json(ApiResponse::ok(page, "About us"))
}
