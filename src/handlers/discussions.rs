//! Discussion forum.
//!
//! Any signed-in account may open a discussion or comment on one. The author
//! of every post is the caller; the discussion a comment belongs to comes
//! from the URL. Neither is ever read from the submitted form.

use axum::{
    extract::{Extension, Path, State},
    response::{Json, Redirect},
    Form,
};
use chrono::{DateTime, Utc};
use model::entities::{account, comment, discussion};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::context::CurrentAccount;
use crate::error::{AppError, FormErrors, Result};
use crate::schemas::{ApiResponse, AppState, FormPage};

#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default)]
pub struct DiscussionForm {
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub topic: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscussionSummary {
    pub id: i32,
    pub topic: String,
    pub description: String,
    pub author_id: i32,
    /// Username of the author
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl DiscussionSummary {
    fn new(model: discussion::Model, author: Option<account::Model>) -> Self {
        Self {
            id: model.id,
            topic: model.topic,
            description: model.description,
            author_id: model.author_id,
            author: author.map(|a| a.username).unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub content: String,
    pub author_id: i32,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    fn new(model: comment::Model, author: Option<account::Model>) -> Self {
        Self {
            id: model.id,
            content: model.content,
            author_id: model.author_id,
            author: author.map(|a| a.username).unwrap_or_default(),
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscussionListPage {
    pub discussions: Vec<DiscussionSummary>,
    /// Form for opening a new discussion
    pub form: FormPage,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscussionDetailPage {
    pub discussion: DiscussionSummary,
    /// Comments in the order they were written
    pub comments: Vec<CommentResponse>,
    /// Form for adding a comment
    pub form: FormPage,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddCommentPage {
    pub discussion: DiscussionSummary,
    pub form: FormPage,
}

fn comment_form(action: String) -> FormPage {
    FormPage::new("Add a comment", action, &["content"])
}

async fn find_discussion(db: &DatabaseConnection, discussion_id: i32) -> Result<DiscussionSummary> {
    let (discussion, author) = discussion::Entity::find_by_id(discussion_id)
        .find_also_related(account::Entity)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Discussion {}", discussion_id)))?;
    Ok(DiscussionSummary::new(discussion, author))
}

/// Store a comment by `caller` on `discussion_id` and send the caller back
/// to the thread.
async fn post_comment(
    state: &AppState,
    caller: &CurrentAccount,
    discussion_id: i32,
    form: CommentForm,
) -> Result<Redirect> {
    let mut errors = FormErrors::new();
    errors.require("content", &form.content);
    errors.finish()?;

    if discussion::Entity::find_by_id(discussion_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!("Discussion {}", discussion_id)));
    }

    let new_comment = comment::ActiveModel {
        discussion_id: Set(discussion_id),
        author_id: Set(caller.account.id),
        content: Set(form.content),
        ..Default::default()
    };
    let comment = new_comment.insert(&state.db).await?;
    info!(
        "Account {} commented on discussion {} (comment {})",
        caller.account.id, discussion_id, comment.id
    );

    Ok(Redirect::to(&format!("/discussions/{}/", discussion_id)))
}

/// List all discussions
#[utoipa::path(
    get,
    path = "/discussions/",
    tag = "discussions",
    responses(
        (status = 200, description = "Every discussion with its author", body = ApiResponse<DiscussionListPage>),
        (status = 303, description = "Not signed in; redirect to sign-in")
    )
)]
#[instrument(skip(state))]
pub async fn list_discussions(State(state): State<AppState>) -> Result<Json<ApiResponse<DiscussionListPage>>> {
    trace!("Entering list_discussions function");

    let discussions = discussion::Entity::find()
        .find_also_related(account::Entity)
        .order_by_asc(discussion::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} discussions", discussions.len());

    let page = DiscussionListPage {
        discussions: discussions
            .into_iter()
            .map(|(discussion, author)| DiscussionSummary::new(discussion, author))
            .collect(),
        form: FormPage::new("Start a discussion", "/discussions/", &["topic", "description"]),
    };
    Ok(Json(ApiResponse::ok(page, "Discussions retrieved successfully")))
}

/// Open a new discussion
#[utoipa::path(
    post,
    path = "/discussions/",
    tag = "discussions",
    request_body(content = DiscussionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Discussion opened; redirect to it"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, form), fields(account_id = caller.account.id))]
pub async fn start_discussion(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Form(form): Form<DiscussionForm>,
) -> Result<Redirect> {
    let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();
    errors.require("topic", &form.topic);
    errors.require("description", &form.description);
    errors.finish()?;

    let new_discussion = discussion::ActiveModel {
        topic: Set(form.topic),
        description: Set(form.description),
        author_id: Set(caller.account.id),
        ..Default::default()
    };
    let discussion = new_discussion.insert(&state.db).await?;
    info!("Account {} opened discussion {}", caller.account.id, discussion.id);

    Ok(Redirect::to(&format!("/discussions/{}/", discussion.id)))
}

/// Get a discussion and its comments
#[utoipa::path(
    get,
    path = "/discussions/{discussion_id}/",
    tag = "discussions",
    params(
        ("discussion_id" = i32, Path, description = "Discussion ID")
    ),
    responses(
        (status = 200, description = "Discussion with its comments", body = ApiResponse<DiscussionDetailPage>),
        (status = 404, description = "Discussion not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_discussion(
    State(state): State<AppState>,
    Path(discussion_id): Path<i32>,
) -> Result<Json<ApiResponse<DiscussionDetailPage>>> {
    let discussion = find_discussion(&state.db, discussion_id).await?;

    let comments = comment::Entity::find_in_thread(discussion_id)
        .find_also_related(account::Entity)
        .all(&state.db)
        .await?;
    debug!("Discussion {} has {} comments", discussion_id, comments.len());

    let page = DiscussionDetailPage {
        discussion,
        comments: comments
            .into_iter()
            .map(|(comment, author)| CommentResponse::new(comment, author))
            .collect(),
        form: comment_form(format!("/discussions/{}/", discussion_id)),
    };
    Ok(Json(ApiResponse::ok(page, "Discussion retrieved successfully")))
}

/// Comment on a discussion from its detail page
#[utoipa::path(
    post,
    path = "/discussions/{discussion_id}/",
    tag = "discussions",
    params(
        ("discussion_id" = i32, Path, description = "Discussion ID")
    ),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Comment added; redirect back to the discussion"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Discussion not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, form), fields(account_id = caller.account.id))]
pub async fn comment_on_discussion(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Path(discussion_id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect> {
    post_comment(&state, &caller, discussion_id, form).await
}

/// Standalone comment form for a discussion
#[utoipa::path(
    get,
    path = "/add_comment/{discussion_id}/",
    tag = "discussions",
    params(
        ("discussion_id" = i32, Path, description = "Discussion ID")
    ),
    responses(
        (status = 200, description = "Comment form", body = ApiResponse<AddCommentPage>),
        (status = 404, description = "Discussion not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_comment_page(
    State(state): State<AppState>,
    Path(discussion_id): Path<i32>,
) -> Result<Json<ApiResponse<AddCommentPage>>> {
    let discussion = find_discussion(&state.db, discussion_id).await?;
    let page = AddCommentPage {
        discussion,
        form: comment_form(format!("/add_comment/{}/", discussion_id)),
    };
    Ok(Json(ApiResponse::ok(page, "Add a comment")))
}

/// Submit the standalone comment form
#[utoipa::path(
    post,
    path = "/add_comment/{discussion_id}/",
    tag = "discussions",
    params(
        ("discussion_id" = i32, Path, description = "Discussion ID")
    ),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Comment added; redirect to the discussion"),
        (status = 400, description = "Invalid form", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Discussion not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, caller, form), fields(account_id = caller.account.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentAccount>,
    Path(discussion_id): Path<i32>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect> {
    post_comment(&state, &caller, discussion_id, form).await
}
