//! Handlers for `/v1/post` endpoints.
//!
//! | Method | Path               | Notes |
//! |--------|--------------------|-------|
//! | `GET`  | `/v1/post`         | The caller's feed; `tags` is comma-separated |
//! | `POST` | `/v1/post`         | Body: `{"body": "...", "tags": [...]}` |
//! | `POST` | `/v1/post/comment` | Body: `{"post_id": "...", "body": "..."}` |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sib_core::{
  feed::FeedItem,
  query::{FeedQuery, Page},
  store::SocialStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::{Error, Result},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedParams {
  /// Comma-separated tag list; a post matches if it carries any of them.
  pub tags:   Option<String>,
  pub search: Option<String>,
  pub limit:  Option<i64>,
  pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
  /// Raw text; escaped server-side before persistence.
  pub body: String,
  /// Required, but may be empty.
  pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
  pub post_id: String,
  pub body:    String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub body_html:  String,
  pub tags:       Vec<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_post_body(body: &str) -> Result<()> {
  if body.len() < 2 || body.len() > 500 {
    return Err(Error::Validation("body must be 2 to 500 characters".into()));
  }
  Ok(())
}

fn validate_comment_body(body: &str) -> Result<()> {
  if body.len() < 2 || body.len() > 500 {
    return Err(Error::Validation(
      "comment must be 2 to 500 characters".into(),
    ));
  }
  Ok(())
}

fn split_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

fn parse_post_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| {
    Error::Core(sib_core::Error::InvalidArgument(format!(
      "not a post id: {raw:?}"
    )))
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /v1/post` — one page of the caller's feed: own posts and friends'
/// posts, newest first, with comments and tags attached.
pub async fn feed<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<FeedParams>,
) -> Result<Json<Page<FeedItem>>>
where
  S: SocialStore + Clone + 'static,
{
  let query = FeedQuery {
    tags:   params.tags.as_deref().map(split_tags).unwrap_or_default(),
    search: params.search,
    limit:  params.limit,
    offset: params.offset,
  };

  let page = state.feed.list_feed(caller.user.user_id, &query).await?;
  Ok(Json(page))
}

/// `POST /v1/post` — create a post. The response carries the escaped body
/// and the normalized (sorted, deduplicated) tags.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + Clone + 'static,
{
  validate_post_body(&body.body)?;

  let (post, tags) = state
    .feed
    .create_post(caller.user.user_id, &body.body, body.tags)
    .await?;

  Ok((
    StatusCode::CREATED,
    Json(PostResponse {
      post_id:    post.post_id,
      author_id:  post.author_id,
      body_html:  post.body_html,
      tags,
      created_at: post.created_at,
    }),
  ))
}

/// `POST /v1/post/comment` — comment on a post the caller can see.
pub async fn comment<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CommentBody>,
) -> Result<Json<CommentResponse>>
where
  S: SocialStore + Clone + 'static,
{
  validate_comment_body(&body.body)?;
  let post_id = parse_post_id(&body.post_id)?;

  let comment = state
    .feed
    .add_comment(caller.user.user_id, post_id, &body.body)
    .await?;

  Ok(Json(CommentResponse {
    comment_id: comment.comment_id,
    post_id:    comment.post_id,
    author_id:  comment.author_id,
    body:       comment.body,
    created_at: comment.created_at,
  }))
}
