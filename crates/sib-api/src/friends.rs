//! Handlers for `/v1/friend` endpoints.
//!
//! | Method   | Path         | Notes |
//! |----------|--------------|-------|
//! | `GET`    | `/v1/friend` | User directory from the caller's viewpoint |
//! | `POST`   | `/v1/friend` | Body: `{"user_id":"<uuid>"}` |
//! | `DELETE` | `/v1/friend` | Body: `{"user_id":"<uuid>"}` |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use serde::Deserialize;
use sib_core::{
  query::{FriendQuery, FriendSort, Page, SortOrder},
  store::SocialStore,
  user::Profile,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::{Error, Result},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
  pub only_friends: bool,
  pub search:       Option<String>,
  pub sort:         FriendSort,
  pub order:        SortOrder,
  pub limit:        Option<i64>,
  pub offset:       Option<i64>,
}

/// `GET /v1/friend` — list users for the caller: everyone except the caller,
/// or only friends with `only_friends=true`; filterable, sortable, paginated.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Profile>>>
where
  S: SocialStore + Clone + 'static,
{
  let query = FriendQuery {
    only_friends: params.only_friends,
    search:       params.search,
    sort:         params.sort,
    order:        params.order,
    limit:        params.limit,
    offset:       params.offset,
  };

  let page = state.graph.list_friends(caller.user.user_id, &query).await?;
  Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct FriendBody {
  pub user_id: String,
}

/// `POST /v1/friend` — create a friendship between the caller and `user_id`.
pub async fn add<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<FriendBody>,
) -> Result<StatusCode>
where
  S: SocialStore + Clone + 'static,
{
  let target = parse_user_id(&body.user_id)?;
  state.graph.add_friend(caller.user.user_id, target).await?;
  Ok(StatusCode::OK)
}

/// `DELETE /v1/friend` — remove the friendship between the caller and
/// `user_id`.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<FriendBody>,
) -> Result<StatusCode>
where
  S: SocialStore + Clone + 'static,
{
  let target = parse_user_id(&body.user_id)?;
  state
    .graph
    .remove_friend(caller.user.user_id, target)
    .await?;
  Ok(StatusCode::OK)
}

fn parse_user_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| {
    Error::Core(sib_core::Error::InvalidArgument(format!(
      "not a user id: {raw:?}"
    )))
  })
}
