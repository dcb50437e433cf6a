//! JSON HTTP layer for the social graph service.
//!
//! Exposes an axum [`Router`] backed by any [`SocialStore`]:
//!
//! | Method   | Path                   | Auth | Handler |
//! |----------|------------------------|------|---------|
//! | `POST`   | `/v1/user/register`    | no   | [`users::register`] |
//! | `POST`   | `/v1/user/login`       | yes  | [`users::login`] |
//! | `POST`   | `/v1/user/link/{kind}` | yes  | [`users::link`] |
//! | `PATCH`  | `/v1/user`             | yes  | [`users::update`] |
//! | `GET`    | `/v1/friend`           | yes  | [`friends::list`] |
//! | `POST`   | `/v1/friend`           | yes  | [`friends::add`] |
//! | `DELETE` | `/v1/friend`           | yes  | [`friends::remove`] |
//! | `GET`    | `/v1/post`             | yes  | [`posts::feed`] |
//! | `POST`   | `/v1/post`             | yes  | [`posts::create`] |
//! | `POST`   | `/v1/post/comment`     | yes  | [`posts::comment`] |
//!
//! Authenticated routes take HTTP Basic credentials; the username is the
//! caller's email or phone credential. Login is simply an authenticated
//! fetch of the caller's own account.

pub mod auth;
pub mod error;
pub mod friends;
pub mod posts;
pub mod users;

use std::path::PathBuf;

use axum::{
  Router,
  routing::{get, patch, post},
};
use serde::Deserialize;
use sib_core::{
  accounts::Accounts, feed::FeedAggregator, graph::FriendGraph,
  store::SocialStore,
};

pub use error::Error;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers: the three domain
/// services, each holding its own handle to the store.
#[derive(Clone)]
pub struct AppState<S: SocialStore> {
  pub accounts: Accounts<S>,
  pub graph:    FriendGraph<S>,
  pub feed:     FeedAggregator<S>,
}

impl<S: SocialStore + Clone> AppState<S> {
  pub fn new(store: S) -> Self {
    Self {
      accounts: Accounts::new(store.clone()),
      graph:    FriendGraph::new(store.clone()),
      feed:     FeedAggregator::new(store),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] serving the social API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SocialStore + Clone + 'static,
{
  Router::new()
    .route("/v1/user/register", post(users::register::<S>))
    .route("/v1/user/login", post(users::login))
    .route("/v1/user/link/{kind}", post(users::link::<S>))
    .route("/v1/user", patch(users::update::<S>))
    .route(
      "/v1/friend",
      get(friends::list::<S>)
        .post(friends::add::<S>)
        .delete(friends::remove::<S>),
    )
    .route("/v1/post", get(posts::feed::<S>).post(posts::create::<S>))
    .route("/v1/post/comment", post(posts::comment::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use serde_json::{Value, json};
  use sib_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    AppState::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn auth_header(username: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{username}:{pass}")))
  }

  async fn oneshot_req(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    auth:   Option<&str>,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(a) = auth {
      builder = builder.header(header::AUTHORIZATION, a);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    if bytes.is_empty() {
      return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Register a user and return the response body. Panics on non-201.
  async fn register(
    state:    &AppState<SqliteStore>,
    name:     &str,
    kind:     &str,
    value:    &str,
    password: &str,
  ) -> Value {
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/register",
      None,
      Some(json!({
        "credential_kind":  kind,
        "credential_value": value,
        "name":             name,
        "password":         password,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }

  async fn befriend(state: &AppState<SqliteStore>, auth: &str, target: &str) {
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/friend",
      Some(auth),
      Some(json!({ "user_id": target })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  async fn create_post(
    state: &AppState<SqliteStore>,
    auth:  &str,
    body:  &str,
    tags:  Value,
  ) -> Value {
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post",
      Some(auth),
      Some(json!({ "body": body, "tags": tags })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }

  // ── Registration ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_the_account_without_secrets() {
    let state = make_state().await;
    let body =
      register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
        .await;

    assert_eq!(body["name"], "Alice Mercer");
    assert_eq!(body["email"], "alice@mail.com");
    assert_eq!(body["phone"], Value::Null);
    assert_eq!(body["friend_count"], 0);
    assert!(body["user_id"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
  }

  #[tokio::test]
  async fn register_rejects_invalid_input() {
    let state = make_state().await;

    let cases = [
      json!({ "credential_kind": "email", "credential_value": "a@mail.com",
              "name": "Bea", "password": "secret" }),
      json!({ "credential_kind": "email", "credential_value": "not-an-email",
              "name": "Alice Mercer", "password": "secret" }),
      json!({ "credential_kind": "phone", "credential_value": "081234",
              "name": "Alice Mercer", "password": "secret" }),
      json!({ "credential_kind": "email", "credential_value": "a@mail.com",
              "name": "Alice Mercer", "password": "pw" }),
      json!({ "credential_kind": "username", "credential_value": "alice",
              "name": "Alice Mercer", "password": "secret" }),
    ];
    for case in cases {
      let resp = oneshot_req(
        state.clone(),
        "POST",
        "/v1/user/register",
        None,
        Some(case.clone()),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "case: {case}");
      let body = body_json(resp).await;
      assert_eq!(body["kind"], "invalid_argument", "case: {case}");
    }
  }

  #[tokio::test]
  async fn register_conflicts_on_a_taken_credential() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/register",
      None,
      Some(json!({
        "credential_kind":  "email",
        "credential_value": "alice@mail.com",
        "name":             "Other Alice",
        "password":         "secret",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["kind"], "conflict");
  }

  // ── Login ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_returns_the_callers_account() {
    let state = make_state().await;
    let registered =
      register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
        .await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/login",
      Some(&auth_header("alice@mail.com", "secret")),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["user_id"], registered["user_id"]);
  }

  #[tokio::test]
  async fn login_with_a_phone_credential() {
    let state = make_state().await;
    register(&state, "Bobby Tables", "phone", "+6281234567", "secret").await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/login",
      Some(&auth_header("+6281234567", "secret")),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Bobby Tables");
  }

  #[tokio::test]
  async fn wrong_password_is_401_with_challenge() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/login",
      Some(&auth_header("alice@mail.com", "wrong")),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let challenge = resp
      .headers()
      .get(header::WWW_AUTHENTICATE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(challenge.contains("Basic"), "challenge: {challenge}");
  }

  #[tokio::test]
  async fn authenticated_routes_reject_anonymous_callers() {
    let state = make_state().await;
    for (method, uri) in [
      ("POST", "/v1/user/login"),
      ("PATCH", "/v1/user"),
      ("GET", "/v1/friend"),
      ("GET", "/v1/post"),
    ] {
      let resp = oneshot_req(state.clone(), method, uri, None, None).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
  }

  // ── Credential linking ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn link_fills_the_empty_slot_exactly_once() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/link/phone",
      Some(&auth),
      Some(json!({ "credential_value": "+6281234567" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["phone"], "+6281234567");

    // Both slots are now immutable.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/link/phone",
      Some(&auth),
      Some(json!({ "credential_value": "+6289999999" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/link/email",
      Some(&auth),
      Some(json!({ "credential_value": "alice2@mail.com" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn link_rejects_a_value_held_by_another_user() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    register(&state, "Bobby Tables", "phone", "+6281234567", "secret").await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/link/phone",
      Some(&auth_header("alice@mail.com", "secret")),
      Some(json!({ "credential_value": "+6281234567" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["kind"], "conflict");
  }

  #[tokio::test]
  async fn link_with_an_unknown_kind_is_404() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/link/username",
      Some(&auth_header("alice@mail.com", "secret")),
      Some(json!({ "credential_value": "alice" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Profile ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_profile_changes_name_and_image() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    let resp = oneshot_req(
      state.clone(),
      "PATCH",
      "/v1/user",
      Some(&auth),
      Some(json!({
        "name":      "Alice M. Mercer",
        "image_url": "https://cdn.example.com/alice.png",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Alice M. Mercer");
    assert_eq!(body["image_url"], "https://cdn.example.com/alice.png");

    let resp = oneshot_req(
      state.clone(),
      "PATCH",
      "/v1/user",
      Some(&auth),
      Some(json!({ "name": "Alice M. Mercer", "image_url": "not-a-url" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Friends ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn friendship_lifecycle_over_http() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let bob =
      register(&state, "Bobby Tables", "email", "bob@mail.com", "secret")
        .await;
    let bob_id = bob["user_id"].as_str().unwrap().to_string();
    let auth = auth_header("alice@mail.com", "secret");

    befriend(&state, &auth, &bob_id).await;

    // Both sides see the edge and the bumped counter.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?only_friends=true",
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["user_id"], bob_id.as_str());
    assert_eq!(page["items"][0]["friend_count"], 1);

    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?only_friends=true",
      Some(&auth_header("bob@mail.com", "secret")),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Alice Mercer");

    // Duplicate add conflicts.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": bob_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Removal works once, then reports the missing edge.
    let resp = oneshot_req(
      state.clone(),
      "DELETE",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": bob_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_req(
      state.clone(),
      "DELETE",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": bob_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?only_friends=true",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 0);
  }

  #[tokio::test]
  async fn friend_requests_are_validated() {
    let state = make_state().await;
    let alice =
      register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
        .await;
    let alice_id = alice["user_id"].as_str().unwrap().to_string();
    let auth = auth_header("alice@mail.com", "secret");

    // Self-friendship.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": alice_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown target.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": uuid::Uuid::new_v4().to_string() })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Malformed id.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/friend",
      Some(&auth),
      Some(json!({ "user_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn friend_listing_sorts_filters_and_pages() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let bob =
      register(&state, "Bobby Tables", "email", "bob@mail.com", "secret")
        .await;
    register(&state, "Carolina Reyes", "email", "carol@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    // Give Bob a nonzero friend count.
    befriend(&state, &auth, bob["user_id"].as_str().unwrap()).await;

    // Substring search over names.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?search=carol",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Carolina Reyes");

    // Ascending friend-count sort puts Carolina (0) before Bobby (1).
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?sort=friend_count&order=asc",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["items"][0]["name"], "Carolina Reyes");
    assert_eq!(page["items"][1]["name"], "Bobby Tables");

    // Pagination echoes effective values and counts the full match set.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?limit=1&offset=1",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["total"], 2);
    assert_eq!(page["limit"], 1);
    assert_eq!(page["offset"], 1);

    // Out-of-range values fall back to the defaults.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?limit=-5&offset=-2",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["limit"], 10);
    assert_eq!(page["offset"], 0);

    // Sort keys outside the whitelist are rejected.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/friend?sort=name",
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Posts and feed ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_creation_escapes_markup_and_normalizes_tags() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    let body = create_post(
      &state,
      &auth,
      "<b>hello & goodbye</b>",
      json!(["go", "db", "go"]),
    )
    .await;
    assert_eq!(body["body_html"], "&lt;b&gt;hello &amp; goodbye&lt;/b&gt;");
    assert_eq!(body["tags"], json!(["db", "go"]));
  }

  #[tokio::test]
  async fn post_body_bounds_are_enforced() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post",
      Some(&auth),
      Some(json!({ "body": "x", "tags": [] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post",
      Some(&auth),
      Some(json!({ "body": "x".repeat(501), "tags": [] })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The tags field must be present, even if empty.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post",
      Some(&auth),
      Some(json!({ "body": "hello there" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn feed_shows_own_and_friends_posts_with_comments() {
    let state = make_state().await;
    let alice =
      register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
        .await;
    register(&state, "Bobby Tables", "email", "bob@mail.com", "secret").await;
    register(&state, "Strange Rick", "email", "rick@mail.com", "secret")
      .await;
    let alice_auth = auth_header("alice@mail.com", "secret");
    let bob_auth   = auth_header("bob@mail.com", "secret");
    let rick_auth  = auth_header("rick@mail.com", "secret");

    let bob = oneshot_req(
      state.clone(),
      "POST",
      "/v1/user/login",
      Some(&bob_auth),
      None,
    )
    .await;
    let bob_id = body_json(bob).await["user_id"]
      .as_str()
      .unwrap()
      .to_string();
    befriend(&state, &alice_auth, &bob_id).await;

    let post =
      create_post(&state, &alice_auth, "hello friends", json!(["go"])).await;
    let post_id = post["post_id"].as_str().unwrap().to_string();
    create_post(&state, &rick_auth, "unrelated post", json!([])).await;

    // Bob comments on Alice's post.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post/comment",
      Some(&bob_auth),
      Some(json!({ "post_id": post_id, "body": "hello back" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Rick is a stranger to Alice: his comment is forbidden.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post/comment",
      Some(&rick_auth),
      Some(json!({ "post_id": post_id, "body": "let me in" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(resp).await["kind"], "forbidden");

    // Bob's feed carries Alice's post, with her profile, the tag list and
    // the comment; Rick's post is invisible to him.
    let resp =
      oneshot_req(state.clone(), "GET", "/v1/post", Some(&bob_auth), None)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    let item = &page["items"][0];
    assert_eq!(item["post_id"], post_id.as_str());
    assert_eq!(item["author"]["user_id"], alice["user_id"]);
    assert_eq!(item["tags"], json!(["go"]));
    assert_eq!(item["comments"][0]["body"], "hello back");
    assert_eq!(item["comments"][0]["author"]["name"], "Bobby Tables");

    // Rick sees only his own post.
    let resp =
      oneshot_req(state.clone(), "GET", "/v1/post", Some(&rick_auth), None)
        .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["body_html"], "unrelated post");
  }

  #[tokio::test]
  async fn comment_requests_are_validated() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    // Unknown post.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post/comment",
      Some(&auth),
      Some(json!({
        "post_id": uuid::Uuid::new_v4().to_string(),
        "body":    "hello there",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Malformed post id.
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post/comment",
      Some(&auth),
      Some(json!({ "post_id": "not-a-uuid", "body": "hello there" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Comment body bounds.
    let post = create_post(&state, &auth, "hello world", json!([])).await;
    let resp = oneshot_req(
      state.clone(),
      "POST",
      "/v1/post/comment",
      Some(&auth),
      Some(json!({ "post_id": post["post_id"], "body": "x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn feed_filters_by_tags_and_search() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    create_post(&state, &auth, "about databases", json!(["db"])).await;
    create_post(&state, &auth, "about compilers", json!(["lang"])).await;
    create_post(&state, &auth, "plain note", json!([])).await;

    // Comma-separated tags match any.
    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/post?tags=db,lang",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 2);

    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/post?search=compilers",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["body_html"], "about compilers");
  }

  #[tokio::test]
  async fn feed_pagination_counts_before_slicing() {
    let state = make_state().await;
    register(&state, "Alice Mercer", "email", "alice@mail.com", "secret")
      .await;
    let auth = auth_header("alice@mail.com", "secret");

    for i in 0..5 {
      create_post(&state, &auth, &format!("note number {i}"), json!([]))
        .await;
    }

    let resp = oneshot_req(
      state.clone(),
      "GET",
      "/v1/post?limit=2&offset=2",
      Some(&auth),
      None,
    )
    .await;
    let page = body_json(resp).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 2);
    // Newest first: offset 2 lands on the third-newest note.
    assert_eq!(page["items"][0]["body_html"], "note number 2");
  }
}
