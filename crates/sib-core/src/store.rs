//! The `SocialStore` trait — the storage gateway behind the domain services.
//!
//! The trait is implemented by storage backends (e.g. `sib-store-sqlite`).
//! Implementations hold no business logic: each method is one parameterized
//! query, or one multi-statement unit of work that is atomic by contract.
//! There is no non-transactional variant of any compound mutation.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::{
  post::{Comment, CommentView, Post, PostView},
  query::{FeedQuery, FriendQuery},
  user::{Credential, Profile, User},
};

pub trait SocialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a fully-built user row. Uniqueness of email/phone is enforced
  /// by the backend.
  fn insert_user(
    &self,
    user: User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a user by id. Returns `None` if not found.
  fn user_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Fetch a user by an exact credential match in the slot the credential's
  /// kind names. Returns `None` if no user holds it.
  fn user_by_credential<'a>(
    &'a self,
    credential: &'a Credential,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Overwrite a user's mutable profile fields (display name and the opaque
  /// image reference).
  fn update_profile(
    &self,
    user_id: Uuid,
    name: String,
    image_url: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fill the credential slot the credential's kind names. Callers must have
  /// checked the slot is empty; uniqueness is enforced by the backend.
  fn link_credential(
    &self,
    user_id: Uuid,
    credential: Credential,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Friendship edges ──────────────────────────────────────────────────

  /// Existence check of the directed edge `a → b`.
  fn edge_exists(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically insert both directed edge rows for `{a, b}` and increment
  /// both users' friend counters by exactly 1.
  ///
  /// Returns `Ok(false)` without side effects if the edge already exists
  /// (the insert lost a race); callers treat that as the conflict outcome.
  fn create_friendship(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Atomically delete both directed edge rows for `{a, b}` and decrement
  /// both users' friend counters by exactly 1.
  ///
  /// Returns `Ok(false)` without side effects if no edge was present.
  fn delete_friendship(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One page of the friend listing for `viewer`, plus the total count over
  /// the same filter predicate before pagination.
  fn friends_page<'a>(
    &'a self,
    viewer: Uuid,
    query: &'a FriendQuery,
  ) -> impl Future<Output = Result<(Vec<Profile>, u64), Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Atomically persist a post row plus all of its tag rows. An empty tag
  /// list writes only the post row.
  fn insert_post(
    &self,
    post: Post,
    tags: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a post by id. Returns `None` if not found.
  fn post_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// One page of posts visible to `viewer` (their own plus their friends'),
  /// newest first, with authors denormalized; plus the pre-pagination total.
  fn posts_page<'a>(
    &'a self,
    viewer: Uuid,
    query: &'a FeedQuery,
  ) -> impl Future<Output = Result<(Vec<PostView>, u64), Self::Error>> + Send + 'a;

  /// Bulk-fetch all comments for the given posts, keyed by post id, each
  /// list newest-first, authors denormalized. Never called with an empty id
  /// set.
  fn comments_for_posts<'a>(
    &'a self,
    post_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<HashMap<Uuid, Vec<CommentView>>, Self::Error>>
  + Send
  + 'a;

  /// Bulk-fetch all tags for the given posts, keyed by post id, each list in
  /// lexical order. Never called with an empty id set.
  fn tags_for_posts<'a>(
    &'a self,
    post_ids: &'a [Uuid],
  ) -> impl Future<Output = Result<HashMap<Uuid, Vec<String>>, Self::Error>>
  + Send
  + 'a;

  /// Append a single comment row.
  fn insert_comment(
    &self,
    comment: Comment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
