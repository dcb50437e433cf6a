//! The friendship graph service — the only writer of edge rows and friend
//! counters.
//!
//! An edge is an unordered pair `{A, B}` materialized as two directed rows.
//! The service guarantees, together with the store's atomic pair mutations:
//!
//! - both directed rows exist or neither does — a crash or a conflicting
//!   concurrent mutation never leaves a half-applied edge
//! - no self-edges and no duplicate edges
//! - `friend_count(u)` equals the number of edges `u` is on at all times

use uuid::Uuid;

use crate::{
  Error, Result,
  query::{FriendQuery, Page, effective_limit, effective_offset},
  store::SocialStore,
  user::Profile,
};

/// Friendship operations over any [`SocialStore`] backend.
///
/// Cheap to clone when the store is; handlers may hold their own copy.
#[derive(Clone)]
pub struct FriendGraph<S> {
  store: S,
}

impl<S: SocialStore> FriendGraph<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Create the friendship `{requester, target}`.
  ///
  /// Validation runs before any mutation: self-friendship, then target
  /// existence, then duplicate edge. The edge pair and both counter
  /// increments are a single atomic unit; on failure nothing is observable.
  pub async fn add_friend(&self, requester: Uuid, target: Uuid) -> Result<()> {
    if requester == target {
      return Err(Error::SelfFriendship(requester));
    }

    if self
      .store
      .user_by_id(target)
      .await
      .map_err(|e| Error::storage("user_by_id", e))?
      .is_none()
    {
      return Err(Error::UserNotFound(target));
    }

    if self
      .store
      .edge_exists(requester, target)
      .await
      .map_err(|e| Error::storage("edge_exists", e))?
    {
      return Err(Error::AlreadyFriends { a: requester, b: target });
    }

    let created = self
      .store
      .create_friendship(requester, target)
      .await
      .map_err(|e| Error::storage("create_friendship", e))?;

    // A concurrent add can win between the existence check and the insert;
    // the store reports that as "nothing inserted".
    if !created {
      return Err(Error::AlreadyFriends { a: requester, b: target });
    }
    Ok(())
  }

  /// Remove the friendship `{requester, target}`.
  ///
  /// Both directed rows and both counter decrements are a single atomic
  /// unit, mirroring [`FriendGraph::add_friend`].
  pub async fn remove_friend(&self, requester: Uuid, target: Uuid) -> Result<()> {
    if requester == target {
      return Err(Error::SelfFriendship(requester));
    }

    if !self
      .store
      .edge_exists(requester, target)
      .await
      .map_err(|e| Error::storage("edge_exists", e))?
    {
      return Err(Error::NotFriends { a: requester, b: target });
    }

    let removed = self
      .store
      .delete_friendship(requester, target)
      .await
      .map_err(|e| Error::storage("delete_friendship", e))?;

    if !removed {
      return Err(Error::NotFriends { a: requester, b: target });
    }
    Ok(())
  }

  /// Existence check of the directed edge `a → b`.
  ///
  /// The check is directional as implemented; the atomic-pair invariant is
  /// what makes it logically symmetric.
  pub async fn is_friend(&self, a: Uuid, b: Uuid) -> Result<bool> {
    self
      .store
      .edge_exists(a, b)
      .await
      .map_err(|e| Error::storage("edge_exists", e))
  }

  /// List users for `viewer`: everyone except the viewer, optionally only
  /// their friends, optionally filtered by a name/email/phone substring,
  /// sorted and paginated. `total` counts all matches before pagination.
  pub async fn list_friends(
    &self,
    viewer: Uuid,
    query: &FriendQuery,
  ) -> Result<Page<Profile>> {
    let (items, total) = self
      .store
      .friends_page(viewer, query)
      .await
      .map_err(|e| Error::storage("friends_page", e))?;

    Ok(Page {
      items,
      total,
      limit: effective_limit(query.limit),
      offset: effective_offset(query.offset),
    })
  }
}
