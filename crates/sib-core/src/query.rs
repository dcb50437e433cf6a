//! Query parameter and pagination types shared by the listing operations.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller supplies no limit, a zero limit, or a
/// negative limit.
pub const DEFAULT_LIMIT: i64 = 10;

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// Sort key for friend listings. The feed is always newest-first and has no
/// sort parameter.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FriendSort {
  FriendCount,
  #[default]
  CreatedAt,
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`crate::graph::FriendGraph::list_friends`].
#[derive(Debug, Clone, Default)]
pub struct FriendQuery {
  /// Restrict to users the viewer shares an edge with; otherwise the listing
  /// covers every user except the viewer.
  pub only_friends: bool,
  /// Case-insensitive substring over name, email or phone.
  pub search:       Option<String>,
  pub sort:         FriendSort,
  pub order:        SortOrder,
  pub limit:        Option<i64>,
  pub offset:       Option<i64>,
}

/// Parameters for [`crate::feed::FeedAggregator::list_feed`].
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
  /// Non-empty: a post must carry at least one tag from this set.
  pub tags:   Vec<String>,
  /// Case-insensitive substring over the (escaped) post body.
  pub search: Option<String>,
  pub limit:  Option<i64>,
  pub offset: Option<i64>,
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// One page of results.
///
/// `total` counts every row matching the filter predicate, ignoring
/// pagination. `limit` and `offset` echo the *effective* values actually
/// applied, after clamping — not the caller's raw input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:  Vec<T>,
  pub total:  u64,
  pub limit:  i64,
  pub offset: i64,
}

/// Clamp a caller-supplied limit: absent, zero or negative becomes
/// [`DEFAULT_LIMIT`].
pub fn effective_limit(limit: Option<i64>) -> i64 {
  match limit {
    Some(l) if l > 0 => l,
    _ => DEFAULT_LIMIT,
  }
}

/// Clamp a caller-supplied offset: absent or negative becomes zero.
pub fn effective_offset(offset: Option<i64>) -> i64 {
  match offset {
    Some(o) if o >= 0 => o,
    _ => 0,
  }
}
