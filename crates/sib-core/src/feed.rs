//! The post feed service — visibility resolution, filter/sort/pagination,
//! and the concurrent comments+tags fan-out.
//!
//! A post is visible to a viewer iff the viewer authored it or shares a
//! friendship edge with its author. The feed is always sorted newest-first.

use chrono::{DateTime, Utc};
use futures::try_join;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  post::{Comment, CommentView, Post, escape_html},
  query::{FeedQuery, Page, effective_limit, effective_offset},
  store::SocialStore,
  user::Profile,
};

/// One assembled feed entry: the post, its author's public profile, its tags
/// in lexical order, and its comments newest-first with their authors'
/// profiles denormalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
  pub post_id:    Uuid,
  pub author:     Profile,
  pub body_html:  String,
  pub tags:       Vec<String>,
  pub comments:   Vec<CommentView>,
  pub created_at: DateTime<Utc>,
}

/// Feed operations over any [`SocialStore`] backend.
#[derive(Clone)]
pub struct FeedAggregator<S> {
  store: S,
}

impl<S: SocialStore> FeedAggregator<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Create a post for `author`.
  ///
  /// The raw body is HTML-escaped before persistence. Tags are stored as an
  /// ordered set: sorted lexically, duplicates dropped, empty list allowed.
  /// The post row and all tag rows are one atomic unit of work.
  ///
  /// Returns the persisted post and its normalized tags.
  pub async fn create_post(
    &self,
    author: Uuid,
    body: &str,
    mut tags: Vec<String>,
  ) -> Result<(Post, Vec<String>)> {
    let post = Post {
      post_id:    Uuid::new_v4(),
      author_id:  author,
      body_html:  escape_html(body),
      created_at: Utc::now(),
    };

    tags.sort();
    tags.dedup();

    self
      .store
      .insert_post(post.clone(), tags.clone())
      .await
      .map_err(|e| Error::storage("insert_post", e))?;

    Ok((post, tags))
  }

  /// One page of the viewer's feed.
  ///
  /// After the page of visible posts is resolved, comments and tags for the
  /// page's post ids are bulk-fetched concurrently; the call waits for both
  /// and fails whole if either fails — a partial result is never returned.
  /// An empty page skips the bulk fetches entirely.
  pub async fn list_feed(
    &self,
    viewer: Uuid,
    query: &FeedQuery,
  ) -> Result<Page<FeedItem>> {
    let limit  = effective_limit(query.limit);
    let offset = effective_offset(query.offset);

    let (posts, total) = self
      .store
      .posts_page(viewer, query)
      .await
      .map_err(|e| Error::storage("posts_page", e))?;

    if posts.is_empty() {
      return Ok(Page { items: Vec::new(), total, limit, offset });
    }

    let ids: Vec<Uuid> = posts.iter().map(|p| p.post_id).collect();

    // Two independent bulk lookups keyed by the same id set, joined before
    // assembly. They write disjoint maps; the first error aborts the call.
    let (mut comments, mut tags) = try_join!(
      async {
        self
          .store
          .comments_for_posts(&ids)
          .await
          .map_err(|e| Error::storage("comments_for_posts", e))
      },
      async {
        self
          .store
          .tags_for_posts(&ids)
          .await
          .map_err(|e| Error::storage("tags_for_posts", e))
      },
    )?;

    let items = posts
      .into_iter()
      .map(|p| FeedItem {
        tags:       tags.remove(&p.post_id).unwrap_or_default(),
        comments:   comments.remove(&p.post_id).unwrap_or_default(),
        post_id:    p.post_id,
        author:     p.author,
        body_html:  p.body_html,
        created_at: p.created_at,
      })
      .collect();

    Ok(Page { items, total, limit, offset })
  }

  /// Append a comment by `author` to `post_id`.
  ///
  /// The author must be the post's author or share a friendship edge with
  /// them; the check runs at creation time only. Single-row write, no
  /// transaction.
  pub async fn add_comment(
    &self,
    author: Uuid,
    post_id: Uuid,
    body: &str,
  ) -> Result<Comment> {
    let post = self
      .store
      .post_by_id(post_id)
      .await
      .map_err(|e| Error::storage("post_by_id", e))?
      .ok_or(Error::PostNotFound(post_id))?;

    if post.author_id != author {
      let allowed = self
        .store
        .edge_exists(author, post.author_id)
        .await
        .map_err(|e| Error::storage("edge_exists", e))?;
      if !allowed {
        return Err(Error::CommentForbidden { author, post: post_id });
      }
    }

    let comment = Comment {
      comment_id: Uuid::new_v4(),
      post_id,
      author_id:  author,
      body:       body.to_owned(),
      created_at: Utc::now(),
    };

    self
      .store
      .insert_comment(comment.clone())
      .await
      .map_err(|e| Error::storage("insert_comment", e))?;

    Ok(comment)
  }
}
