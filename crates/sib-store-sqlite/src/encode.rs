//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, which for UTC values sort
//! lexically in chronological order. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use sib_core::{
  post::{CommentView, Post, PostView},
  user::{Profile, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub password_hash: String,
  pub image_url:     Option<String>,
  pub friend_count:  i64,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      name:          self.name,
      email:         self.email,
      phone:         self.phone,
      password_hash: self.password_hash,
      image_url:     self.image_url,
      friend_count:  self.friend_count,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// The public projection of a `users` row, as selected by friend listings and
/// author joins.
pub struct RawProfile {
  pub user_id:      String,
  pub name:         String,
  pub image_url:    Option<String>,
  pub friend_count: i64,
  pub created_at:   String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      user_id:      decode_uuid(&self.user_id)?,
      name:         self.name,
      image_url:    self.image_url,
      friend_count: self.friend_count,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:    String,
  pub author_id:  String,
  pub body_html:  String,
  pub created_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:    decode_uuid(&self.post_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      body_html:  self.body_html,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `posts` row joined with its author's `users` row.
pub struct RawPostView {
  // posts columns
  pub post_id:    String,
  pub body_html:  String,
  pub created_at: String,
  // users join
  pub author:     RawProfile,
}

impl RawPostView {
  pub fn into_view(self) -> Result<PostView> {
    Ok(PostView {
      post_id:    decode_uuid(&self.post_id)?,
      author:     self.author.into_profile()?,
      body_html:  self.body_html,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A `post_comments` row joined with its author's `users` row.
pub struct RawCommentView {
  // post_comments columns
  pub comment_id: String,
  pub post_id:    String,
  pub body:       String,
  pub created_at: String,
  // users join
  pub author:     RawProfile,
}

impl RawCommentView {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment_id: decode_uuid(&self.comment_id)?,
      post_id:    decode_uuid(&self.post_id)?,
      author:     self.author.into_profile()?,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
