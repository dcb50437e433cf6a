//! Post, tag and comment types.
//!
//! A post and its initial tags are created together, atomically. Comments are
//! append-only; the friendship check happens at creation time only and is
//! never re-validated. Post bodies are HTML-escaped before persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Profile;

/// A post row as stored. Tags and comments live in their own tables and are
/// attached on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  /// Escaped at creation; safe to render verbatim.
  pub body_html:  String,
  pub created_at: DateTime<Utc>,
}

/// A comment row as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub author_id:  Uuid,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}

/// A post joined with its author's public profile — the row shape produced by
/// the feed page query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
  pub post_id:    Uuid,
  pub author:     Profile,
  pub body_html:  String,
  pub created_at: DateTime<Utc>,
}

/// A comment joined with its author's public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
  pub comment_id: Uuid,
  pub post_id:    Uuid,
  pub author:     Profile,
  pub body:       String,
  pub created_at: DateTime<Utc>,
}

/// Escape `&`, `<`, `>`, `"` and `'` so user-supplied text cannot inject
/// markup when a post body is rendered as HTML.
pub fn escape_html(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for c in raw.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&#34;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::escape_html;

  #[test]
  fn escapes_all_five_significant_characters() {
    assert_eq!(
      escape_html(r#"<b>"bold" & 'loud'</b>"#),
      "&lt;b&gt;&#34;bold&#34; &amp; &#39;loud&#39;&lt;/b&gt;"
    );
  }

  #[test]
  fn plain_text_passes_through() {
    assert_eq!(escape_html("hello, world"), "hello, world");
    assert_eq!(escape_html(""), "");
  }

  #[test]
  fn already_escaped_input_is_escaped_again() {
    // Bodies are escaped exactly once, at creation; pre-escaped input is
    // treated as literal text.
    assert_eq!(escape_html("&amp;"), "&amp;amp;");
  }
}
