//! Error types for `sib-core`.
//!
//! Every error carries a stable machine-readable [`ErrorKind`] so transport
//! layers can map it to a status code without matching on individual variants.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::user::CredentialKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  #[error("users {a} and {b} are not friends")]
  NotFriends { a: Uuid, b: Uuid },

  #[error("users {a} and {b} are already friends")]
  AlreadyFriends { a: Uuid, b: Uuid },

  #[error("credential {0:?} is already in use")]
  CredentialTaken(String),

  #[error("{0} is already linked and cannot be changed")]
  CredentialImmutable(CredentialKind),

  #[error("user {0} cannot befriend themselves")]
  SelfFriendship(Uuid),

  #[error("{0}")]
  InvalidArgument(String),

  #[error("user {author} is not a friend of the author of post {post}")]
  CommentForbidden { author: Uuid, post: Uuid },

  /// A storage-level failure, wrapped with the name of the failing operation.
  /// Any transaction the operation had open was rolled back.
  #[error("storage failure in {op}: {source}")]
  Storage {
    op:     &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  /// Wrap a backend error, recording which store operation failed.
  pub fn storage(
    op: &'static str,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Storage { op, source: Box::new(source) }
  }

  /// The machine-readable classification of this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_) | Self::PostNotFound(_) | Self::NotFriends { .. } => {
        ErrorKind::NotFound
      }
      Self::AlreadyFriends { .. }
      | Self::CredentialTaken(_)
      | Self::CredentialImmutable(_) => ErrorKind::Conflict,
      Self::SelfFriendship(_) | Self::InvalidArgument(_) => {
        ErrorKind::InvalidArgument
      }
      Self::CommentForbidden { .. } => ErrorKind::Forbidden,
      Self::Storage { .. } => ErrorKind::Unavailable,
    }
  }
}

/// Stable error classification exposed to callers; the contract is that the
/// kind of an operation's failure never changes across releases even when the
/// message wording does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Conflict,
  InvalidArgument,
  Forbidden,
  Unavailable,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NotFound => "not_found",
      Self::Conflict => "conflict",
      Self::InvalidArgument => "invalid_argument",
      Self::Forbidden => "forbidden",
      Self::Unavailable => "unavailable",
    }
  }
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
