//! User types — registration identity, credentials, and the derived friend
//! counter.
//!
//! A user registers with exactly one credential (email or phone); the missing
//! kind may be linked later but a credential never changes once set.
//! `friend_count` is strictly derived from the friendship edge set and is
//! written only by friendship mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Which credential slot a value occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
  Email,
  Phone,
}

impl CredentialKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Email => "email",
      Self::Phone => "phone",
    }
  }
}

impl std::fmt::Display for CredentialKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CredentialKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "email" => Ok(Self::Email),
      "phone" => Ok(Self::Phone),
      other => {
        Err(Error::InvalidArgument(format!("unknown credential kind: {other:?}")))
      }
    }
  }
}

/// A login credential — exactly one of the two kinds, with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
  Email(String),
  Phone(String),
}

impl Credential {
  pub fn kind(&self) -> CredentialKind {
    match self {
      Self::Email(_) => CredentialKind::Email,
      Self::Phone(_) => CredentialKind::Phone,
    }
  }

  pub fn value(&self) -> &str {
    match self {
      Self::Email(v) | Self::Phone(v) => v,
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered user row.
///
/// Deliberately not serialisable: `password_hash` is an opaque reference to
/// the credential-hashing collaborator and must never cross the wire.
/// Transport layers project into [`Profile`] or their own response types.
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub name:          String,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub password_hash: String,
  pub image_url:     Option<String>,
  /// Derived: always equal to the number of friendship edges this user is on.
  pub friend_count:  i64,
  pub created_at:    DateTime<Utc>,
}

impl User {
  /// The public projection denormalised into friend listings, feed items and
  /// comments.
  pub fn profile(&self) -> Profile {
    Profile {
      user_id:      self.user_id,
      name:         self.name.clone(),
      image_url:    self.image_url.clone(),
      friend_count: self.friend_count,
      created_at:   self.created_at,
    }
  }
}

/// Public identity fields of a user, safe to embed in any response.
/// `created_at` is the user's registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:      Uuid,
  pub name:         String,
  pub image_url:    Option<String>,
  pub friend_count: i64,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::accounts::Accounts::register`].
/// The password is already hashed by the identity layer; the core never sees
/// plaintext secrets.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub credential:    Credential,
  pub password_hash: String,
}
