//! HTTP Basic-auth extractor that resolves the calling user.
//!
//! The Basic username is one of the caller's login credentials: values
//! containing `@` are looked up in the email slot, everything else in the
//! phone slot. The password is verified against the stored argon2 PHC
//! string. Every failure mode is the same opaque 401.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use sib_core::{
  store::SocialStore,
  user::{Credential, User},
};

use crate::{AppState, error::Error};

/// The authenticated account behind the request's Basic credentials.
pub struct Caller {
  pub user: User,
}

/// Split a Basic Authorization header into a login credential and password.
pub fn parse_basic(headers: &HeaderMap) -> Result<(Credential, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  if username.is_empty() || password.is_empty() {
    return Err(Error::Unauthorized);
  }

  let credential = if username.contains('@') {
    Credential::Email(username.to_string())
  } else {
    Credential::Phone(username.to_string())
  };

  Ok((credential, password.to_string()))
}

/// Check a plaintext password against a stored argon2 PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: SocialStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (credential, password) = parse_basic(&parts.headers)?;

    let user = state
      .accounts
      .authenticate(&credential)
      .await?
      .ok_or(Error::Unauthorized)?;

    if !verify_password(&password, &user.password_hash) {
      return Err(Error::Unauthorized);
    }

    Ok(Caller { user })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};
  use base64::Engine as _;
  use sib_core::user::NewUser;
  use sib_store_sqlite::SqliteStore;

  use crate::{AppState, users::hash_password};

  async fn state_with_user(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState::new(store);
    state
      .accounts
      .register(NewUser {
        name:          "Alice Mercer".into(),
        credential:    Credential::Email("alice@example.com".into()),
        password_hash: hash_password(password).unwrap(),
      })
      .await
      .unwrap();
    state
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<Caller, Error> {
    let (mut parts, _) = req.into_parts();
    Caller::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials_resolve_the_account() {
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("alice@example.com", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    let caller = extract(req, &state).await.unwrap();
    assert_eq!(caller.user.name, "Alice Mercer");
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("alice@example.com", "wrong"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_credential() {
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("bob@example.com", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn username_without_at_sign_is_a_phone_lookup() {
    // The seeded user has an email credential only, so a phone-shaped
    // username must not find them.
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("+6281234567", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = state_with_user("secret").await;
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(extract(req, &state).await, Err(Error::Unauthorized)));
  }
}
