//! Handlers for `/v1/user` endpoints.
//!
//! | Method  | Path                    | Notes |
//! |---------|-------------------------|-------|
//! | `POST`  | `/v1/user/register`     | No auth; 201 on success |
//! | `POST`  | `/v1/user/login`        | Basic credentials; returns the account |
//! | `POST`  | `/v1/user/link/{kind}`  | Fill the caller's empty credential slot |
//! | `PATCH` | `/v1/user`              | Update display name and profile image |

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sib_core::{
  store::SocialStore,
  user::{Credential, CredentialKind, NewUser, User},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Caller,
  error::{Error, Result},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub credential_kind:  String,
  pub credential_value: String,
  pub name:             String,
  pub password:         String,
}

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub credential_value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:      String,
  pub image_url: String,
}

/// The caller's own account. Unlike [`sib_core::user::Profile`] it carries
/// both credential slots; the password hash never crosses the wire.
#[derive(Debug, Serialize)]
pub struct UserResponse {
  pub user_id:      Uuid,
  pub name:         String,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub image_url:    Option<String>,
  pub friend_count: i64,
  pub created_at:   DateTime<Utc>,
}

impl From<User> for UserResponse {
  fn from(user: User) -> Self {
    Self {
      user_id:      user.user_id,
      name:         user.name,
      email:        user.email,
      phone:        user.phone,
      image_url:    user.image_url,
      friend_count: user.friend_count,
      created_at:   user.created_at,
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<()> {
  if name.len() < 5 || name.len() > 50 {
    return Err(Error::Validation("name must be 5 to 50 characters".into()));
  }
  Ok(())
}

fn validate_password(password: &str) -> Result<()> {
  if password.len() < 5 || password.len() > 15 {
    return Err(Error::Validation(
      "password must be 5 to 15 characters".into(),
    ));
  }
  Ok(())
}

fn validate_email(value: &str) -> Result<()> {
  let well_formed = value
    .split_once('@')
    .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
  if !well_formed || value.len() < 5 || value.len() > 30 {
    return Err(Error::Validation("not a valid email address".into()));
  }
  Ok(())
}

/// A phone credential is `+` followed by digits only, 7 to 13 characters
/// including the plus.
fn validate_phone(value: &str) -> Result<()> {
  let digits = value
    .strip_prefix('+')
    .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));
  if !digits || value.len() < 7 || value.len() > 13 {
    return Err(Error::Validation("not a valid phone number".into()));
  }
  Ok(())
}

fn validate_image_url(url: &str) -> Result<()> {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"));
  if !rest.is_some_and(|r| !r.is_empty()) {
    return Err(Error::Validation("image_url must be an http(s) URL".into()));
  }
  Ok(())
}

/// Validate `value` against the format rules of its slot and wrap it.
fn credential_from_parts(
  kind: CredentialKind,
  value: String,
) -> Result<Credential> {
  match kind {
    CredentialKind::Email => {
      validate_email(&value)?;
      Ok(Credential::Email(value))
    }
    CredentialKind::Phone => {
      validate_phone(&value)?;
      Ok(Credential::Phone(value))
    }
  }
}

/// Hash a plaintext password into an argon2 PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| Error::Hash(e.to_string()))?;
  Ok(hash.to_string())
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /v1/user/register` — create an account from one credential.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse>
where
  S: SocialStore + Clone + 'static,
{
  let kind: CredentialKind = body.credential_kind.parse()?;
  let credential = credential_from_parts(kind, body.credential_value)?;
  validate_name(&body.name)?;
  validate_password(&body.password)?;

  let user = state
    .accounts
    .register(NewUser {
      name: body.name,
      credential,
      password_hash: hash_password(&body.password)?,
    })
    .await?;

  Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `POST /v1/user/login` — authenticate and return the caller's account.
///
/// All the work happens in the [`Caller`] extractor; the handler only
/// projects the resolved account.
pub async fn login(caller: Caller) -> Json<UserResponse> {
  Json(UserResponse::from(caller.user))
}

/// `POST /v1/user/link/{kind}` — fill the caller's empty credential slot.
/// A `kind` that is not `email` or `phone` names no route: 404.
pub async fn link<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Path(kind): Path<String>,
  Json(body): Json<LinkBody>,
) -> Result<Json<UserResponse>>
where
  S: SocialStore + Clone + 'static,
{
  let kind: CredentialKind = kind.parse().map_err(|_| Error::NotFound)?;
  let credential = credential_from_parts(kind, body.credential_value)?;

  let user = state
    .accounts
    .link_credential(caller.user.user_id, credential)
    .await?;
  Ok(Json(UserResponse::from(user)))
}

/// `PATCH /v1/user` — update the caller's display name and profile image.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<UpdateBody>,
) -> Result<Json<UserResponse>>
where
  S: SocialStore + Clone + 'static,
{
  validate_name(&body.name)?;
  validate_image_url(&body.image_url)?;

  let user = state
    .accounts
    .update_profile(caller.user.user_id, body.name, body.image_url)
    .await?;
  Ok(Json(UserResponse::from(user)))
}
