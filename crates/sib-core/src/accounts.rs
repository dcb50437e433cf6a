//! Account operations — registration, credential lookup, profile updates and
//! credential linking.
//!
//! Credential *verification* (password hashing and comparison) is the
//! identity collaborator's job; this service only stores and retrieves the
//! opaque hash string alongside the user row.

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::SocialStore,
  user::{Credential, CredentialKind, NewUser, User},
};

/// Account operations over any [`SocialStore`] backend.
#[derive(Clone)]
pub struct Accounts<S> {
  store: S,
}

impl<S: SocialStore> Accounts<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Register a new user with exactly one credential.
  ///
  /// Fails with [`Error::CredentialTaken`] if another user already holds the
  /// credential.
  pub async fn register(&self, input: NewUser) -> Result<User> {
    if self
      .store
      .user_by_credential(&input.credential)
      .await
      .map_err(|e| Error::storage("user_by_credential", e))?
      .is_some()
    {
      return Err(Error::CredentialTaken(input.credential.value().to_owned()));
    }

    let (email, phone) = match &input.credential {
      Credential::Email(v) => (Some(v.clone()), None),
      Credential::Phone(v) => (None, Some(v.clone())),
    };

    let user = User {
      user_id: Uuid::new_v4(),
      name: input.name,
      email,
      phone,
      password_hash: input.password_hash,
      image_url: None,
      friend_count: 0,
      created_at: Utc::now(),
    };

    self
      .store
      .insert_user(user.clone())
      .await
      .map_err(|e| Error::storage("insert_user", e))?;

    Ok(user)
  }

  /// Look up the user holding `credential`, if any. Pure lookup: the caller
  /// verifies the password against the returned hash.
  pub async fn authenticate(
    &self,
    credential: &Credential,
  ) -> Result<Option<User>> {
    self
      .store
      .user_by_credential(credential)
      .await
      .map_err(|e| Error::storage("user_by_credential", e))
  }

  /// Fetch a user by id, failing with [`Error::UserNotFound`] if absent.
  pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
    self
      .store
      .user_by_id(user_id)
      .await
      .map_err(|e| Error::storage("user_by_id", e))?
      .ok_or(Error::UserNotFound(user_id))
  }

  /// Update the user's display name and profile image reference.
  /// The image reference is an opaque string owned by the object-storage
  /// collaborator.
  pub async fn update_profile(
    &self,
    user_id: Uuid,
    name: String,
    image_url: String,
  ) -> Result<User> {
    let mut user = self.get_user(user_id).await?;

    user.name = name.clone();
    user.image_url = Some(image_url.clone());

    self
      .store
      .update_profile(user_id, name, image_url)
      .await
      .map_err(|e| Error::storage("update_profile", e))?;

    Ok(user)
  }

  /// Fill the user's missing credential slot.
  ///
  /// Fails with [`Error::CredentialImmutable`] if the slot is already set —
  /// credentials never change once linked — and [`Error::CredentialTaken`]
  /// if another user holds the value.
  pub async fn link_credential(
    &self,
    user_id: Uuid,
    credential: Credential,
  ) -> Result<User> {
    let mut user = self.get_user(user_id).await?;

    let slot_taken = match credential.kind() {
      CredentialKind::Email => user.email.is_some(),
      CredentialKind::Phone => user.phone.is_some(),
    };
    if slot_taken {
      return Err(Error::CredentialImmutable(credential.kind()));
    }

    if self
      .store
      .user_by_credential(&credential)
      .await
      .map_err(|e| Error::storage("user_by_credential", e))?
      .is_some()
    {
      return Err(Error::CredentialTaken(credential.value().to_owned()));
    }

    match &credential {
      Credential::Email(v) => user.email = Some(v.clone()),
      Credential::Phone(v) => user.phone = Some(v.clone()),
    }

    self
      .store
      .link_credential(user_id, credential)
      .await
      .map_err(|e| Error::storage("link_credential", e))?;

    Ok(user)
  }
}
