// bazaar_server/src/services/auth_service.rs

//! Account registration, sign-in and Argon2 password handling.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use bazaar::model::{User, UserFilter};
use bazaar::Repositories;
use tracing::{debug, error, info, instrument};

/// Hashes a plain-text password using Argon2 with a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    error!("Password hashing failed: Password cannot be empty.");
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Checks `provided_password` against a stored Argon2 hash.
///
/// `Ok(false)` is a mismatch. Errors mean the stored hash itself is unusable.
#[instrument(name = "auth_service::verify_password", skip(hashed_password_str, provided_password), err(Display), fields(hash_len = hashed_password_str.len()))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Creates a user account. Emails are unique.
#[instrument(name = "auth_service::register", skip(repos, password), err(Display))]
pub async fn register(repos: &Repositories, email: &str, password: &str) -> Result<User, AppError> {
  let email = email.trim();
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation(format!("'{}' is not a valid email address.", email)));
  }

  let by_email = UserFilter {
    email: Some(email.to_string()),
    ..Default::default()
  };
  if repos.users.find_optional(&by_email).await?.is_some() {
    return Err(AppError::Validation(format!("Email '{}' is already registered.", email)));
  }

  let password_hash = hash_password(password)?;
  let user = repos.users.create(User::new(email, password_hash)).await?;
  info!(user_id = %user.id, "User registered.");
  Ok(user)
}

/// Checks an email and password pair and returns the matching user.
///
/// An unknown email and a wrong password fail the same way.
#[instrument(name = "auth_service::sign_in", skip(repos, password), err(Display))]
pub async fn sign_in(repos: &Repositories, email: &str, password: &str) -> Result<User, AppError> {
  let by_email = UserFilter {
    email: Some(email.trim().to_string()),
    ..Default::default()
  };
  let rejected = || AppError::Auth("Invalid email or password.".to_string());

  let user = repos.users.find_optional(&by_email).await?.ok_or_else(rejected)?;
  if !verify_password(&user.password_hash, password)? {
    return Err(rejected());
  }
  info!(user_id = %user.id, "User signed in.");
  Ok(user)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_password_verifies_only_against_the_original() {
    let hash = hash_password("s3cret").expect("hashing should succeed");
    assert!(verify_password(&hash, "s3cret").expect("verify"));
    assert!(!verify_password(&hash, "other").expect("verify"));
    assert!(!verify_password(&hash, "").expect("verify"));
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn corrupt_stored_hash_is_an_internal_error() {
    assert!(matches!(verify_password("not-a-hash", "pw"), Err(AppError::Internal(_))));
  }

  #[actix_rt::test]
  async fn duplicate_email_is_rejected() {
    let repos = Repositories::in_memory();
    register(&repos, "ann@example.com", "pw").await.expect("first registration");
    let second = register(&repos, "ann@example.com", "pw").await;
    assert!(matches!(second, Err(AppError::Validation(_))));
  }

  #[actix_rt::test]
  async fn sign_in_accepts_only_the_registered_password() {
    let repos = Repositories::in_memory();
    let user = register(&repos, "bo@example.com", "pw").await.expect("registration");

    let signed_in = sign_in(&repos, " bo@example.com ", "pw").await.expect("sign in");
    assert_eq!(signed_in.id, user.id);
    assert!(matches!(sign_in(&repos, "bo@example.com", "nope").await, Err(AppError::Auth(_))));
    assert!(matches!(sign_in(&repos, "nobody@example.com", "pw").await, Err(AppError::Auth(_))));
  }
}
