//! HTTP Basic-auth principal extraction and password hashing.
//!
//! Requests without an `Authorization` header run as the anonymous
//! principal; the services then deny whatever needs a role. A header that is
//! present but does not name a user with a matching password is rejected
//! with 401 before any handler runs.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use studienplaner_core::{access::Principal, service::Services, store::CourseStore};

use crate::error::ApiError;

/// Produce the argon2 PHC string stored in `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Split a `Basic` header into `(email, password)`.
///
/// `Ok(None)` means no header was sent.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;
  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  Ok(Some((email.to_owned(), password.to_owned())))
}

/// Resolve request headers into the acting [`Principal`].
pub async fn authenticate<S>(headers: &HeaderMap, store: &S) -> Result<Principal, ApiError>
where
  S: CourseStore,
  studienplaner_core::Error: From<S::Error>,
{
  let Some((email, password)) = basic_credentials(headers)? else {
    return Ok(Principal::anonymous());
  };

  let user = store
    .find_user_by_email(&email)
    .await
    .map_err(|e| ApiError::Core(e.into()))?;

  match user {
    Some(user) if verify_password(&password, &user.password_hash) => Ok(Principal::from(&user)),
    _ => {
      tracing::debug!(%email, "rejected credentials");
      Err(ApiError::Unauthorized)
    }
  }
}

/// The principal acting on a request.
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<Arc<Services<S>>> for CurrentUser
where
  S: CourseStore + 'static,
  studienplaner_core::Error: From<S::Error>,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &Arc<Services<S>>,
  ) -> Result<Self, Self::Rejection> {
    let principal = authenticate(&parts.headers, state.store().as_ref()).await?;
    Ok(CurrentUser(principal))
  }
}
