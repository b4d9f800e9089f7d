//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use studienplaner_core::ErrorKind;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Credentials were supplied but did not match a user.
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Failure outside the domain, e.g. password hashing.
  #[error("internal error: {0}")]
  Internal(String),

  #[error(transparent)]
  Core(#[from] studienplaner_core::Error),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Core(e) => match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"studienplaner\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use studienplaner_core::Error;

  use super::*;

  #[test]
  fn domain_errors_map_to_statuses() {
    let cases = [
      (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
      (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
      (Error::InvalidState("x".into()), StatusCode::CONFLICT),
      (Error::Conflict("x".into()), StatusCode::CONFLICT),
      (Error::Store("disk on fire".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
  }

  #[test]
  fn unauthorized_carries_a_challenge() {
    let res = ApiError::Unauthorized.into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
