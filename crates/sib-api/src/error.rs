//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the same shape, `{"kind": ..., "message": ...}`,
//! where `kind` is the stable machine-readable classification and `message`
//! is wording that may change between releases. Domain errors take their
//! kind and status from [`sib_core::ErrorKind`].

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use sib_core::ErrorKind;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found")]
  NotFound,

  #[error("{0}")]
  Validation(String),

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("{0}")]
  Core(#[from] sib_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn body(kind: &str, message: &str) -> Json<serde_json::Value> {
  Json(json!({ "kind": kind, "message": message }))
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          body("unauthorized", "missing or invalid credentials"),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"sib\""),
        );
        res
      }
      Error::NotFound => {
        (StatusCode::NOT_FOUND, body("not_found", "not found")).into_response()
      }
      Error::Validation(msg) => {
        (StatusCode::BAD_REQUEST, body("invalid_argument", &msg))
          .into_response()
      }
      Error::Hash(msg) => {
        tracing::error!(error = %msg, "password hashing failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          body("internal", "internal error"),
        )
          .into_response()
      }
      Error::Core(e) => {
        let kind = e.kind();
        let status = match kind {
          ErrorKind::NotFound => StatusCode::NOT_FOUND,
          ErrorKind::Conflict => StatusCode::CONFLICT,
          ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
          ErrorKind::Forbidden => StatusCode::FORBIDDEN,
          ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        // Storage detail is logged, never sent to the caller.
        if kind == ErrorKind::Unavailable {
          tracing::error!(error = %e, "store failure");
          return (status, body(kind.as_str(), "storage unavailable"))
            .into_response();
        }
        (status, body(kind.as_str(), &e.to_string())).into_response()
      }
    }
  }
}
