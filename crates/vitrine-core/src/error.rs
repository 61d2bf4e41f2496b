//! Error types for `vitrine-core`.

use thiserror::Error;

use crate::{promotion::PromotionType, remote::NetworkError};

#[derive(Debug, Error)]
pub enum Error {
  /// User input that cannot become a valid value. Never sent to the server.
  #[error("{field} {reason}")]
  Validation {
    field:  &'static str,
    reason: &'static str,
  },

  #[error("malformed promotion config: {0}")]
  MalformedConfig(String),

  #[error("field {field:?} does not belong to a {promotion_type} config")]
  TypeMismatch {
    promotion_type: PromotionType,
    field:          String,
  },

  #[error("unknown promotion type tag: {0}")]
  UnknownPromotionType(i64),

  #[error("unknown currency code: {0:?}")]
  UnknownCurrency(String),

  #[error(transparent)]
  Network(#[from] NetworkError),

  #[error("unexpected response body: {0}")]
  Response(#[source] serde_json::Error),
}

impl Error {
  pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
    Self::Validation { field, reason }
  }

  /// Whether this error describes bad user input rather than bad data or a
  /// failed call.
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
