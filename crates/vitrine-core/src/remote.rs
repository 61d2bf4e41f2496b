//! Collaborator traits implemented outside the core: the HTTP transport, the
//! product reference source and user notification.
//!
//! The core never talks to the network or the terminal directly. The client
//! crate supplies a reqwest-backed [`HttpClient`] and a status-bar
//! [`Notifier`]; tests supply fakes.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::{Result, product::ProductRef};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
  /// The request never produced a response (connection refused, timeout).
  #[error("transport error: {0}")]
  Transport(String),

  #[error("server responded {status}: {message}")]
  Status { status: u16, message: String },

  /// The session is missing or has expired.
  #[error("not authorised")]
  Unauthorized,

  /// The response body was not valid JSON.
  #[error("undecodable response: {0}")]
  Decode(String),
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// A JSON-over-HTTP transport rooted at the service's base URL.
///
/// Paths are relative (e.g. `/promotion/3`). An empty response body is
/// returned as [`Value::Null`].
pub trait HttpClient: Send + Sync {
  fn get(
    &self,
    path: &str,
  ) -> impl Future<Output = Result<Value, NetworkError>> + Send;

  fn post(
    &self,
    path: &str,
    body: Value,
  ) -> impl Future<Output = Result<Value, NetworkError>> + Send;

  fn put(
    &self,
    path: &str,
    body: Value,
  ) -> impl Future<Output = Result<Value, NetworkError>> + Send;

  fn delete(
    &self,
    path: &str,
  ) -> impl Future<Output = Result<Value, NetworkError>> + Send;
}

/// Source of the products offered by reference selectors.
pub trait ProductLookup: Send + Sync {
  fn list(&self) -> impl Future<Output = Result<Vec<ProductRef>>> + Send;
}

/// Fire-and-forget user feedback.
pub trait Notifier: Send + Sync {
  fn success(&self, message: &str);

  fn error(&self, message: &str);
}
