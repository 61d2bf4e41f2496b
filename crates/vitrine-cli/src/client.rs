//! Async HTTP client for the catalog service's JSON API.

use std::{
  sync::{Arc, PoisonError, RwLock},
  time::Duration,
};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode, header::ACCEPT};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use vitrine_core::remote::{HttpClient, NetworkError};

use crate::session::{Session, User};

/// Bearer-authenticated JSON client rooted at the service's base URL.
///
/// Cheap to clone; clones share the connection pool and the token.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Arc<RwLock<Option<String>>>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
      token: Arc::default(),
    })
  }

  pub fn set_token(&self, token: Option<String>) {
    *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
  }

  pub fn token(&self) -> Option<String> {
    self
      .token
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.token() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and map the response onto [`NetworkError`].
  async fn send(&self, req: RequestBuilder) -> Result<Value, NetworkError> {
    let resp = self
      .auth(req)
      .header(ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| NetworkError::Transport(e.to_string()))?;

    let status = resp.status();
    let body = resp
      .bytes()
      .await
      .map_err(|e| NetworkError::Transport(e.to_string()))?;

    if status == StatusCode::UNAUTHORIZED {
      return Err(NetworkError::Unauthorized);
    }
    if !status.is_success() {
      return Err(NetworkError::Status {
        status:  status.as_u16(),
        message: error_message(&body, status),
      });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| NetworkError::Decode(e.to_string()))
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /login`. On success the token is kept for subsequent calls.
  pub async fn login(&self, email: &str, password: &str) -> Result<Session, NetworkError> {
    #[derive(Serialize)]
    struct Credentials<'a> {
      email:    &'a str,
      password: &'a str,
    }

    let body = to_value(&Credentials { email, password })?;
    let session: Session = from_value(self.post("/login", body).await?)?;
    self.set_token(Some(session.token.clone()));
    tracing::info!(user = %session.user.email, "logged in");
    Ok(session)
  }

  /// `POST /logout`. The local token is dropped even if the call fails.
  pub async fn logout(&self) -> Result<(), NetworkError> {
    let result = self.post("/logout", Value::Null).await;
    self.set_token(None);
    result.map(drop)
  }

  /// `GET /me`
  pub async fn me(&self) -> Result<User, NetworkError> {
    from_value(self.get("/me").await?)
  }
}

impl HttpClient for ApiClient {
  async fn get(&self, path: &str) -> Result<Value, NetworkError> {
    self.send(self.client.get(self.url(path))).await
  }

  async fn post(&self, path: &str, body: Value) -> Result<Value, NetworkError> {
    self.send(self.client.post(self.url(path)).json(&body)).await
  }

  async fn put(&self, path: &str, body: Value) -> Result<Value, NetworkError> {
    self.send(self.client.put(self.url(path)).json(&body)).await
  }

  async fn delete(&self, path: &str) -> Result<Value, NetworkError> {
    self.send(self.client.delete(self.url(path))).await
  }
}

/// The service's `message` (or `error`) field, else the status reason.
fn error_message(body: &[u8], status: StatusCode) -> String {
  serde_json::from_slice::<Value>(body)
    .ok()
    .and_then(|v| {
      ["message", "error"]
        .iter()
        .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_owned))
    })
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, NetworkError> {
  serde_json::to_value(value).map_err(|e| NetworkError::Decode(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, NetworkError> {
  serde_json::from_value(value).map_err(|e| NetworkError::Decode(e.to_string()))
}
