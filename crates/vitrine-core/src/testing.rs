//! In-memory fakes of the collaborator traits, shared by the unit tests.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use serde_json::Value;

use crate::remote::{HttpClient, NetworkError, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
  pub method: Method,
  pub path:   String,
  pub body:   Option<Value>,
}

/// Records every call and answers from a route table. Unrouted calls get
/// `null`.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
  calls:  Arc<Mutex<Vec<Call>>>,
  routes: Arc<Mutex<HashMap<(Method, String), Result<Value, NetworkError>>>>,
}

impl RecordingClient {
  pub fn new() -> Self { Self::default() }

  pub fn route(
    self,
    method: Method,
    path: &str,
    response: Result<Value, NetworkError>,
  ) -> Self {
    self
      .routes
      .lock()
      .unwrap()
      .insert((method, path.to_owned()), response);
    self
  }

  pub fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  pub fn paths(&self, method: Method) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.method == method)
      .map(|c| c.path)
      .collect()
  }

  fn answer(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<Value, NetworkError> {
    self.calls.lock().unwrap().push(Call {
      method,
      path: path.to_owned(),
      body,
    });
    self
      .routes
      .lock()
      .unwrap()
      .get(&(method, path.to_owned()))
      .cloned()
      .unwrap_or(Ok(Value::Null))
  }
}

impl HttpClient for RecordingClient {
  async fn get(&self, path: &str) -> Result<Value, NetworkError> {
    self.answer(Method::Get, path, None)
  }

  async fn post(&self, path: &str, body: Value) -> Result<Value, NetworkError> {
    self.answer(Method::Post, path, Some(body))
  }

  async fn put(&self, path: &str, body: Value) -> Result<Value, NetworkError> {
    self.answer(Method::Put, path, Some(body))
  }

  async fn delete(&self, path: &str) -> Result<Value, NetworkError> {
    self.answer(Method::Delete, path, None)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
  Success(String),
  Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
  notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
  pub fn notes(&self) -> Vec<Note> { self.notes.lock().unwrap().clone() }
}

impl Notifier for RecordingNotifier {
  fn success(&self, message: &str) {
    self.notes.lock().unwrap().push(Note::Success(message.to_owned()));
  }

  fn error(&self, message: &str) {
    self.notes.lock().unwrap().push(Note::Error(message.to_owned()));
  }
}
