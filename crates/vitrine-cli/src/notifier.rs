//! Toasts shown in the status bar.

use std::{
  sync::{Arc, Mutex, PoisonError},
  time::{Duration, Instant},
};

use vitrine_core::remote::Notifier;

/// How long a toast stays visible.
const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
  Success,
  Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub kind:    ToastKind,
  pub message: String,
  shown_at:    Instant,
}

/// A single toast slot shared between the action layer and the renderer.
/// A newer toast replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct StatusNotifier {
  slot: Arc<Mutex<Option<Toast>>>,
}

impl StatusNotifier {
  pub fn new() -> Self { Self::default() }

  /// The visible toast, if it has not expired.
  pub fn current(&self) -> Option<Toast> {
    let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
    slot
      .as_ref()
      .filter(|t| t.shown_at.elapsed() < TOAST_TTL)
      .cloned()
  }

  pub fn dismiss(&self) {
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
  }

  fn show(&self, kind: ToastKind, message: &str) {
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Toast {
      kind,
      message: message.to_owned(),
      shown_at: Instant::now(),
    });
  }
}

impl Notifier for StatusNotifier {
  fn success(&self, message: &str) { self.show(ToastKind::Success, message); }

  fn error(&self, message: &str) { self.show(ToastKind::Error, message); }
}
