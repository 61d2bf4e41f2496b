//! Form state for the create and edit dialogs.
//!
//! Each form is a single map of raw string values keyed by a field enum and
//! changed only through `dispatch`. Nothing is parsed until `submit`, which
//! either yields a request payload or the per-field errors to show inline.

use std::fmt;

pub mod product;
pub mod promotion;

pub use product::{ProductAction, ProductField, ProductForm};
pub use promotion::{FormField, PromotionAction, PromotionForm};

/// A change to a form's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction<F> {
  Set { field: F, value: String },
  Clear(F),
  Reset,
}

impl<F> FormAction<F> {
  pub fn set(field: F, value: impl Into<String>) -> Self {
    Self::Set {
      field,
      value: value.into(),
    }
  }
}

/// Validation messages from a rejected submission, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors<F> {
  errors: Vec<(F, String)>,
}

impl<F> Default for FormErrors<F> {
  fn default() -> Self { Self { errors: Vec::new() } }
}

impl<F: Copy + PartialEq> FormErrors<F> {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, field: F, message: impl Into<String>) {
    self.errors.push((field, message.into()));
  }

  /// The message for `field`, if it was rejected.
  pub fn get(&self, field: F) -> Option<&str> {
    self
      .errors
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, m)| m.as_str())
  }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  pub fn len(&self) -> usize { self.errors.len() }

  pub fn iter(&self) -> impl Iterator<Item = (F, &str)> {
    self.errors.iter().map(|(f, m)| (*f, m.as_str()))
  }

  /// `Ok(value)` when no errors were collected.
  pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
    if self.is_empty() { Ok(value()) } else { Err(self) }
  }
}

impl<F> fmt::Display for FormErrors<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (_, message)) in self.errors.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      f.write_str(message)?;
    }
    Ok(())
  }
}

impl<F: fmt::Debug> std::error::Error for FormErrors<F> {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn errors_keep_order_and_lookup() {
    let mut errors = FormErrors::new();
    errors.push(FormField::Name, "Name is required");
    errors.push(FormField::StartDate, "Start date is required");

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.get(FormField::StartDate), Some("Start date is required"));
    assert_eq!(errors.get(FormField::EndDate), None);
    assert_eq!(
      errors.to_string(),
      "Name is required; Start date is required"
    );
  }

  #[test]
  fn into_result() {
    let empty = FormErrors::<FormField>::new();
    assert_eq!(empty.into_result(|| 5), Ok(5));

    let mut errors = FormErrors::new();
    errors.push(FormField::Name, "Name is required");
    assert!(errors.into_result(|| 5).is_err());
  }
}
