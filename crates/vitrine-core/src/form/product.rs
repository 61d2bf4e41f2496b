//! The product dialog's form.

use std::collections::BTreeMap;

use super::{FormAction, FormErrors};
use crate::product::{Condition, NewProduct, Product};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
  Name,
  Description,
  Condition,
  Available,
}

impl ProductField {
  pub const ALL: [Self; 4] =
    [Self::Name, Self::Description, Self::Condition, Self::Available];

  pub fn label(self) -> &'static str {
    match self {
      Self::Name => "Name",
      Self::Description => "Description",
      Self::Condition => "Condition",
      Self::Available => "Available",
    }
  }

  pub fn is_selector(self) -> bool {
    matches!(self, Self::Condition | Self::Available)
  }
}

pub type ProductAction = FormAction<ProductField>;

/// Raw product form state. New products start as `new` and available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
  values: BTreeMap<ProductField, String>,
}

impl Default for ProductForm {
  fn default() -> Self {
    let mut form = Self {
      values: BTreeMap::new(),
    };
    form.dispatch(FormAction::Reset);
    form
  }
}

impl ProductForm {
  pub fn new() -> Self { Self::default() }

  pub fn from_product(product: &Product) -> Self {
    let mut form = Self::new();
    form.dispatch(FormAction::set(ProductField::Name, &product.name));
    form.dispatch(FormAction::set(
      ProductField::Description,
      &product.description,
    ));
    form.dispatch(FormAction::set(
      ProductField::Condition,
      product.condition.to_string(),
    ));
    form.dispatch(FormAction::set(
      ProductField::Available,
      product.available.to_string(),
    ));
    form
  }

  pub fn dispatch(&mut self, action: ProductAction) {
    match action {
      FormAction::Set { field, value } => {
        self.values.insert(field, value);
      }
      FormAction::Clear(field) => {
        self.values.remove(&field);
      }
      FormAction::Reset => {
        self.values.clear();
        self
          .values
          .insert(ProductField::Condition, Condition::New.to_string());
        self.values.insert(ProductField::Available, true.to_string());
      }
    }
  }

  pub fn value(&self, field: ProductField) -> &str {
    self.values.get(&field).map(String::as_str).unwrap_or_default()
  }

  pub fn condition(&self) -> Option<Condition> {
    match self.value(ProductField::Condition).trim() {
      "new" => Some(Condition::New),
      "used" => Some(Condition::Used),
      _ => None,
    }
  }

  pub fn available(&self) -> Option<bool> {
    self.value(ProductField::Available).trim().parse().ok()
  }

  pub fn submit(&self) -> Result<NewProduct, FormErrors<ProductField>> {
    let mut errors = FormErrors::new();

    let name = self.value(ProductField::Name).trim();
    if name.is_empty() {
      errors.push(ProductField::Name, "Name is required");
    }
    let condition = self.condition();
    if condition.is_none() {
      errors.push(ProductField::Condition, "Condition must be new or used");
    }
    let available = self.available();
    if available.is_none() {
      errors.push(ProductField::Available, "Available must be true or false");
    }

    match (condition, available) {
      (Some(condition), Some(available)) if errors.is_empty() => Ok(NewProduct {
        name: name.to_owned(),
        description: self.value(ProductField::Description).trim().to_owned(),
        condition,
        available,
      }),
      _ => Err(errors),
    }
  }
}
