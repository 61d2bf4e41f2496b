//! Raw config fields and the validator that turns them into a
//! [`PromotionConfig`].
//!
//! Form inputs produce strings. [`build_config`] parses them strictly: a
//! value that is not a number is an error, never a zero.

use std::{collections::BTreeMap, str::FromStr};

use rust_decimal::Decimal;
use strum::EnumIter;

use crate::{
  Error, Result,
  promotion::{
    BuyXGetY, FixedDiscount, PercentageDiscount, ProductId, PromotionConfig,
    PromotionType, check_amount, check_discount_amount,
    check_discount_percentage,
  },
};

// ─── ConfigField ─────────────────────────────────────────────────────────────

/// Every key that can appear in a config blob, across all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum ConfigField {
  DiscountAmount,
  DiscountPercentage,
  ProductId,
  XProductId,
  XProductAmount,
  YProductId,
  YProductAmount,
}

impl ConfigField {
  /// The key used in the config blob and in validation errors.
  pub fn key(self) -> &'static str {
    match self {
      Self::DiscountAmount => "discount_amount",
      Self::DiscountPercentage => "discount_percentage",
      Self::ProductId => "product_id",
      Self::XProductId => "x_product_id",
      Self::XProductAmount => "x_product_amount",
      Self::YProductId => "y_product_id",
      Self::YProductAmount => "y_product_amount",
    }
  }

  pub fn from_key(key: &str) -> Option<Self> {
    use strum::IntoEnumIterator;
    Self::iter().find(|field| field.key() == key)
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::DiscountAmount => "Discount amount",
      Self::DiscountPercentage => "Discount percentage",
      Self::ProductId => "Product",
      Self::XProductId => "Product X",
      Self::XProductAmount => "Product X quantity",
      Self::YProductId => "Product Y",
      Self::YProductAmount => "Product Y quantity",
    }
  }

  /// Whether the field holds a product reference (rendered as a selector).
  pub fn is_product_reference(self) -> bool {
    matches!(self, Self::ProductId | Self::XProductId | Self::YProductId)
  }

  /// The fields that make up a config of `promotion_type`, in display and
  /// validation order.
  pub fn for_type(promotion_type: PromotionType) -> &'static [Self] {
    match promotion_type {
      PromotionType::FixedDiscount => &[Self::DiscountAmount, Self::ProductId],
      PromotionType::PercentageDiscount => {
        &[Self::DiscountPercentage, Self::ProductId]
      }
      PromotionType::BuyXGetY => &[
        Self::XProductId,
        Self::XProductAmount,
        Self::YProductId,
        Self::YProductAmount,
      ],
    }
  }
}

// ─── ConfigFields ────────────────────────────────────────────────────────────

/// Raw, string-typed config values keyed by field, as typed into a form or
/// expanded from a stored blob. An absent key means "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFields(BTreeMap<ConfigField, String>);

impl ConfigFields {
  pub fn new() -> Self { Self::default() }

  /// Builder-style [`ConfigFields::set`].
  pub fn with(mut self, field: ConfigField, value: impl Into<String>) -> Self {
    self.set(field, value);
    self
  }

  pub fn get(&self, field: ConfigField) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn set(&mut self, field: ConfigField, value: impl Into<String>) {
    self.0.insert(field, value.into());
  }

  pub fn remove(&mut self, field: ConfigField) -> Option<String> {
    self.0.remove(&field)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (ConfigField, &str)> {
    self.0.iter().map(|(field, value)| (*field, value.as_str()))
  }

  /// The trimmed value, with blank treated as missing.
  fn present(&self, field: ConfigField) -> Option<&str> {
    self.get(field).map(str::trim).filter(|v| !v.is_empty())
  }
}

impl<S: Into<String>> FromIterator<(ConfigField, S)> for ConfigFields {
  fn from_iter<I: IntoIterator<Item = (ConfigField, S)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(f, v)| (f, v.into())).collect())
  }
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// Build the config for `promotion_type` from raw field values.
///
/// Only the fields of `promotion_type` are read; values left over from other
/// types are ignored. The first offending field, in [`ConfigField::for_type`]
/// order, is reported as [`Error::Validation`].
pub fn build_config(
  promotion_type: PromotionType,
  fields: &ConfigFields,
) -> Result<PromotionConfig> {
  use ConfigField as F;

  let config = match promotion_type {
    PromotionType::FixedDiscount => {
      let amount = decimal(fields, F::DiscountAmount)
        .and_then(check_discount_amount)?;
      let product_id = product(fields, F::ProductId)?;
      PromotionConfig::FixedDiscount(FixedDiscount::new(amount, product_id)?)
    }
    PromotionType::PercentageDiscount => {
      let percentage = decimal(fields, F::DiscountPercentage)
        .and_then(check_discount_percentage)?;
      let product_id = product(fields, F::ProductId)?;
      PromotionConfig::PercentageDiscount(PercentageDiscount::new(
        percentage, product_id,
      )?)
    }
    PromotionType::BuyXGetY => {
      let x_id = product(fields, F::XProductId)?;
      let x_amount = whole(fields, F::XProductAmount)
        .and_then(|n| check_amount(F::XProductAmount.key(), n))?;
      let y_id = product(fields, F::YProductId)?;
      let y_amount = whole(fields, F::YProductAmount)
        .and_then(|n| check_amount(F::YProductAmount.key(), n))?;
      PromotionConfig::BuyXGetY(BuyXGetY::new(x_id, x_amount, y_id, y_amount)?)
    }
  };
  Ok(config)
}

fn required(fields: &ConfigFields, field: ConfigField) -> Result<&str> {
  fields
    .present(field)
    .ok_or_else(|| Error::invalid(field.key(), "is required"))
}

/// Plain decimal notation only: digits, one optional point, optional sign.
fn decimal(fields: &ConfigFields, field: ConfigField) -> Result<Decimal> {
  let raw = required(fields, field)?;
  let plain = raw.chars().any(|c| c.is_ascii_digit())
    && raw
      .chars()
      .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'));
  if !plain {
    return Err(Error::invalid(field.key(), "is not a number"));
  }
  Decimal::from_str(raw).map_err(|_| Error::invalid(field.key(), "is not a number"))
}

fn whole(fields: &ConfigFields, field: ConfigField) -> Result<u32> {
  let raw = required(fields, field)?;
  raw
    .parse::<u32>()
    .map_err(|_| Error::invalid(field.key(), "is not a whole number"))
}

fn product(fields: &ConfigFields, field: ConfigField) -> Result<ProductId> {
  let raw = required(fields, field)?;
  raw
    .parse::<u64>()
    .ok()
    .and_then(ProductId::new)
    .ok_or_else(|| Error::invalid(field.key(), "is not a valid product reference"))
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  fn fields<const N: usize>(pairs: [(ConfigField, &str); N]) -> ConfigFields {
    pairs.into_iter().collect()
  }

  fn validation_field(err: Error) -> &'static str {
    match err {
      Error::Validation { field, .. } => field,
      other => panic!("expected a validation error, got {other:?}"),
    }
  }

  #[test]
  fn keys_round_trip() {
    for field in ConfigField::iter() {
      assert_eq!(ConfigField::from_key(field.key()), Some(field));
    }
    assert_eq!(ConfigField::from_key("value"), None);
  }

  #[test]
  fn fixed_discount() {
    let config = build_config(
      PromotionType::FixedDiscount,
      &fields([
        (ConfigField::DiscountAmount, " 12.5 "),
        (ConfigField::ProductId, "3"),
      ]),
    )
    .unwrap();
    let PromotionConfig::FixedDiscount(fixed) = config else {
      panic!("wrong variant");
    };
    assert_eq!(fixed.discount_amount(), Decimal::new(125, 1));
    assert_eq!(fixed.product_id().get(), 3);
  }

  #[test]
  fn non_numeric_amount_is_rejected_not_zeroed() {
    let err = build_config(
      PromotionType::FixedDiscount,
      &fields([
        (ConfigField::DiscountAmount, "abc"),
        (ConfigField::ProductId, "1"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "discount_amount");
  }

  #[test]
  fn loose_numeric_forms_are_rejected() {
    for raw in ["12abc", "1_000", "1e3", "NaN", "", "   "] {
      let err = build_config(
        PromotionType::FixedDiscount,
        &fields([
          (ConfigField::DiscountAmount, raw),
          (ConfigField::ProductId, "1"),
        ]),
      )
      .unwrap_err();
      assert_eq!(validation_field(err), "discount_amount", "input {raw:?}");
    }
  }

  #[test]
  fn fixed_discount_must_be_positive() {
    for raw in ["0", "-5"] {
      let err = build_config(
        PromotionType::FixedDiscount,
        &fields([
          (ConfigField::DiscountAmount, raw),
          (ConfigField::ProductId, "1"),
        ]),
      )
      .unwrap_err();
      assert_eq!(validation_field(err), "discount_amount");
    }
  }

  #[test]
  fn percentage_zero_is_rejected() {
    let err = build_config(
      PromotionType::PercentageDiscount,
      &fields([
        (ConfigField::DiscountPercentage, "0"),
        (ConfigField::ProductId, "1"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "discount_percentage");
  }

  #[test]
  fn percentage_hundred_is_accepted() {
    let config = build_config(
      PromotionType::PercentageDiscount,
      &fields([
        (ConfigField::DiscountPercentage, "100"),
        (ConfigField::ProductId, "1"),
      ]),
    );
    assert!(config.is_ok());
  }

  #[test]
  fn percentage_above_hundred_is_rejected() {
    let err = build_config(
      PromotionType::PercentageDiscount,
      &fields([
        (ConfigField::DiscountPercentage, "100.5"),
        (ConfigField::ProductId, "1"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "discount_percentage");
  }

  #[test]
  fn missing_product_is_reported() {
    let err = build_config(
      PromotionType::PercentageDiscount,
      &fields([(ConfigField::DiscountPercentage, "10")]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "product_id");
  }

  #[test]
  fn product_zero_is_not_a_reference() {
    let err = build_config(
      PromotionType::FixedDiscount,
      &fields([
        (ConfigField::DiscountAmount, "1"),
        (ConfigField::ProductId, "0"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "product_id");
  }

  #[test]
  fn buy_x_get_y_same_product() {
    let config = build_config(
      PromotionType::BuyXGetY,
      &fields([
        (ConfigField::XProductId, "5"),
        (ConfigField::XProductAmount, "2"),
        (ConfigField::YProductId, "5"),
        (ConfigField::YProductAmount, "1"),
      ]),
    )
    .unwrap();
    assert_eq!(config.promotion_type(), PromotionType::BuyXGetY);
    assert_eq!(config.product_ids().len(), 2);
  }

  #[test]
  fn buy_x_get_y_reports_first_bad_field() {
    let err = build_config(
      PromotionType::BuyXGetY,
      &fields([
        (ConfigField::XProductId, "5"),
        (ConfigField::XProductAmount, "1.5"),
        (ConfigField::YProductId, ""),
        (ConfigField::YProductAmount, "0"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "x_product_amount");
  }

  #[test]
  fn buy_x_get_y_amount_zero() {
    let err = build_config(
      PromotionType::BuyXGetY,
      &fields([
        (ConfigField::XProductId, "5"),
        (ConfigField::XProductAmount, "1"),
        (ConfigField::YProductId, "6"),
        (ConfigField::YProductAmount, "0"),
      ]),
    )
    .unwrap_err();
    assert_eq!(validation_field(err), "y_product_amount");
  }

  #[test]
  fn fields_of_other_types_are_ignored() {
    let config = build_config(
      PromotionType::FixedDiscount,
      &fields([
        (ConfigField::DiscountAmount, "5"),
        (ConfigField::ProductId, "2"),
        (ConfigField::DiscountPercentage, "not used"),
        (ConfigField::XProductAmount, "x"),
      ]),
    );
    assert!(config.is_ok());
  }
}
