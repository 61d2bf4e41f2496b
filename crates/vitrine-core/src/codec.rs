//! The config blob: a JSON object carried by the service as a string.
//!
//! Keys are the snake-case [`ConfigField`] names. Decimals are written as
//! JSON numbers in their exact decimal text, ids and amounts as integers.
//! Numbers are read back from their raw text so no value passes through
//! `f64`.

use std::{collections::BTreeMap, str::FromStr};

use rust_decimal::Decimal;
use serde_json::{Value, value::RawValue};

use crate::{
  Error, Result,
  fields::{ConfigField, ConfigFields, build_config},
  promotion::{PromotionConfig, PromotionType},
};

/// Encode a config as a compact JSON object string with sorted keys.
pub fn serialize_config(config: &PromotionConfig) -> String {
  let mut object = BTreeMap::new();
  let mut put = |field: ConfigField, number: String| {
    object.insert(field.key(), number);
  };

  match config {
    PromotionConfig::FixedDiscount(c) => {
      put(ConfigField::DiscountAmount, decimal_text(c.discount_amount()));
      put(ConfigField::ProductId, c.product_id().to_string());
    }
    PromotionConfig::PercentageDiscount(c) => {
      put(
        ConfigField::DiscountPercentage,
        decimal_text(c.discount_percentage()),
      );
      put(ConfigField::ProductId, c.product_id().to_string());
    }
    PromotionConfig::BuyXGetY(c) => {
      put(ConfigField::XProductId, c.x_product_id().to_string());
      put(ConfigField::XProductAmount, c.x_product_amount().to_string());
      put(ConfigField::YProductId, c.y_product_id().to_string());
      put(ConfigField::YProductAmount, c.y_product_amount().to_string());
    }
  }

  // Keys are fixed identifiers and values are plain decimal numerals, so
  // both are valid JSON tokens as written.
  let members: Vec<String> = object
    .into_iter()
    .map(|(key, number)| format!("{}:{number}", Value::from(key)))
    .collect();
  format!("{{{}}}", members.join(","))
}

/// Plain decimal notation without trailing zeros; never an exponent.
fn decimal_text(value: Decimal) -> String { value.normalize().to_string() }

/// Expand a blob into raw field values for `promotion_type`.
///
/// Fails with [`Error::MalformedConfig`] when the blob is not a JSON object
/// and with [`Error::TypeMismatch`] when it carries a key that does not
/// belong to `promotion_type`.
pub fn parse_config(
  promotion_type: PromotionType,
  blob: &str,
) -> Result<ConfigFields> {
  let object: BTreeMap<String, Box<RawValue>> = serde_json::from_str(blob)
    .map_err(|e| Error::MalformedConfig(e.to_string()))?;

  let allowed = ConfigField::for_type(promotion_type);
  let mismatch = |key: &str| Error::TypeMismatch {
    promotion_type,
    field: key.to_owned(),
  };

  let mut fields = ConfigFields::new();
  for (key, raw) in object {
    let field = ConfigField::from_key(&key)
      .filter(|f| allowed.contains(f))
      .ok_or_else(|| mismatch(&key))?;
    let value: Value = serde_json::from_str(raw.get())
      .map_err(|e| Error::MalformedConfig(e.to_string()))?;
    match value {
      Value::Null => {}
      Value::Number(_) => fields.set(field, number_text(raw.get().trim())),
      Value::String(s) => fields.set(field, s),
      Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
        return Err(mismatch(&key));
      }
    }
  }
  Ok(fields)
}

/// The normalized decimal text of a JSON numeral. Exponent forms written by
/// other clients are expanded; numerals outside the decimal range are kept
/// verbatim for validation to reject.
fn number_text(raw: &str) -> String {
  Decimal::from_str(raw)
    .or_else(|_| Decimal::from_scientific(raw))
    .map(decimal_text)
    .unwrap_or_else(|_| raw.to_owned())
}

/// Parse and validate a stored blob. Stored data that fails validation is
/// corrupt rather than a user mistake, so it surfaces as
/// [`Error::MalformedConfig`].
pub fn decode_config(
  promotion_type: PromotionType,
  blob: &str,
) -> Result<PromotionConfig> {
  let fields = parse_config(promotion_type, blob)?;
  build_config(promotion_type, &fields).map_err(|e| match e {
    Error::Validation { .. } => Error::MalformedConfig(e.to_string()),
    other => other,
  })
}

impl PromotionConfig {
  /// The raw field values that [`build_config`] turns back into this config.
  pub fn to_fields(&self) -> ConfigFields {
    use ConfigField as F;

    let text = |d: Decimal| d.normalize().to_string();
    match self {
      Self::FixedDiscount(c) => ConfigFields::new()
        .with(F::DiscountAmount, text(c.discount_amount()))
        .with(F::ProductId, c.product_id().to_string()),
      Self::PercentageDiscount(c) => ConfigFields::new()
        .with(F::DiscountPercentage, text(c.discount_percentage()))
        .with(F::ProductId, c.product_id().to_string()),
      Self::BuyXGetY(c) => ConfigFields::new()
        .with(F::XProductId, c.x_product_id().to_string())
        .with(F::XProductAmount, c.x_product_amount().to_string())
        .with(F::YProductId, c.y_product_id().to_string())
        .with(F::YProductAmount, c.y_product_amount().to_string()),
    }
  }
}
