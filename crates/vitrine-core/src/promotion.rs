//! Promotions: the time-bounded discount and bundling rules managed by the
//! console.
//!
//! A promotion's `config` is stored by the service as an opaque string. The
//! typed view of it is [`PromotionConfig`], a sum type with one variant per
//! [`PromotionType`]; the two can only disagree on records read back from the
//! service, which is why [`Promotion::config`] decodes against the declared
//! type.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter};

use crate::{
  Error, Result,
  activity::{ActivityWindow, PromotionStatus},
  codec,
  dates::calendar_date,
};

/// Identifier assigned to a promotion by the service.
pub type PromotionId = u64;

// ─── Promotion type ──────────────────────────────────────────────────────────

/// The closed set of promotion kinds. Encoded on the wire as
/// `promotion_type_id`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter,
)]
pub enum PromotionType {
  #[strum(serialize = "FIXED_DISCOUNT")]
  FixedDiscount,
  #[strum(serialize = "PERCENTAGE_DISCOUNT")]
  PercentageDiscount,
  #[strum(serialize = "BUY_X_GET_Y")]
  BuyXGetY,
}

impl PromotionType {
  /// The integer tag used by the service.
  pub fn tag(self) -> u8 {
    match self {
      Self::FixedDiscount => 2,
      Self::PercentageDiscount => 3,
      Self::BuyXGetY => 4,
    }
  }

  pub fn from_tag(tag: i64) -> Result<Self> {
    match tag {
      2 => Ok(Self::FixedDiscount),
      3 => Ok(Self::PercentageDiscount),
      4 => Ok(Self::BuyXGetY),
      other => Err(Error::UnknownPromotionType(other)),
    }
  }

  /// Human-facing name for selectors and list badges.
  pub fn label(self) -> &'static str {
    match self {
      Self::FixedDiscount => "Fixed discount",
      Self::PercentageDiscount => "Percentage discount",
      Self::BuyXGetY => "Buy X get Y",
    }
  }
}

impl From<PromotionType> for u8 {
  fn from(value: PromotionType) -> Self { value.tag() }
}

impl Serialize for PromotionType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(self.tag())
  }
}

impl<'de> Deserialize<'de> for PromotionType {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    /// Older records carry the tag as a numeric string.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tag {
      Number(i64),
      Text(String),
    }

    let tag = match Tag::deserialize(deserializer)? {
      Tag::Number(n) => n,
      Tag::Text(s) => s.trim().parse().map_err(|_| {
        serde::de::Error::custom(format!("invalid promotion type tag: {s:?}"))
      })?,
    };
    Self::from_tag(tag).map_err(serde::de::Error::custom)
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A reference to a product. Always a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
  /// Returns `None` for zero, which the service never assigns.
  pub fn new(id: u64) -> Option<Self> { (id > 0).then_some(Self(id)) }

  pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl<'de> Deserialize<'de> for ProductId {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    Self::new(u64::deserialize(deserializer)?)
      .ok_or_else(|| serde::de::Error::custom("product id must be positive"))
  }
}

// ─── Config variants ─────────────────────────────────────────────────────────

/// A fixed amount taken off one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDiscount {
  discount_amount: Decimal,
  product_id:      ProductId,
}

impl FixedDiscount {
  /// Fails unless `discount_amount > 0`.
  pub fn new(discount_amount: Decimal, product_id: ProductId) -> Result<Self> {
    Ok(Self {
      discount_amount: check_discount_amount(discount_amount)?,
      product_id,
    })
  }

  pub fn discount_amount(&self) -> Decimal { self.discount_amount }

  pub fn product_id(&self) -> ProductId { self.product_id }
}

/// A percentage taken off one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageDiscount {
  discount_percentage: Decimal,
  product_id:          ProductId,
}

impl PercentageDiscount {
  /// Fails unless `0 < discount_percentage <= 100`.
  pub fn new(discount_percentage: Decimal, product_id: ProductId) -> Result<Self> {
    Ok(Self {
      discount_percentage: check_discount_percentage(discount_percentage)?,
      product_id,
    })
  }

  pub fn discount_percentage(&self) -> Decimal { self.discount_percentage }

  pub fn product_id(&self) -> ProductId { self.product_id }
}

/// Buying `x_product_amount` of X yields `y_product_amount` of Y. X and Y
/// may be the same product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyXGetY {
  x_product_id:     ProductId,
  x_product_amount: u32,
  y_product_id:     ProductId,
  y_product_amount: u32,
}

impl BuyXGetY {
  /// Fails unless both amounts are at least 1.
  pub fn new(
    x_product_id: ProductId,
    x_product_amount: u32,
    y_product_id: ProductId,
    y_product_amount: u32,
  ) -> Result<Self> {
    Ok(Self {
      x_product_id,
      x_product_amount: check_amount("x_product_amount", x_product_amount)?,
      y_product_id,
      y_product_amount: check_amount("y_product_amount", y_product_amount)?,
    })
  }

  pub fn x_product_id(&self) -> ProductId { self.x_product_id }

  pub fn x_product_amount(&self) -> u32 { self.x_product_amount }

  pub fn y_product_id(&self) -> ProductId { self.y_product_id }

  pub fn y_product_amount(&self) -> u32 { self.y_product_amount }
}

pub(crate) fn check_discount_amount(amount: Decimal) -> Result<Decimal> {
  if amount > Decimal::ZERO {
    Ok(amount)
  } else {
    Err(Error::invalid("discount_amount", "must be greater than zero"))
  }
}

pub(crate) fn check_discount_percentage(percentage: Decimal) -> Result<Decimal> {
  if percentage > Decimal::ZERO && percentage <= Decimal::ONE_HUNDRED {
    Ok(percentage)
  } else {
    Err(Error::invalid(
      "discount_percentage",
      "must be greater than 0 and at most 100",
    ))
  }
}

pub(crate) fn check_amount(field: &'static str, amount: u32) -> Result<u32> {
  if amount >= 1 {
    Ok(amount)
  } else {
    Err(Error::invalid(field, "must be at least 1"))
  }
}

/// The type-specific payload of a promotion. Exactly one variant exists per
/// [`PromotionType`], so a config can never carry another type's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionConfig {
  FixedDiscount(FixedDiscount),
  PercentageDiscount(PercentageDiscount),
  BuyXGetY(BuyXGetY),
}

impl PromotionConfig {
  pub fn promotion_type(&self) -> PromotionType {
    match self {
      Self::FixedDiscount(_) => PromotionType::FixedDiscount,
      Self::PercentageDiscount(_) => PromotionType::PercentageDiscount,
      Self::BuyXGetY(_) => PromotionType::BuyXGetY,
    }
  }

  /// Every product this config points at, in field order.
  pub fn product_ids(&self) -> Vec<ProductId> {
    match self {
      Self::FixedDiscount(c) => vec![c.product_id],
      Self::PercentageDiscount(c) => vec![c.product_id],
      Self::BuyXGetY(c) => vec![c.x_product_id, c.y_product_id],
    }
  }
}

// ─── Promotion ───────────────────────────────────────────────────────────────

/// A promotion as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
  pub id:             PromotionId,
  pub name:           String,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub description:    Option<String>,
  #[serde(with = "calendar_date")]
  pub start_date:     NaiveDate,
  #[serde(default, with = "calendar_date::option")]
  pub end_date:       Option<NaiveDate>,
  /// The user who created the promotion; opaque to the console.
  #[serde(default, alias = "user_id")]
  pub owner_id:       Option<u64>,
  #[serde(rename = "promotion_type_id")]
  pub promotion_type: PromotionType,
  /// The serialized config blob, decoded on demand by [`Promotion::config`].
  #[serde(deserialize_with = "config_blob")]
  pub config:         String,
}

impl Promotion {
  /// Decode the stored config against the declared type.
  pub fn config(&self) -> Result<PromotionConfig> {
    codec::decode_config(self.promotion_type, &self.config)
  }

  pub fn window(&self) -> ActivityWindow {
    ActivityWindow::new(self.start_date, self.end_date)
  }

  /// Whether the promotion is in effect at `now`, compared by calendar date
  /// in `now`'s own time zone.
  pub fn is_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
    self.is_active_on(now.date_naive())
  }

  pub fn is_active_on(&self, today: NaiveDate) -> bool {
    self.window().contains(today)
  }

  pub fn status_on(&self, today: NaiveDate) -> PromotionStatus {
    self.window().status_on(today)
  }
}

fn blank_as_none<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<String>, D::Error> {
  Ok(
    Option::<String>::deserialize(deserializer)?
      .filter(|s| !s.trim().is_empty()),
  )
}

/// Accept the blob either as the documented string or, from services that
/// cast the column, as an already-decoded object.
fn config_blob<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<String, D::Error> {
  match serde_json::Value::deserialize(deserializer)? {
    serde_json::Value::String(s) => Ok(s),
    other => Ok(other.to_string()),
  }
}

// ─── NewPromotion ────────────────────────────────────────────────────────────

/// Create and update payload. Updates replace the whole record, config
/// included. The type tag is derived from `config` when serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromotion {
  pub name:        String,
  pub description: Option<String>,
  pub start_date:  NaiveDate,
  pub end_date:    Option<NaiveDate>,
  pub config:      PromotionConfig,
}

impl NewPromotion {
  /// Convenience constructor with no description and no end date.
  pub fn new(
    name: impl Into<String>,
    start_date: NaiveDate,
    config: PromotionConfig,
  ) -> Self {
    Self {
      name: name.into(),
      description: None,
      start_date,
      end_date: None,
      config,
    }
  }

  pub fn promotion_type(&self) -> PromotionType { self.config.promotion_type() }
}

impl Serialize for NewPromotion {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Payload<'a> {
      name:              &'a str,
      #[serde(skip_serializing_if = "Option::is_none")]
      description:       Option<&'a str>,
      #[serde(with = "calendar_date")]
      start_date:        NaiveDate,
      #[serde(
        skip_serializing_if = "Option::is_none",
        with = "calendar_date::option"
      )]
      end_date:          Option<NaiveDate>,
      promotion_type_id: u8,
      config:            String,
    }

    Payload {
      name:              &self.name,
      description:       self.description.as_deref(),
      start_date:        self.start_date,
      end_date:          self.end_date,
      promotion_type_id: self.promotion_type().tag(),
      config:            codec::serialize_config(&self.config),
    }
    .serialize(serializer)
  }
}
