//! Catalog products, as listed by the service and referenced by promotions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter};

use crate::{dates::calendar_date, promotion::ProductId};

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
  #[default]
  New,
  Used,
}

impl Condition {
  pub fn label(self) -> &'static str {
    match self {
      Self::New => "New",
      Self::Used => "Used",
    }
  }
}

/// The current price of a product, in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
  pub price:      Decimal,
  #[serde(default, with = "calendar_date::option")]
  pub start_date: Option<NaiveDate>,
  #[serde(default, with = "calendar_date::option")]
  pub end_date:   Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id:          ProductId,
  pub name:        String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub description: String,
  #[serde(default)]
  pub condition:   Condition,
  #[serde(default, deserialize_with = "lenient_bool")]
  pub available:   bool,
  #[serde(default)]
  pub image:       Option<String>,
  #[serde(default)]
  pub user_id:     Option<u64>,
  #[serde(default)]
  pub price:       Option<Price>,
}

/// The projection offered by product selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRef {
  pub id:   ProductId,
  pub name: String,
}

impl From<&Product> for ProductRef {
  fn from(product: &Product) -> Self {
    Self {
      id:   product.id,
      name: product.name.clone(),
    }
  }
}

/// Create and update payload. Images are managed outside the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
  pub name:        String,
  pub description: String,
  pub condition:   Condition,
  pub available:   bool,
}

impl From<&Product> for NewProduct {
  fn from(product: &Product) -> Self {
    Self {
      name:        product.name.clone(),
      description: product.description.clone(),
      condition:   product.condition,
      available:   product.available,
    }
  }
}

fn null_as_empty<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<String, D::Error> {
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The service stores availability as a tinyint, so `1`, `"1"` and `true`
/// all mean available.
fn lenient_bool<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<bool, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
  }

  Ok(match Option::<Flag>::deserialize(deserializer)? {
    None => false,
    Some(Flag::Bool(b)) => b,
    Some(Flag::Int(n)) => n != 0,
    Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true"),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn deserialise_record_from_service() {
    let product: Product = serde_json::from_value(json!({
      "id": 5,
      "name": "Bicycle",
      "description": null,
      "condition": "used",
      "available": 1,
      "image": "products/bike.png",
      "user_id": 2,
      "price": {
        "id": 9,
        "product_id": 5,
        "price": "45000",
        "start_date": "2024-01-01 00:00:00",
        "end_date": null
      },
      "created_at": "2024-01-01T00:00:00.000000Z"
    }))
    .unwrap();

    assert_eq!(product.id.get(), 5);
    assert_eq!(product.description, "");
    assert_eq!(product.condition, Condition::Used);
    assert!(product.available);
    let price = product.price.unwrap();
    assert_eq!(price.price, Decimal::from(45000));
    assert_eq!(price.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert_eq!(price.end_date, None);
  }

  #[test]
  fn availability_flags() {
    for (raw, expected) in [
      (json!(true), true),
      (json!(0), false),
      (json!("1"), true),
      (json!("0"), false),
      (json!(null), false),
    ] {
      let product: Product =
        serde_json::from_value(json!({ "id": 1, "name": "x", "available": raw }))
          .unwrap();
      assert_eq!(product.available, expected);
    }
  }

  #[test]
  fn payload_shape() {
    let payload = NewProduct {
      name:        "Lamp".into(),
      description: "Desk lamp".into(),
      condition:   Condition::New,
      available:   false,
    };
    assert_eq!(
      serde_json::to_value(&payload).unwrap(),
      json!({
        "name": "Lamp",
        "description": "Desk lamp",
        "condition": "new",
        "available": false
      })
    );
  }

  #[test]
  fn reference_projection() {
    let product: Product =
      serde_json::from_value(json!({ "id": 3, "name": "Chair" })).unwrap();
    let reference = ProductRef::from(&product);
    assert_eq!(reference.id.get(), 3);
    assert_eq!(reference.name, "Chair");
    assert!(serde_json::from_value::<Product>(json!({ "id": 0, "name": "x" })).is_err());
  }
}
