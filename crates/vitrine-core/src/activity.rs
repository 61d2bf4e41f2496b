//! Activity windows and value display for promotions.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};

use crate::{
  Error, Result,
  product::Price,
  promotion::{Promotion, PromotionConfig},
};

// ─── Activity window ─────────────────────────────────────────────────────────

/// Where a date falls relative to a promotion's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionStatus {
  Scheduled,
  Active,
  Expired,
}

impl PromotionStatus {
  pub fn label(self) -> &'static str {
    match self {
      Self::Scheduled => "scheduled",
      Self::Active => "active",
      Self::Expired => "expired",
    }
  }
}

/// An inclusive range of calendar dates. No end means the window never
/// closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
  pub start: NaiveDate,
  pub end:   Option<NaiveDate>,
}

impl ActivityWindow {
  pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
    Self { start, end }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.status_on(date) == PromotionStatus::Active
  }

  pub fn status_on(&self, date: NaiveDate) -> PromotionStatus {
    if date < self.start {
      PromotionStatus::Scheduled
    } else if self.end.is_some_and(|end| date > end) {
      PromotionStatus::Expired
    } else {
      PromotionStatus::Active
    }
  }
}

// ─── Value formatting ────────────────────────────────────────────────────────

/// Renders promotion values and product prices in a single currency.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter {
  currency: &'static iso::Currency,
}

impl Default for ValueFormatter {
  fn default() -> Self { Self::new(iso::BRL) }
}

impl ValueFormatter {
  pub fn new(currency: &'static iso::Currency) -> Self { Self { currency } }

  /// Look a currency up by its ISO 4217 code, e.g. `"BRL"`.
  pub fn from_code(code: &str) -> Result<Self> {
    iso::find(&code.trim().to_uppercase())
      .map(Self::new)
      .ok_or_else(|| Error::UnknownCurrency(code.to_owned()))
  }

  pub fn currency(&self) -> &'static iso::Currency { self.currency }

  /// The human-readable value of a promotion, such as `R$10,00 off`,
  /// `15.00%` or `Buy 2 Get 1`.
  pub fn format_value(&self, promotion: &Promotion) -> Result<String> {
    Ok(self.format_config(&promotion.config()?))
  }

  pub fn format_config(&self, config: &PromotionConfig) -> String {
    match config {
      PromotionConfig::FixedDiscount(c) => {
        format!("{} off", self.money(c.discount_amount()))
      }
      PromotionConfig::PercentageDiscount(c) => {
        let shown = c
          .discount_percentage()
          .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{shown:.2}%")
      }
      PromotionConfig::BuyXGetY(c) => {
        format!("Buy {} Get {}", c.x_product_amount(), c.y_product_amount())
      }
    }
  }

  /// Prices are stored in minor units.
  pub fn format_price(&self, price: &Price) -> String {
    let major = price.price / Decimal::from(minor_per_major(self.currency));
    self.money(major)
  }

  fn money(&self, amount: Decimal) -> String {
    Money::from_decimal(amount, self.currency).to_string()
  }
}

fn minor_per_major(currency: &iso::Currency) -> u64 {
  10u64.pow(currency.exponent)
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::{FixedOffset, TimeZone, Utc};

  use super::*;
  use crate::promotion::PromotionType;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn promotion(
    start: NaiveDate,
    end: Option<NaiveDate>,
    promotion_type: PromotionType,
    config: &str,
  ) -> Promotion {
    Promotion {
      id: 1,
      name: "Test".into(),
      description: None,
      start_date: start,
      end_date: end,
      owner_id: None,
      promotion_type,
      config: config.into(),
    }
  }

  fn january() -> Promotion {
    promotion(
      date(2024, 1, 1),
      Some(date(2024, 1, 31)),
      PromotionType::FixedDiscount,
      r#"{"discount_amount":10,"product_id":1}"#,
    )
  }

  #[test]
  fn active_inside_window() {
    let p = january();
    assert!(p.is_active_on(date(2024, 1, 15)));
    assert!(p.is_active_on(date(2024, 1, 1)));
    assert!(p.is_active_on(date(2024, 1, 31)));
  }

  #[test]
  fn inactive_outside_window() {
    let p = january();
    assert!(!p.is_active_on(date(2024, 2, 1)));
    assert!(!p.is_active_on(date(2023, 12, 31)));
    assert_eq!(p.status_on(date(2023, 12, 31)), PromotionStatus::Scheduled);
    assert_eq!(p.status_on(date(2024, 2, 1)), PromotionStatus::Expired);
  }

  #[test]
  fn open_ended_never_expires() {
    let p = promotion(
      date(2024, 1, 1),
      None,
      PromotionType::FixedDiscount,
      r#"{"discount_amount":10,"product_id":1}"#,
    );
    assert!(p.is_active_on(date(2099, 1, 1)));
    assert_eq!(p.status_on(date(2023, 6, 1)), PromotionStatus::Scheduled);
  }

  #[test]
  fn is_active_uses_the_date_in_the_given_zone() {
    let p = january();
    // 2024-02-01 01:00 at UTC+3 is still 2024-01-31 in UTC.
    let tz = FixedOffset::east_opt(3 * 3600).unwrap();
    let local = tz.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap();
    assert!(!p.is_active(&local));
    assert!(p.is_active(&local.with_timezone(&Utc)));
  }

  #[test]
  fn percentage_has_two_decimals() {
    let p = promotion(
      date(2024, 1, 1),
      None,
      PromotionType::PercentageDiscount,
      r#"{"discount_percentage":15,"product_id":1}"#,
    );
    assert_eq!(ValueFormatter::default().format_value(&p).unwrap(), "15.00%");
  }

  #[test]
  fn percentage_rounds_half_away_from_zero() {
    let formatter = ValueFormatter::default();
    for (stored, shown) in [
      ("99.999", "100.00%"),
      ("12.345", "12.35%"),
      ("12.344", "12.34%"),
      ("0.0000001", "0.00%"),
    ] {
      let p = promotion(
        date(2024, 1, 1),
        None,
        PromotionType::PercentageDiscount,
        &format!(r#"{{"discount_percentage":{stored},"product_id":1}}"#),
      );
      assert_eq!(formatter.format_value(&p).unwrap(), shown, "stored {stored}");
    }
  }

  #[test]
  fn buy_x_get_y_phrase() {
    let p = promotion(
      date(2024, 1, 1),
      None,
      PromotionType::BuyXGetY,
      r#"{"x_product_id":1,"x_product_amount":2,"y_product_id":1,"y_product_amount":1}"#,
    );
    let text = ValueFormatter::default().format_value(&p).unwrap();
    assert_eq!(text, "Buy 2 Get 1");
  }

  #[test]
  fn fixed_discount_is_money_off() {
    let text = ValueFormatter::default().format_value(&january()).unwrap();
    assert!(text.contains("R$"), "{text}");
    assert!(text.contains("10"), "{text}");
    assert!(text.ends_with(" off"), "{text}");

    let text = ValueFormatter::from_code("usd")
      .unwrap()
      .format_value(&january())
      .unwrap();
    assert!(text.starts_with('$'), "{text}");
  }

  #[test]
  fn format_value_propagates_decode_errors() {
    let p = promotion(
      date(2024, 1, 1),
      None,
      PromotionType::FixedDiscount,
      r#"{"discount_percentage":10,"product_id":1}"#,
    );
    assert!(matches!(
      ValueFormatter::default().format_value(&p),
      Err(Error::TypeMismatch { .. })
    ));
  }

  #[test]
  fn unknown_currency() {
    assert!(matches!(
      ValueFormatter::from_code("XXQ"),
      Err(Error::UnknownCurrency(_))
    ));
  }

  #[test]
  fn price_in_minor_units() {
    let price = Price {
      price:      Decimal::from_str("129990").unwrap(),
      start_date: None,
      end_date:   None,
    };
    let text = ValueFormatter::from_code("USD").unwrap().format_price(&price);
    assert_eq!(text, "$1,299.90");
  }
}
