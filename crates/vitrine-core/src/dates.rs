//! Calendar-date handling for wire records.
//!
//! The service is not consistent about date encodings: the same column can
//! come back as `2024-01-31`, `2024-01-31 00:00:00` or
//! `2024-01-31T00:00:00.000000Z`. Only the calendar date written in the value
//! is kept; offsets are never applied.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used for dates in form inputs and request payloads.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse any of the accepted encodings into the calendar date it names.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, DATE_FORMAT)
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    .or_else(|| {
      NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
    })
}

/// Serde adapter for a required calendar date.
pub mod calendar_date {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  use super::{DATE_FORMAT, parse_calendar_date};

  pub fn serialize<S: Serializer>(
    date: &NaiveDate,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(DATE_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
      .ok_or_else(|| D::Error::custom(format!("invalid calendar date: {raw:?}")))
  }

  /// Serde adapter for an optional calendar date; `null`, a missing key and
  /// an empty string all mean "no date".
  pub mod option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use crate::dates::{DATE_FORMAT, parse_calendar_date};

    pub fn serialize<S: Serializer>(
      date: &Option<NaiveDate>,
      serializer: S,
    ) -> Result<S::Ok, S::Error> {
      match date {
        Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        None => serializer.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
      match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_calendar_date(&raw).map(Some).ok_or_else(|| {
          D::Error::custom(format!("invalid calendar date: {raw:?}"))
        }),
      }
    }
  }
}
