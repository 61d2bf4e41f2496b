//! The promotion dialog's form.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use strum::IntoEnumIterator;

use super::{FormAction, FormErrors};
use crate::{
  Error, Result,
  codec::parse_config,
  dates::DATE_FORMAT,
  fields::{ConfigField, ConfigFields, build_config},
  promotion::{NewPromotion, Promotion, PromotionConfig, PromotionType},
};

/// An input of the promotion form. Config inputs exist for every variant;
/// which of them are shown depends on the selected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
  Name,
  Description,
  StartDate,
  EndDate,
  PromotionType,
  Config(ConfigField),
}

impl FormField {
  pub fn label(self) -> &'static str {
    match self {
      Self::Name => "Name",
      Self::Description => "Description",
      Self::StartDate => "Start date",
      Self::EndDate => "End date",
      Self::PromotionType => "Promotion type",
      Self::Config(field) => field.label(),
    }
  }

  /// Whether the field takes its value from a fixed set of choices rather
  /// than typed text.
  pub fn is_selector(self) -> bool {
    match self {
      Self::PromotionType => true,
      Self::Config(field) => field.is_product_reference(),
      _ => false,
    }
  }
}

const BASE_FIELDS: [FormField; 5] = [
  FormField::Name,
  FormField::Description,
  FormField::StartDate,
  FormField::EndDate,
  FormField::PromotionType,
];

pub type PromotionAction = FormAction<FormField>;

/// Raw form state. The promotion type is held as its wire tag, the dates as
/// `YYYY-MM-DD` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionForm {
  values: BTreeMap<FormField, String>,
}

impl PromotionForm {
  pub fn new() -> Self { Self::default() }

  /// Populate the form from a stored promotion, config fields included.
  pub fn from_promotion(promotion: &Promotion) -> Result<Self> {
    let mut form = Self::new();
    form.dispatch(FormAction::set(FormField::Name, &promotion.name));
    if let Some(description) = &promotion.description {
      form.dispatch(FormAction::set(FormField::Description, description));
    }
    form.dispatch(FormAction::set(
      FormField::StartDate,
      promotion.start_date.format(DATE_FORMAT).to_string(),
    ));
    if let Some(end) = promotion.end_date {
      form.dispatch(FormAction::set(
        FormField::EndDate,
        end.format(DATE_FORMAT).to_string(),
      ));
    }
    form.set_promotion_type(promotion.promotion_type);

    for (field, value) in parse_config(promotion.promotion_type, &promotion.config)?.iter() {
      form.dispatch(FormAction::set(FormField::Config(field), value));
    }
    Ok(form)
  }

  pub fn dispatch(&mut self, action: PromotionAction) {
    match action {
      FormAction::Set { field, value } => {
        self.values.insert(field, value);
      }
      FormAction::Clear(field) => {
        self.values.remove(&field);
      }
      FormAction::Reset => self.values.clear(),
    }
  }

  /// The raw value of `field`; empty when unset.
  pub fn value(&self, field: FormField) -> &str {
    self.values.get(&field).map(String::as_str).unwrap_or_default()
  }

  pub fn promotion_type(&self) -> Option<PromotionType> {
    let tag = self.value(FormField::PromotionType).trim().parse().ok()?;
    PromotionType::from_tag(tag).ok()
  }

  pub fn set_promotion_type(&mut self, promotion_type: PromotionType) {
    self.dispatch(FormAction::set(
      FormField::PromotionType,
      promotion_type.tag().to_string(),
    ));
  }

  /// Fields shown for the current selection: the common fields, then the
  /// selected type's config fields.
  pub fn visible_fields(&self) -> Vec<FormField> {
    let config = self
      .promotion_type()
      .map(ConfigField::for_type)
      .unwrap_or_default();
    BASE_FIELDS
      .into_iter()
      .chain(config.iter().copied().map(FormField::Config))
      .collect()
  }

  /// Every config value held, including those of types not selected.
  pub fn config_fields(&self) -> ConfigFields {
    ConfigField::iter()
      .filter_map(|f| {
        self
          .values
          .get(&FormField::Config(f))
          .map(|v| (f, v.clone()))
      })
      .collect()
  }

  /// Validate the whole form into a create/update payload.
  pub fn submit(&self) -> Result<NewPromotion, FormErrors<FormField>> {
    let mut errors = FormErrors::new();

    let name = self.value(FormField::Name).trim();
    if name.is_empty() {
      errors.push(FormField::Name, "Name is required");
    }

    let description = self.value(FormField::Description).trim();
    let start = self.date(FormField::StartDate, &mut errors);
    if start.is_none() && errors.get(FormField::StartDate).is_none() {
      errors.push(FormField::StartDate, "Start date is required");
    }
    let end = self.date(FormField::EndDate, &mut errors);
    if matches!((start, end), (Some(start), Some(end)) if end < start) {
      errors.push(FormField::EndDate, "End date cannot be before the start date");
    }

    let config = match self.promotion_type() {
      Some(promotion_type) => self.config(promotion_type, &mut errors),
      None => {
        errors.push(FormField::PromotionType, "Promotion type is required");
        None
      }
    };

    match (start, config) {
      (Some(start_date), Some(config)) if errors.is_empty() => Ok(NewPromotion {
        name: name.to_owned(),
        description: (!description.is_empty()).then(|| description.to_owned()),
        start_date,
        end_date: end,
        config,
      }),
      _ => Err(errors),
    }
  }

  /// `None` for a blank input; a malformed one is recorded as an error.
  fn date(
    &self,
    field: FormField,
    errors: &mut FormErrors<FormField>,
  ) -> Option<NaiveDate> {
    let raw = self.value(field).trim();
    if raw.is_empty() {
      return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
      Ok(date) => Some(date),
      Err(_) => {
        errors.push(field, format!("{} must be a date (YYYY-MM-DD)", field.label()));
        None
      }
    }
  }

  fn config(
    &self,
    promotion_type: PromotionType,
    errors: &mut FormErrors<FormField>,
  ) -> Option<PromotionConfig> {
    match build_config(promotion_type, &self.config_fields()) {
      Ok(config) => Some(config),
      Err(Error::Validation { field, reason }) => {
        let field = ConfigField::from_key(field)
          .map(FormField::Config)
          .unwrap_or(FormField::PromotionType);
        errors.push(field, format!("{} {reason}", field.label()));
        None
      }
      Err(other) => {
        errors.push(FormField::PromotionType, other.to_string());
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal::Decimal;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn filled() -> PromotionForm {
    let mut form = PromotionForm::new();
    form.dispatch(FormAction::set(FormField::Name, "Summer"));
    form.dispatch(FormAction::set(FormField::StartDate, "2024-01-01"));
    form.dispatch(FormAction::set(FormField::EndDate, "2024-01-31"));
    form.set_promotion_type(PromotionType::FixedDiscount);
    form.dispatch(FormAction::set(
      FormField::Config(ConfigField::DiscountAmount),
      "12.50",
    ));
    form.dispatch(FormAction::set(
      FormField::Config(ConfigField::ProductId),
      "3",
    ));
    form
  }

  #[test]
  fn dispatch_updates_one_field() {
    let mut form = filled();
    form.dispatch(FormAction::set(FormField::Name, "Winter"));
    assert_eq!(form.value(FormField::Name), "Winter");
    assert_eq!(form.value(FormField::StartDate), "2024-01-01");

    form.dispatch(FormAction::Clear(FormField::EndDate));
    assert_eq!(form.value(FormField::EndDate), "");

    form.dispatch(FormAction::Reset);
    assert_eq!(form, PromotionForm::new());
  }

  #[test]
  fn visible_fields_follow_type() {
    let mut form = PromotionForm::new();
    assert_eq!(form.visible_fields(), BASE_FIELDS.to_vec());

    form.set_promotion_type(PromotionType::BuyXGetY);
    let visible = form.visible_fields();
    assert_eq!(visible.len(), BASE_FIELDS.len() + 4);
    assert!(visible.contains(&FormField::Config(ConfigField::YProductAmount)));
    assert!(!visible.contains(&FormField::Config(ConfigField::ProductId)));

    form.set_promotion_type(PromotionType::PercentageDiscount);
    assert!(
      form
        .visible_fields()
        .contains(&FormField::Config(ConfigField::DiscountPercentage))
    );
  }

  #[test]
  fn submit_builds_payload() {
    let promotion = filled().submit().unwrap();
    assert_eq!(promotion.name, "Summer");
    assert_eq!(promotion.description, None);
    assert_eq!(promotion.start_date, date(2024, 1, 1));
    assert_eq!(promotion.end_date, Some(date(2024, 1, 31)));
    let PromotionConfig::FixedDiscount(config) = promotion.config else {
      panic!("wrong variant");
    };
    assert_eq!(config.discount_amount(), Decimal::new(1250, 2));
  }

  #[test]
  fn submit_requires_name_and_start() {
    let mut form = filled();
    form.dispatch(FormAction::set(FormField::Name, "   "));
    form.dispatch(FormAction::Clear(FormField::StartDate));
    form.dispatch(FormAction::Clear(FormField::EndDate));

    let errors = form.submit().unwrap_err();
    assert_eq!(errors.get(FormField::Name), Some("Name is required"));
    assert_eq!(
      errors.get(FormField::StartDate),
      Some("Start date is required")
    );
  }

  #[test]
  fn submit_rejects_end_before_start() {
    let mut form = filled();
    form.dispatch(FormAction::set(FormField::EndDate, "2023-12-31"));
    let errors = form.submit().unwrap_err();
    assert!(errors.get(FormField::EndDate).is_some());
    assert_eq!(errors.len(), 1);
  }

  #[test]
  fn submit_rejects_malformed_date() {
    let mut form = filled();
    form.dispatch(FormAction::set(FormField::StartDate, "01/02/2024"));
    let errors = form.submit().unwrap_err();
    assert!(errors.get(FormField::StartDate).is_some());
  }

  #[test]
  fn submit_requires_type() {
    let mut form = filled();
    form.dispatch(FormAction::Clear(FormField::PromotionType));
    let errors = form.submit().unwrap_err();
    assert_eq!(
      errors.get(FormField::PromotionType),
      Some("Promotion type is required")
    );
  }

  #[test]
  fn config_errors_point_at_the_input() {
    let mut form = filled();
    form.dispatch(FormAction::set(
      FormField::Config(ConfigField::DiscountAmount),
      "abc",
    ));
    let errors = form.submit().unwrap_err();
    assert_eq!(
      errors.get(FormField::Config(ConfigField::DiscountAmount)),
      Some("Discount amount is not a number")
    );
  }

  #[test]
  fn switching_type_keeps_hidden_values() {
    let mut form = filled();
    form.set_promotion_type(PromotionType::PercentageDiscount);
    form.dispatch(FormAction::set(
      FormField::Config(ConfigField::DiscountPercentage),
      "100",
    ));
    let promotion = form.submit().unwrap();
    assert_eq!(promotion.promotion_type(), PromotionType::PercentageDiscount);
    assert_eq!(
      form.value(FormField::Config(ConfigField::DiscountAmount)),
      "12.50"
    );
  }

  #[test]
  fn populated_from_stored_promotion() {
    let promotion: Promotion = serde_json::from_value(serde_json::json!({
      "id": 3,
      "name": "Bundle",
      "description": "Two for one",
      "start_date": "2024-05-01T00:00:00.000000Z",
      "end_date": null,
      "promotion_type_id": 4,
      "config": "{\"x_product_id\":8,\"x_product_amount\":2,\"y_product_id\":8,\"y_product_amount\":1}"
    }))
    .unwrap();

    let form = PromotionForm::from_promotion(&promotion).unwrap();
    assert_eq!(form.value(FormField::Name), "Bundle");
    assert_eq!(form.value(FormField::Description), "Two for one");
    assert_eq!(form.value(FormField::StartDate), "2024-05-01");
    assert_eq!(form.value(FormField::EndDate), "");
    assert_eq!(form.promotion_type(), Some(PromotionType::BuyXGetY));
    assert_eq!(
      form.value(FormField::Config(ConfigField::XProductAmount)),
      "2"
    );

    let resubmitted = form.submit().unwrap();
    assert_eq!(resubmitted.config, promotion.config().unwrap());
    assert_eq!(resubmitted.description.as_deref(), Some("Two for one"));
  }
}
