//! Application state machine and event dispatcher.

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use strum::IntoEnumIterator;
use vitrine_core::{
  actions::{Catalog, Outcome},
  activity::{PromotionStatus, ValueFormatter},
  api::Resources,
  form::{
    FormAction, FormErrors, FormField, ProductField, ProductForm, PromotionForm,
  },
  product::{Condition, Product, ProductRef},
  promotion::{ProductId, Promotion, PromotionId, PromotionType},
  remote::{HttpClient, Notifier},
};

use crate::{notifier::StatusNotifier, session::User};

// ─── Screen ───────────────────────────────────────────────────────────────────

/// Sidebar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Dashboard,
  Products,
  Promotions,
}

impl Screen {
  pub const ALL: [Self; 3] = [Self::Dashboard, Self::Products, Self::Promotions];

  pub fn title(self) -> &'static str {
    match self {
      Self::Dashboard => "Dashboard",
      Self::Products => "Products",
      Self::Promotions => "Promotions",
    }
  }

  fn index(self) -> usize {
    Self::ALL.iter().position(|s| *s == self).unwrap_or_default()
  }

  fn offset(self, by: isize) -> Self {
    let len = Self::ALL.len() as isize;
    Self::ALL[(self.index() as isize + by).rem_euclid(len) as usize]
  }
}

// ─── Dialogs ──────────────────────────────────────────────────────────────────

pub struct PromotionDialog {
  pub form:     PromotionForm,
  pub editing:  Option<PromotionId>,
  /// Index into the form's visible fields.
  pub focus:    usize,
  pub errors:   FormErrors<FormField>,
  pub busy:     bool,
  /// Choices for the product selectors, fetched when the dialog opens.
  pub products: Vec<ProductRef>,
}

impl PromotionDialog {
  pub fn focused(&self) -> Option<FormField> {
    self.form.visible_fields().get(self.focus).copied()
  }

  /// Display text for a product reference held in the form.
  pub fn product_label(&self, raw: &str) -> String {
    let id = raw.trim().parse().ok().and_then(ProductId::new);
    match id {
      Some(id) => match self.products.iter().find(|p| p.id == id) {
        Some(product) => format!("{} (#{id})", product.name),
        None => format!("#{id}"),
      },
      None => "(none)".to_owned(),
    }
  }

  fn cycle_product(&mut self, field: FormField, forward: bool) {
    let ids: Vec<ProductId> = self.products.iter().map(|p| p.id).collect();
    let current = self.form.value(field).trim().parse().ok().and_then(ProductId::new);
    if let Some(next) = cycle(&ids, current, forward) {
      self.form.dispatch(FormAction::set(field, next.to_string()));
    }
  }
}

pub struct ProductDialog {
  pub form:    ProductForm,
  pub editing: Option<ProductId>,
  pub focus:   usize,
  pub errors:  FormErrors<ProductField>,
  pub busy:    bool,
}

impl ProductDialog {
  pub fn focused(&self) -> ProductField {
    ProductField::ALL[self.focus.min(ProductField::ALL.len() - 1)]
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
  Promotion { id: PromotionId, name: String },
  Product { id: ProductId, name: String },
}

impl DeleteTarget {
  pub fn describe(&self) -> String {
    match self {
      Self::Promotion { name, .. } => format!("promotion \"{name}\""),
      Self::Product { name, .. } => format!("product \"{name}\""),
    }
  }
}

pub enum Dialog {
  Promotion(PromotionDialog),
  Product(ProductDialog),
  ConfirmDelete(DeleteTarget),
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
  pub products:             usize,
  pub available_products:   usize,
  pub promotions:           usize,
  pub active_promotions:    usize,
  pub scheduled_promotions: usize,
  pub expired_promotions:   usize,
}

impl DashboardStats {
  pub fn compute(
    products: &[Product],
    promotions: &[Promotion],
    today: NaiveDate,
  ) -> Self {
    let mut stats = Self {
      products: products.len(),
      available_products: products.iter().filter(|p| p.available).count(),
      promotions: promotions.len(),
      ..Self::default()
    };
    for promotion in promotions {
      match promotion.status_on(today) {
        PromotionStatus::Active => stats.active_promotions += 1,
        PromotionStatus::Scheduled => stats.scheduled_promotions += 1,
        PromotionStatus::Expired => stats.expired_promotions += 1,
      }
    }
    stats
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<C> {
  /// Current sidebar screen.
  pub screen: Screen,

  /// Fetched lists and the action layer over the service.
  pub catalog: Catalog<C, StatusNotifier>,

  /// Shared with the catalog; read by the status bar.
  pub notifier: StatusNotifier,

  pub formatter: ValueFormatter,

  /// The logged-in user, shown in the header.
  pub user: Option<User>,

  /// The date promotion windows are evaluated against.
  pub today: NaiveDate,

  /// Current fuzzy-filter string (only active when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the *filtered* list of the current screen.
  pub list_cursor: usize,

  /// The open modal, if any. Keys go to it first.
  pub dialog: Option<Dialog>,

  /// Set when the service rejected the session; the caller should clear it.
  pub session_expired: bool,
}

impl<C: HttpClient> App<C> {
  pub fn new(
    client: C,
    notifier: StatusNotifier,
    formatter: ValueFormatter,
    user: Option<User>,
  ) -> Self {
    Self {
      screen: Screen::Dashboard,
      catalog: Catalog::new(Resources::new(client), notifier.clone()),
      notifier,
      formatter,
      user,
      today: Local::now().date_naive(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      dialog: None,
      session_expired: false,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Re-fetch everything.
  pub async fn reload(&mut self) {
    self.today = Local::now().date_naive();
    self.catalog.reload().await;
    self.clamp_cursor();
    self.check_session();
  }

  fn check_session(&mut self) {
    if self.catalog.take_unauthorized() {
      self.session_expired = true;
    }
  }

  // ── Filtered lists ────────────────────────────────────────────────────────

  pub fn filtered_promotions(&self) -> Vec<&Promotion> {
    filter_by_name(self.catalog.promotions(), &self.filter, |p| &p.name)
  }

  pub fn filtered_products(&self) -> Vec<&Product> {
    filter_by_name(self.catalog.products(), &self.filter, |p| &p.name)
  }

  fn list_len(&self) -> usize {
    match self.screen {
      Screen::Dashboard => 0,
      Screen::Products => self.filtered_products().len(),
      Screen::Promotions => self.filtered_promotions().len(),
    }
  }

  fn clamp_cursor(&mut self) {
    self.list_cursor = self.list_cursor.min(self.list_len().saturating_sub(1));
  }

  pub fn cursor_promotion(&self) -> Option<&Promotion> {
    self.filtered_promotions().get(self.list_cursor).copied()
  }

  pub fn cursor_product(&self) -> Option<&Product> {
    self.filtered_products().get(self.list_cursor).copied()
  }

  pub fn stats(&self) -> DashboardStats {
    DashboardStats::compute(
      self.catalog.products(),
      self.catalog.promotions(),
      self.today,
    )
  }

  /// Display text for a promotion's value; decode failures are shown inline.
  pub fn promotion_value(&self, promotion: &Promotion) -> String {
    self
      .formatter
      .format_value(promotion)
      .unwrap_or_else(|_| "invalid config".to_owned())
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.dialog.is_some() {
      self.handle_dialog_key(key).await;
    } else if self.filter_active {
      self.handle_filter_key(key);
    } else if !self.handle_screen_key(key).await {
      return Ok(false);
    }

    self.check_session();
    Ok(!self.session_expired)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.list_cursor = 0;
  }

  /// Returns `false` to quit.
  async fn handle_screen_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Sidebar
      KeyCode::Tab => self.switch_screen(self.screen.offset(1)),
      KeyCode::BackTab => self.switch_screen(self.screen.offset(-1)),
      KeyCode::Char(c @ '1'..='3') => {
        let index = c as usize - '1' as usize;
        self.switch_screen(Screen::ALL[index]);
      }

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.list_len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') if self.screen != Screen::Dashboard => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('r') => self.reload().await,
      KeyCode::Char('n') => self.open_new().await,
      KeyCode::Char('e') | KeyCode::Enter => self.open_edit().await,
      KeyCode::Char('d') => self.confirm_delete(),
      KeyCode::Esc => {
        self.filter.clear();
        self.notifier.dismiss();
      }
      _ => {}
    }
    true
  }

  fn switch_screen(&mut self, screen: Screen) {
    if self.screen != screen {
      self.screen = screen;
      self.filter.clear();
      self.list_cursor = 0;
    }
  }

  async fn open_new(&mut self) {
    self.dialog = match self.screen {
      Screen::Dashboard => None,
      Screen::Products => Some(Dialog::Product(ProductDialog {
        form:    ProductForm::new(),
        editing: None,
        focus:   0,
        errors:  FormErrors::new(),
        busy:    false,
      })),
      Screen::Promotions => {
        let mut form = PromotionForm::new();
        form.dispatch(FormAction::set(
          FormField::StartDate,
          self.today.format(vitrine_core::dates::DATE_FORMAT).to_string(),
        ));
        Some(self.promotion_dialog(form, None).await)
      }
    };
  }

  async fn open_edit(&mut self) {
    self.dialog = match self.screen {
      Screen::Dashboard => None,
      Screen::Products => self.cursor_product().map(|product| {
        Dialog::Product(ProductDialog {
          form:    ProductForm::from_product(product),
          editing: Some(product.id),
          focus:   0,
          errors:  FormErrors::new(),
          busy:    false,
        })
      }),
      Screen::Promotions => {
        let Some(promotion) = self.cursor_promotion() else {
          return;
        };
        let id = promotion.id;
        match PromotionForm::from_promotion(promotion) {
          Ok(form) => Some(self.promotion_dialog(form, Some(id)).await),
          Err(error) => {
            tracing::error!(%error, id, "stored promotion cannot be edited");
            self.notifier.error("This promotion's configuration is invalid");
            None
          }
        }
      }
    };
  }

  async fn promotion_dialog(
    &mut self,
    form: PromotionForm,
    editing: Option<PromotionId>,
  ) -> Dialog {
    Dialog::Promotion(PromotionDialog {
      form,
      editing,
      focus: 0,
      errors: FormErrors::new(),
      busy: false,
      products: self.catalog.product_options().await,
    })
  }

  fn confirm_delete(&mut self) {
    let target = match self.screen {
      Screen::Dashboard => None,
      Screen::Products => self.cursor_product().map(|p| DeleteTarget::Product {
        id:   p.id,
        name: p.name.clone(),
      }),
      Screen::Promotions => self.cursor_promotion().map(|p| DeleteTarget::Promotion {
        id:   p.id,
        name: p.name.clone(),
      }),
    };
    self.dialog = target.map(Dialog::ConfirmDelete);
  }

  // ── Dialogs ───────────────────────────────────────────────────────────────

  async fn handle_dialog_key(&mut self, key: KeyEvent) {
    let Some(dialog) = self.dialog.take() else {
      return;
    };
    self.dialog = match dialog {
      Dialog::ConfirmDelete(target) => self.handle_confirm_key(key, target).await,
      Dialog::Promotion(dialog) => self.handle_promotion_key(key, dialog).await,
      Dialog::Product(dialog) => self.handle_product_key(key, dialog).await,
    };
    self.clamp_cursor();
  }

  async fn handle_confirm_key(
    &mut self,
    key: KeyEvent,
    target: DeleteTarget,
  ) -> Option<Dialog> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => {
        match target {
          DeleteTarget::Promotion { id, .. } => {
            self.catalog.delete_promotion(id).await;
          }
          DeleteTarget::Product { id, .. } => {
            self.catalog.delete_product(id).await;
          }
        }
        None
      }
      KeyCode::Char('n') | KeyCode::Esc => None,
      _ => Some(Dialog::ConfirmDelete(target)),
    }
  }

  async fn handle_promotion_key(
    &mut self,
    key: KeyEvent,
    mut dialog: PromotionDialog,
  ) -> Option<Dialog> {
    if dialog.busy {
      return Some(Dialog::Promotion(dialog));
    }
    let visible = dialog.form.visible_fields().len();
    match key.code {
      KeyCode::Esc => return None,
      KeyCode::Enter => {
        dialog.busy = true;
        let outcome = self
          .catalog
          .save_promotion(&dialog.form, dialog.editing)
          .await;
        dialog.busy = false;
        match outcome {
          Outcome::Saved => return None,
          Outcome::Invalid(errors) => dialog.errors = errors,
          Outcome::Failed => dialog.errors = FormErrors::new(),
        }
      }
      KeyCode::Tab | KeyCode::Down => dialog.focus = (dialog.focus + 1) % visible,
      KeyCode::BackTab | KeyCode::Up => {
        dialog.focus = (dialog.focus + visible - 1) % visible;
      }
      KeyCode::Left | KeyCode::Right => {
        let forward = key.code == KeyCode::Right;
        match dialog.focused() {
          Some(FormField::PromotionType) => {
            let next = cycle(
              &PromotionType::iter().collect::<Vec<_>>(),
              dialog.form.promotion_type(),
              forward,
            );
            if let Some(next) = next {
              dialog.form.set_promotion_type(next);
            }
          }
          Some(field @ FormField::Config(config)) if config.is_product_reference() => {
            dialog.cycle_product(field, forward);
          }
          _ => {}
        }
      }
      KeyCode::Backspace => {
        if let Some(field) = dialog.focused().filter(|f| !f.is_selector()) {
          let mut value = dialog.form.value(field).to_owned();
          value.pop();
          dialog.form.dispatch(FormAction::set(field, value));
        }
      }
      KeyCode::Char(c) => {
        if let Some(field) = dialog.focused().filter(|f| !f.is_selector()) {
          let value = format!("{}{c}", dialog.form.value(field));
          dialog.form.dispatch(FormAction::set(field, value));
        }
      }
      _ => {}
    }
    let visible = dialog.form.visible_fields().len();
    dialog.focus = dialog.focus.min(visible - 1);
    Some(Dialog::Promotion(dialog))
  }

  async fn handle_product_key(
    &mut self,
    key: KeyEvent,
    mut dialog: ProductDialog,
  ) -> Option<Dialog> {
    if dialog.busy {
      return Some(Dialog::Product(dialog));
    }
    let fields = ProductField::ALL.len();
    match key.code {
      KeyCode::Esc => return None,
      KeyCode::Enter => {
        dialog.busy = true;
        let outcome = self.catalog.save_product(&dialog.form, dialog.editing).await;
        dialog.busy = false;
        match outcome {
          Outcome::Saved => return None,
          Outcome::Invalid(errors) => dialog.errors = errors,
          Outcome::Failed => dialog.errors = FormErrors::new(),
        }
      }
      KeyCode::Tab | KeyCode::Down => dialog.focus = (dialog.focus + 1) % fields,
      KeyCode::BackTab | KeyCode::Up => dialog.focus = (dialog.focus + fields - 1) % fields,
      KeyCode::Left | KeyCode::Right => {
        let forward = key.code == KeyCode::Right;
        match dialog.focused() {
          ProductField::Condition => {
            let conditions: Vec<Condition> = Condition::iter().collect();
            if let Some(next) = cycle(&conditions, dialog.form.condition(), forward) {
              dialog
                .form
                .dispatch(FormAction::set(ProductField::Condition, next.to_string()));
            }
          }
          ProductField::Available => {
            let available = dialog.form.available().unwrap_or(true);
            dialog
              .form
              .dispatch(FormAction::set(ProductField::Available, (!available).to_string()));
          }
          _ => {}
        }
      }
      KeyCode::Backspace => {
        let field = dialog.focused();
        if !field.is_selector() {
          let mut value = dialog.form.value(field).to_owned();
          value.pop();
          dialog.form.dispatch(FormAction::set(field, value));
        }
      }
      KeyCode::Char(c) => {
        let field = dialog.focused();
        if !field.is_selector() {
          let value = format!("{}{c}", dialog.form.value(field));
          dialog.form.dispatch(FormAction::set(field, value));
        }
      }
      _ => {}
    }
    Some(Dialog::Product(dialog))
  }
}

/// Step through `options` from `current`, wrapping. With no current value
/// the first (or last, going back) option is chosen.
fn cycle<T: Copy + PartialEq>(options: &[T], current: Option<T>, forward: bool) -> Option<T> {
  if options.is_empty() {
    return None;
  }
  let len = options.len();
  let next = match current.and_then(|c| options.iter().position(|o| *o == c)) {
    Some(i) if forward => (i + 1) % len,
    Some(i) => (i + len - 1) % len,
    None if forward => 0,
    None => len - 1,
  };
  Some(options[next])
}

fn filter_by_name<'a, T>(
  items: &'a [T],
  filter: &str,
  name: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
  if filter.is_empty() {
    return items.iter().collect();
  }
  let matcher = SkimMatcherV2::default();
  items
    .iter()
    .filter(|item| matcher.fuzzy_match(name(item), filter).is_some())
    .collect()
}
