//! User actions: validate, call the service, notify, refresh.
//!
//! [`Catalog`] keeps the last fetched promotion and product lists. Every
//! successful mutation re-fetches the affected list; failures are logged in
//! full and reported to the user with a generic message. No action panics or
//! retries.

use crate::{
  Error,
  api::Resources,
  form::{FormErrors, FormField, ProductField, ProductForm, PromotionForm},
  product::{Product, ProductRef},
  promotion::{ProductId, Promotion, PromotionId},
  remote::{HttpClient, NetworkError, Notifier, ProductLookup},
};

/// The result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<F> {
  Saved,
  /// Rejected before any network call.
  Invalid(FormErrors<F>),
  /// The service call failed; the user has been notified.
  Failed,
}

impl<F> Outcome<F> {
  pub fn is_saved(&self) -> bool { matches!(self, Self::Saved) }
}

pub struct Catalog<C, N> {
  resources:    Resources<C>,
  notifier:     N,
  promotions:   Vec<Promotion>,
  products:     Vec<Product>,
  /// Set when any call was refused for lack of a valid session.
  unauthorized: bool,
}

impl<C: HttpClient, N: Notifier> Catalog<C, N> {
  pub fn new(resources: Resources<C>, notifier: N) -> Self {
    Self {
      resources,
      notifier,
      promotions: Vec::new(),
      products: Vec::new(),
      unauthorized: false,
    }
  }

  pub fn resources(&self) -> &Resources<C> { &self.resources }

  pub fn notifier(&self) -> &N { &self.notifier }

  pub fn promotions(&self) -> &[Promotion] { &self.promotions }

  pub fn products(&self) -> &[Product] { &self.products }

  /// Whether a call failed with 401 since the last check.
  pub fn take_unauthorized(&mut self) -> bool {
    std::mem::take(&mut self.unauthorized)
  }

  // ── Loading ───────────────────────────────────────────────────────────

  /// Re-fetch both lists. Returns `false` if either fetch failed.
  pub async fn reload(&mut self) -> bool {
    let products = self.reload_products().await;
    let promotions = self.reload_promotions().await;
    products && promotions
  }

  pub async fn reload_promotions(&mut self) -> bool {
    match self.resources.promotions().await {
      Ok(promotions) => {
        self.promotions = promotions;
        true
      }
      Err(error) => {
        self.fail(&error, "Could not load promotions");
        false
      }
    }
  }

  pub async fn reload_products(&mut self) -> bool {
    match self.resources.products().await {
      Ok(products) => {
        self.products = products;
        true
      }
      Err(error) => {
        self.fail(&error, "Could not load products");
        false
      }
    }
  }

  /// Fresh choices for a promotion's product selectors. Empty, with the
  /// user notified, when the lookup fails.
  pub async fn product_options(&mut self) -> Vec<ProductRef> {
    match ProductLookup::list(&self.resources).await {
      Ok(options) => options,
      Err(error) => {
        self.fail(&error, "Could not load products");
        Vec::new()
      }
    }
  }

  // ── Promotions ────────────────────────────────────────────────────────

  /// Create a promotion, or replace promotion `editing`.
  pub async fn save_promotion(
    &mut self,
    form: &PromotionForm,
    editing: Option<PromotionId>,
  ) -> Outcome<FormField> {
    let payload = match form.submit() {
      Ok(payload) => payload,
      Err(errors) => return Outcome::Invalid(errors),
    };

    let result = match editing {
      Some(id) => self.resources.update_promotion(id, &payload).await,
      None => self.resources.create_promotion(&payload).await,
    };
    match result {
      Ok(saved) => {
        tracing::info!(id = ?saved.map(|p| p.id), "saved promotion");
        self.notifier.success(match editing {
          Some(_) => "Promotion updated",
          None => "Promotion created",
        });
        self.reload_promotions().await;
        Outcome::Saved
      }
      Err(error) => {
        self.fail(&error, "Could not save promotion");
        Outcome::Failed
      }
    }
  }

  pub async fn delete_promotion(&mut self, id: PromotionId) -> bool {
    match self.resources.delete_promotion(id).await {
      Ok(()) => {
        tracing::info!(id, "deleted promotion");
        self.notifier.success("Promotion deleted");
        self.reload_promotions().await;
        true
      }
      Err(error) => {
        self.fail(&error, "Could not delete promotion");
        false
      }
    }
  }

  // ── Products ──────────────────────────────────────────────────────────

  pub async fn save_product(
    &mut self,
    form: &ProductForm,
    editing: Option<ProductId>,
  ) -> Outcome<ProductField> {
    let payload = match form.submit() {
      Ok(payload) => payload,
      Err(errors) => return Outcome::Invalid(errors),
    };

    let result = match editing {
      Some(id) => self.resources.update_product(id, &payload).await,
      None => self.resources.create_product(&payload).await,
    };
    match result {
      Ok(saved) => {
        tracing::info!(id = ?saved.map(|p| p.id.get()), "saved product");
        self.notifier.success(match editing {
          Some(_) => "Product updated",
          None => "Product created",
        });
        self.reload_products().await;
        Outcome::Saved
      }
      Err(error) => {
        self.fail(&error, "Could not save product");
        Outcome::Failed
      }
    }
  }

  pub async fn delete_product(&mut self, id: ProductId) -> bool {
    match self.resources.delete_product(id).await {
      Ok(()) => {
        tracing::info!(id = id.get(), "deleted product");
        self.notifier.success("Product deleted");
        self.reload_products().await;
        true
      }
      Err(error) => {
        self.fail(&error, "Could not delete product");
        false
      }
    }
  }

  fn fail(&mut self, error: &Error, message: &str) {
    tracing::error!(%error, "{message}");
    if matches!(error, Error::Network(NetworkError::Unauthorized)) {
      self.unauthorized = true;
    }
    self.notifier.error(message);
  }
}
