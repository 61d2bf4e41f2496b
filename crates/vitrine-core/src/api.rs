//! Typed access to the service's REST resources over any [`HttpClient`].

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  Error, Result,
  product::{NewProduct, Product, ProductRef},
  promotion::{NewPromotion, ProductId, Promotion, PromotionId},
  remote::{HttpClient, ProductLookup},
};

const PROMOTIONS: &str = "/promotion";
const PRODUCTS: &str = "/product";

/// The promotion and product endpoints.
#[derive(Debug, Clone)]
pub struct Resources<C> {
  client: C,
}

impl<C: HttpClient> Resources<C> {
  pub fn new(client: C) -> Self { Self { client } }

  pub fn client(&self) -> &C { &self.client }

  // ── Promotions ────────────────────────────────────────────────────────

  /// Records that fail to decode are logged and left out.
  pub async fn promotions(&self) -> Result<Vec<Promotion>> {
    decode_list(self.client.get(PROMOTIONS).await?, "promotion")
  }

  pub async fn promotion(&self, id: PromotionId) -> Result<Promotion> {
    decode(self.client.get(&format!("{PROMOTIONS}/{id}")).await?)
  }

  /// Returns the created record when the service echoes one back.
  pub async fn create_promotion(
    &self,
    promotion: &NewPromotion,
  ) -> Result<Option<Promotion>> {
    let body = encode(promotion)?;
    Ok(saved(self.client.post(PROMOTIONS, body).await?))
  }

  /// Replaces the whole record, config included.
  pub async fn update_promotion(
    &self,
    id: PromotionId,
    promotion: &NewPromotion,
  ) -> Result<Option<Promotion>> {
    let body = encode(promotion)?;
    Ok(saved(self.client.put(&format!("{PROMOTIONS}/{id}"), body).await?))
  }

  pub async fn delete_promotion(&self, id: PromotionId) -> Result<()> {
    self.client.delete(&format!("{PROMOTIONS}/{id}")).await?;
    Ok(())
  }

  // ── Products ──────────────────────────────────────────────────────────

  /// Records that fail to decode are logged and left out.
  pub async fn products(&self) -> Result<Vec<Product>> {
    decode_list(self.client.get(PRODUCTS).await?, "product")
  }

  pub async fn product(&self, id: ProductId) -> Result<Product> {
    decode(self.client.get(&format!("{PRODUCTS}/{id}")).await?)
  }

  pub async fn create_product(
    &self,
    product: &NewProduct,
  ) -> Result<Option<Product>> {
    let body = encode(product)?;
    Ok(saved(self.client.post(PRODUCTS, body).await?))
  }

  pub async fn update_product(
    &self,
    id: ProductId,
    product: &NewProduct,
  ) -> Result<Option<Product>> {
    let body = encode(product)?;
    Ok(saved(self.client.put(&format!("{PRODUCTS}/{id}"), body).await?))
  }

  pub async fn delete_product(&self, id: ProductId) -> Result<()> {
    self.client.delete(&format!("{PRODUCTS}/{id}")).await?;
    Ok(())
  }
}

impl<C: HttpClient> ProductLookup for Resources<C> {
  async fn list(&self) -> Result<Vec<ProductRef>> {
    Ok(self.products().await?.iter().map(ProductRef::from).collect())
  }
}

fn encode<T: Serialize>(payload: &T) -> Result<Value> {
  serde_json::to_value(payload).map_err(Error::Response)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
  serde_json::from_value(value).map_err(Error::Response)
}

/// A list response must be an array; its elements are decoded one by one so
/// a single bad record does not hide the rest.
fn decode_list<T: DeserializeOwned>(value: Value, kind: &str) -> Result<Vec<T>> {
  let items: Vec<Value> = decode(value)?;
  let records = items
    .into_iter()
    .enumerate()
    .filter_map(|(index, item)| match serde_json::from_value(item) {
      Ok(record) => Some(record),
      Err(error) => {
        tracing::warn!(%error, index, "skipping undecodable {kind} record");
        None
      }
    })
    .collect();
  Ok(records)
}

/// The record echoed by a successful write, if the body holds one. The
/// write has happened regardless of what the body contains.
fn saved<T: DeserializeOwned>(value: Value) -> Option<T> {
  if value.is_null() {
    return None;
  }
  serde_json::from_value(value)
    .map_err(|error| tracing::debug!(%error, "write response is not a record"))
    .ok()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rust_decimal::Decimal;
  use serde_json::json;

  use super::*;
  use crate::{
    product::Condition,
    promotion::{PercentageDiscount, PromotionConfig},
    remote::NetworkError,
    testing::{Method, RecordingClient},
  };

  fn promotion_record(id: u64) -> Value {
    json!({
      "id": id,
      "name": "Spring",
      "description": "",
      "start_date": "2024-03-01",
      "end_date": null,
      "promotion_type_id": 3,
      "config": "{\"discount_percentage\":20,\"product_id\":1}"
    })
  }

  fn new_promotion() -> NewPromotion {
    NewPromotion::new(
      "Spring",
      NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
      PromotionConfig::PercentageDiscount(
        PercentageDiscount::new(Decimal::from(20), ProductId::new(1).unwrap()).unwrap(),
      ),
    )
  }

  #[tokio::test]
  async fn list_promotions() {
    let client = RecordingClient::new().route(
      Method::Get,
      "/promotion",
      Ok(json!([promotion_record(1), promotion_record(2)])),
    );
    let resources = Resources::new(client.clone());

    let promotions = resources.promotions().await.unwrap();
    assert_eq!(promotions.len(), 2);
    assert_eq!(promotions[1].id, 2);
    assert_eq!(client.paths(Method::Get), vec!["/promotion"]);
  }

  #[tokio::test]
  async fn create_posts_payload() {
    let client = RecordingClient::new().route(
      Method::Post,
      "/promotion",
      Ok(promotion_record(7)),
    );
    let resources = Resources::new(client.clone());

    let created = resources.create_promotion(&new_promotion()).await.unwrap();
    assert_eq!(created.map(|p| p.id), Some(7));

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.clone().unwrap();
    assert_eq!(body["promotion_type_id"], 3);
    assert_eq!(body["start_date"], "2024-03-01");
    assert_eq!(
      body["config"],
      "{\"discount_percentage\":20,\"product_id\":1}"
    );
  }

  #[tokio::test]
  async fn update_and_delete_paths() {
    let client =
      RecordingClient::new().route(Method::Put, "/promotion/4", Ok(promotion_record(4)));
    let resources = Resources::new(client.clone());

    resources.update_promotion(4, &new_promotion()).await.unwrap();
    resources.delete_promotion(4).await.unwrap();
    resources
      .delete_product(ProductId::new(9).unwrap())
      .await
      .unwrap();

    assert_eq!(client.paths(Method::Put), vec!["/promotion/4"]);
    assert_eq!(
      client.paths(Method::Delete),
      vec!["/promotion/4", "/product/9"]
    );
  }

  #[tokio::test]
  async fn product_payload() {
    let client = RecordingClient::new().route(
      Method::Put,
      "/product/2",
      Ok(json!({ "id": 2, "name": "Desk", "condition": "used", "available": 0 })),
    );
    let resources = Resources::new(client.clone());

    let payload = NewProduct {
      name:        "Desk".into(),
      description: String::new(),
      condition:   Condition::Used,
      available:   false,
    };
    let product = resources
      .update_product(ProductId::new(2).unwrap(), &payload)
      .await
      .unwrap()
      .unwrap();
    assert!(!product.available);
    assert_eq!(
      client.calls()[0].body,
      Some(json!({
        "name": "Desk",
        "description": "",
        "condition": "used",
        "available": false
      }))
    );
  }

  #[tokio::test]
  async fn undecodable_records_are_skipped() {
    let mut unknown_type = promotion_record(2);
    unknown_type["promotion_type_id"] = json!(1);
    let mut bad_date = promotion_record(3);
    bad_date["start_date"] = json!("soon");
    let client = RecordingClient::new()
      .route(
        Method::Get,
        "/promotion",
        Ok(json!([promotion_record(1), unknown_type, bad_date])),
      )
      .route(
        Method::Get,
        "/product",
        Ok(json!([{ "id": 0, "name": "Ghost" }, { "id": 4, "name": "Lamp" }])),
      );
    let resources = Resources::new(client);

    let promotions = resources.promotions().await.unwrap();
    assert_eq!(promotions.iter().map(|p| p.id).collect::<Vec<_>>(), [1]);
    let products = resources.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Lamp");
  }

  #[tokio::test]
  async fn writes_accept_bodies_without_a_record() {
    let client = RecordingClient::new()
      .route(Method::Put, "/promotion/4", Ok(json!({ "message": "updated" })));
    let resources = Resources::new(client.clone());

    // Unrouted POST answers `null`.
    assert_eq!(resources.create_promotion(&new_promotion()).await.unwrap(), None);
    assert_eq!(
      resources.update_promotion(4, &new_promotion()).await.unwrap(),
      None
    );
    assert_eq!(client.paths(Method::Post), vec!["/promotion"]);
  }

  #[tokio::test]
  async fn unexpected_shape_is_a_response_error() {
    let client = RecordingClient::new().route(
      Method::Get,
      "/promotion",
      Ok(json!({ "data": [] })),
    );
    let resources = Resources::new(client);
    assert!(matches!(
      resources.promotions().await,
      Err(Error::Response(_))
    ));
  }

  #[tokio::test]
  async fn network_errors_pass_through() {
    let client = RecordingClient::new().route(
      Method::Get,
      "/product",
      Err(NetworkError::Unauthorized),
    );
    let resources = Resources::new(client);
    assert!(matches!(
      resources.products().await,
      Err(Error::Network(NetworkError::Unauthorized))
    ));
  }

  #[tokio::test]
  async fn lookup_projects_products() {
    let client = RecordingClient::new().route(
      Method::Get,
      "/product",
      Ok(json!([
        { "id": 1, "name": "Chair" },
        { "id": 2, "name": "Table" }
      ])),
    );
    let resources = Resources::new(client);
    let refs = resources.list().await.unwrap();
    assert_eq!(
      refs.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
      ["Chair", "Table"]
    );
  }
}
