//! Cart endpoints and wire types.
//!
//! | Method | Path             | Body                                   |
//! |--------|------------------|----------------------------------------|
//! | GET    | `/cart`          | -                                      |
//! | PUT    | `/cart/quantity` | `{ productId, optionType, quantity }`  |
//! | DELETE | `/cart/remove`   | `{ productId, optionType }`            |
//! | POST   | `/cart/add`      | `{ productId, optionType, quantity }`  |
//! | GET    | `/cart/count`    | -                                      |
//! | DELETE | `/cart/clear`    | -                                      |
//!
//! A quantity of 0 on `/cart/quantity` makes the server delete the line.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::code::ResponseCode;
use crate::envelope::Decoded;
use crate::error::{ApiFailure, ApiResult};

const CART_PATH: &str = "/cart";
const QUANTITY_PATH: &str = "/cart/quantity";
const REMOVE_PATH: &str = "/cart/remove";
const ADD_PATH: &str = "/cart/add";
const COUNT_PATH: &str = "/cart/count";
const CLEAR_PATH: &str = "/cart/clear";

/// Identity of a cart line: `(productId, optionType)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartKey {
    pub product_id: i64,
    pub option_type: String,
}

impl CartKey {
    pub fn new(product_id: i64, option_type: impl Into<String>) -> Self {
        Self {
            product_id,
            option_type: option_type.into(),
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product_id, self.option_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cart key {0:?}: expected <productId>-<optionType>")]
pub struct ParseCartKeyError(String);

impl FromStr for CartKey {
    type Err = ParseCartKeyError;

    /// Splits on the first `-`, so option types may themselves contain `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, option) = s
            .split_once('-')
            .ok_or_else(|| ParseCartKeyError(s.to_string()))?;
        let product_id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseCartKeyError(s.to_string()))?;
        if option.is_empty() {
            return Err(ParseCartKeyError(s.to_string()));
        }
        Ok(Self::new(product_id, option))
    }
}

/// One row of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub option_type: String,
    #[serde(default)]
    pub product_name: String,
    /// Smallest currency unit.
    #[serde(rename = "price", alias = "unitPrice")]
    pub unit_price: i64,
    pub quantity: u32,
    /// `false` when the line exists but cannot be purchased right now.
    #[serde(default)]
    pub available: bool,
}

impl CartLine {
    pub fn key(&self) -> CartKey {
        CartKey::new(self.product_id, self.option_type.clone())
    }

    pub fn matches(&self, key: &CartKey) -> bool {
        self.product_id == key.product_id && self.option_type == key.option_type
    }

    /// Saturates instead of overflowing on out-of-range server values.
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

/// Body of `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub cart_items: Vec<CartLine>,
    #[serde(default)]
    pub empty: bool,
    /// Body-level success flag some server builds still emit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<i64>,
}

impl CartSnapshot {
    pub fn from_lines(cart_items: Vec<CartLine>) -> Self {
        Self {
            empty: cart_items.is_empty(),
            cart_items,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty || self.cart_items.is_empty()
    }

    pub fn contains(&self, key: &CartKey) -> bool {
        self.cart_items.iter().any(|line| line.matches(key))
    }

    /// Converts an explicit `success: false` body into a failure.
    fn into_decoded(self) -> Decoded<Self> {
        if self.success == Some(false) {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "cart could not be loaded".to_string());
            return Decoded::Err(ApiFailure::protocol(ResponseCode::BusinessError, message));
        }
        Decoded::Ok(self)
    }
}

/// Body of `GET /cart/count`; accepts `3` as well as `{ "count": 3 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CountPayload")]
pub struct CartCount {
    pub count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountPayload {
    Bare(u64),
    Wrapped { count: u64 },
}

impl From<CountPayload> for CartCount {
    fn from(payload: CountPayload) -> Self {
        match payload {
            CountPayload::Bare(count) | CountPayload::Wrapped { count } => Self { count },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuantityRequest<'a> {
    product_id: i64,
    option_type: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyRequest<'a> {
    product_id: i64,
    option_type: &'a str,
}

/// Cart operations against the backend.
///
/// Every method resolves to a [`Decoded`] value; `Err` only when the request
/// got no HTTP response.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch_cart(&self) -> ApiResult<Decoded<CartSnapshot>>;

    /// Quantity 0 deletes the line server-side.
    async fn update_quantity(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>>;

    async fn remove_item(&self, key: &CartKey) -> ApiResult<Decoded<()>>;

    async fn add_item(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>>;

    /// Also serves as an auth probe: 401 means not logged in.
    async fn item_count(&self) -> ApiResult<Decoded<CartCount>>;

    async fn clear_cart(&self) -> ApiResult<Decoded<()>>;
}

/// [`CartApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: ApiClient,
}

impl HttpCartApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn fetch_cart(&self) -> ApiResult<Decoded<CartSnapshot>> {
        let decoded = self.client.get::<CartSnapshot>(CART_PATH).await?;
        Ok(decoded.and_then(CartSnapshot::into_decoded))
    }

    async fn update_quantity(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>> {
        let body = QuantityRequest {
            product_id: key.product_id,
            option_type: &key.option_type,
            quantity,
        };
        let decoded = self
            .client
            .send(Method::PUT, QUANTITY_PATH, Some(&body))
            .await?;
        Ok(decoded.map(|_| ()))
    }

    async fn remove_item(&self, key: &CartKey) -> ApiResult<Decoded<()>> {
        let body = KeyRequest {
            product_id: key.product_id,
            option_type: &key.option_type,
        };
        let decoded = self
            .client
            .send(Method::DELETE, REMOVE_PATH, Some(&body))
            .await?;
        Ok(decoded.map(|_| ()))
    }

    async fn add_item(&self, key: &CartKey, quantity: u32) -> ApiResult<Decoded<()>> {
        let body = QuantityRequest {
            product_id: key.product_id,
            option_type: &key.option_type,
            quantity,
        };
        let decoded = self.client.send(Method::POST, ADD_PATH, Some(&body)).await?;
        Ok(decoded.map(|_| ()))
    }

    async fn item_count(&self) -> ApiResult<Decoded<CartCount>> {
        self.client.get::<CartCount>(COUNT_PATH).await
    }

    async fn clear_cart(&self) -> ApiResult<Decoded<()>> {
        let decoded = self
            .client
            .send::<()>(Method::DELETE, CLEAR_PATH, None)
            .await?;
        Ok(decoded.map(|_| ()))
    }
}
