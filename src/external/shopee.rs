//! Low-level signed transport for the Shopee open platform.
//!
//! Auth parameters (partner_id, timestamp, sign, and for shop endpoints
//! access_token + shop_id) always travel in the query string, for POST calls too;
//! the JSON body carries only the business payload. Responses use the
//! `{error, message, response, request_id}` envelope, except binary document
//! downloads.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ShopeeConfig;
use crate::error::{AppError, AppResult};
use crate::external::signature;

pub const PATH_TOKEN_GET: &str = "/api/v2/auth/token/get";
pub const PATH_TOKEN_REFRESH: &str = "/api/v2/auth/access_token/get";
pub const PATH_ORDER_LIST: &str = "/api/v2/order/get_order_list";
pub const PATH_ORDER_DETAIL: &str = "/api/v2/order/get_order_detail";
pub const PATH_ITEM_LIST: &str = "/api/v2/product/get_item_list";
pub const PATH_ITEM_BASE_INFO: &str = "/api/v2/product/get_item_base_info";
pub const PATH_MODEL_LIST: &str = "/api/v2/product/get_model_list";
pub const PATH_UPDATE_PRICE: &str = "/api/v2/product/update_price";
pub const PATH_UPDATE_STOCK: &str = "/api/v2/product/update_stock";
pub const PATH_BOOST_ITEM: &str = "/api/v2/product/boost_item";
pub const PATH_SHIPPING_DOCUMENT: &str = "/api/v2/logistics/download_shipping_document";

/// Remote per-call caps.
pub const ORDER_DETAIL_BATCH_MAX: usize = 50;
pub const ORDER_LIST_PAGE_SIZE: i64 = 50;
pub const ITEM_LIST_PAGE_SIZE: i64 = 50;
pub const ITEM_BASE_INFO_BATCH_MAX: usize = 50;
pub const BOOST_BATCH_MAX: usize = 5;
/// The order list endpoint rejects time windows wider than 15 days.
pub const ORDER_LIST_WINDOW_MAX_SECS: i64 = 15 * 24 * 3600;

#[derive(Debug, Deserialize)]
pub struct ShopeeEnvelope {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    pub response: Option<Value>,
    #[serde(default)]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expire_in: i64,
}

/// Binary response passed through untouched (shipping document PDFs).
#[derive(Debug)]
pub struct DocumentDownload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Shop-token credentials for an authenticated call.
#[derive(Debug, Clone, Copy)]
pub struct ShopAuth<'a> {
    pub access_token: &'a str,
    pub shop_id: &'a str,
}

#[derive(Clone)]
pub struct ShopeeClient {
    client: Client,
    config: ShopeeConfig,
}

impl ShopeeClient {
    pub fn new(config: ShopeeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ShopeeConfig {
        &self.config
    }

    fn timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Common auth query params for a request: partner_id, timestamp, sign, and
    /// for shop endpoints access_token + shop_id.
    fn signed_query(&self, path: &str, auth: Option<ShopAuth<'_>>) -> AppResult<Vec<(String, String)>> {
        let ts = Self::timestamp();
        let mut query = vec![
            ("partner_id".to_string(), self.config.partner_id.clone()),
            ("timestamp".to_string(), ts.to_string()),
        ];

        let sign = match auth {
            Some(a) => {
                query.push(("access_token".to_string(), a.access_token.to_string()));
                query.push(("shop_id".to_string(), a.shop_id.to_string()));
                signature::sign_shop(
                    &self.config.partner_key,
                    &self.config.partner_id,
                    path,
                    ts,
                    a.access_token,
                    a.shop_id,
                )?
            }
            None => signature::sign_public(
                &self.config.partner_key,
                &self.config.partner_id,
                path,
                ts,
            )?,
        };
        query.push(("sign".to_string(), sign));

        Ok(query)
    }

    fn unwrap_envelope(envelope: ShopeeEnvelope) -> AppResult<Value> {
        if !envelope.error.is_empty() {
            return Err(AppError::ApiError {
                code: envelope.error,
                message: envelope.message,
            });
        }
        Ok(envelope.response.unwrap_or(Value::Null))
    }

    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
        auth: Option<ShopAuth<'_>>,
    ) -> AppResult<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut query = self.signed_query(path, auth)?;
        for (k, v) in params {
            query.push((k.to_string(), v.clone()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let envelope: ShopeeEnvelope = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        auth: Option<ShopAuth<'_>>,
    ) -> AppResult<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        let query = self.signed_query(path, auth)?;

        let response = self
            .client
            .post(&url)
            .query(&query)
            .json(body)
            .send()
            .await?;
        let envelope: ShopeeEnvelope = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    /// Document downloads skip the JSON envelope; the platform still reports
    /// errors as JSON, so the content type decides how the body is read.
    pub async fn download(
        &self,
        path: &str,
        body: &Value,
        auth: Option<ShopAuth<'_>>,
    ) -> AppResult<DocumentDownload> {
        let url = format!("{}{}", self.config.base_url, path);
        let query = self.signed_query(path, auth)?;

        let response = self
            .client
            .post(&url)
            .query(&query)
            .json(body)
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        if content_type.contains("application/json") {
            let envelope: ShopeeEnvelope = response.json().await?;
            // A JSON body on a download endpoint is always an error report.
            Self::unwrap_envelope(envelope)?;
            return Err(AppError::InternalError(
                "download endpoint returned JSON without an error".to_string(),
            ));
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split("filename=").nth(1))
            .map(|v| v.trim_matches('"').to_string())
            .unwrap_or_else(|| "shipping_document.pdf".to_string());

        let bytes = response.bytes().await?.to_vec();
        Ok(DocumentDownload {
            bytes,
            content_type,
            filename,
        })
    }

    // Token endpoints put the pair at the top level of the body instead of
    // inside `response`, so they bypass unwrap_envelope.
    async fn post_token_endpoint(&self, path: &str, body: &Value) -> AppResult<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        let query = self.signed_query(path, None)?;

        let response = self
            .client
            .post(&url)
            .query(&query)
            .json(body)
            .send()
            .await?;
        let value: Value = response.json().await?;

        if let Some(code) = value["error"].as_str()
            && !code.is_empty()
        {
            return Err(AppError::ApiError {
                code: code.to_string(),
                message: value["message"].as_str().unwrap_or("").to_string(),
            });
        }
        Ok(value)
    }

    /// Exchange an OAuth callback code for the first access/refresh token pair.
    pub async fn get_token(&self, code: &str, shop_id: &str) -> AppResult<TokenPair> {
        let body = serde_json::json!({
            "code": code,
            "shop_id": shop_id_value(shop_id),
            "partner_id": partner_id_value(&self.config.partner_id),
        });
        let response = self.post_token_endpoint(PATH_TOKEN_GET, &body).await?;
        parse_token_pair(&response)
    }

    /// Trade a refresh token for a fresh pair. Uses the public signing profile:
    /// the expired access token must not participate in the signature.
    pub async fn refresh_token(&self, refresh_token: &str, shop_id: &str) -> AppResult<TokenPair> {
        let body = serde_json::json!({
            "refresh_token": refresh_token,
            "shop_id": shop_id_value(shop_id),
            "partner_id": partner_id_value(&self.config.partner_id),
        });
        let response = self.post_token_endpoint(PATH_TOKEN_REFRESH, &body).await?;
        parse_token_pair(&response)
    }
}

// The platform wants numeric ids in JSON bodies; config keeps them as strings
// because they also appear verbatim in query strings and signatures.
fn shop_id_value(shop_id: &str) -> Value {
    shop_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(shop_id))
}

fn partner_id_value(partner_id: &str) -> Value {
    partner_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(partner_id))
}

fn parse_token_pair(body: &Value) -> AppResult<TokenPair> {
    // Some deployments nest the pair under `response`; prefer the top level.
    let response = if body["access_token"].is_string() {
        body
    } else {
        &body["response"]
    };
    let access_token = response["access_token"].as_str();
    let refresh_token = response["refresh_token"].as_str();
    let expire_in = response["expire_in"].as_i64();

    match (access_token, refresh_token, expire_in) {
        (Some(a), Some(r), Some(e)) => Ok(TokenPair {
            access_token: a.to_string(),
            refresh_token: r.to_string(),
            expire_in: e,
        }),
        _ => Err(AppError::InternalError(
            "token endpoint response missing access_token/refresh_token/expire_in".to_string(),
        )),
    }
}
