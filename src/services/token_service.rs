use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::external::{DocumentDownload, ShopAuth, ShopeeClient, TokenPair};
use crate::models::Token;

/// Persists the per-shop access/refresh token pair and hands out currently
/// valid tokens, refreshing proactively inside a safety margin.
///
/// Also the authenticated call path: wrappers here attach the shop token and
/// implement the single refresh-and-retry allowed on invalid-token errors.
#[derive(Clone)]
pub struct TokenService {
    pool: SqlitePool,
    client: ShopeeClient,
    /// Coalesces concurrent refreshes: losers of the race re-read the stored
    /// token instead of burning a second refresh_token call.
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenService {
    pub fn new(pool: SqlitePool, client: ShopeeClient) -> Self {
        Self {
            pool,
            client,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    fn refresh_margin(&self) -> Duration {
        // Sandbox tokens only live minutes; a production-sized margin would
        // refresh them on every call.
        if self.client.config().is_sandbox() {
            Duration::seconds(30)
        } else {
            Duration::seconds(300)
        }
    }

    /// Upsert the pair for a shop. `expires_at` is computed here, from the
    /// server-provided `expire_in`, never carried over from the old row.
    pub async fn save_token(&self, shop_id: &str, pair: &TokenPair) -> AppResult<Token> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(pair.expire_in);

        sqlx::query(
            r#"
            INSERT INTO tokens (shop_id, access_token, refresh_token, expire_in, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(shop_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expire_in = excluded.expire_in,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(shop_id)
        .bind(&pair.access_token)
        .bind(&pair.refresh_token)
        .bind(pair.expire_in)
        .bind(expires_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Token {
            shop_id: shop_id.to_string(),
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            expire_in: pair.expire_in,
            expires_at,
            created_at: now,
            updated_at: now,
        })
    }

    async fn latest_token(&self) -> AppResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT shop_id, access_token, refresh_token, expire_in, expires_at, created_at, updated_at
             FROM tokens ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    /// Returns a token that is safe to sign with right now, refreshing first if
    /// the stored one is inside the margin. None means the shop needs to go
    /// through the OAuth authorization flow again.
    pub async fn get_valid_token(&self) -> AppResult<Option<Token>> {
        let Some(token) = self.latest_token().await? else {
            return Ok(None);
        };

        let margin = self.refresh_margin();
        if !token.needs_refresh(Utc::now(), margin) {
            return Ok(Some(token));
        }

        let _guard = self.refresh_lock.lock().await;

        // A peer may have refreshed while we waited for the lock; work from
        // the row stored now, never the one read before the lock.
        let Some(current) = self.latest_token().await? else {
            return Ok(None);
        };
        if !current.needs_refresh(Utc::now(), margin) {
            return Ok(Some(current));
        }

        self.refresh_stored_token(&current).await
    }

    /// Unconditional refresh of the stored token, used by the invalid-token
    /// retry path when the platform rejects a token we still considered valid.
    pub async fn force_refresh(&self) -> AppResult<Option<Token>> {
        let _guard = self.refresh_lock.lock().await;
        let Some(token) = self.latest_token().await? else {
            return Ok(None);
        };
        self.refresh_stored_token(&token).await
    }

    async fn refresh_stored_token(&self, token: &Token) -> AppResult<Option<Token>> {
        match self
            .client
            .refresh_token(&token.refresh_token, &token.shop_id)
            .await
        {
            Ok(pair) => {
                let saved = self.save_token(&token.shop_id, &pair).await?;
                log::info!(
                    "Refreshed access token for shop {}, expires at {}",
                    saved.shop_id,
                    saved.expires_at
                );
                Ok(Some(saved))
            }
            Err(e) => {
                // Back to ABSENT: the seller must re-authorize via OAuth.
                log::error!("Token refresh failed for shop {}: {e}", token.shop_id);
                Ok(None)
            }
        }
    }

    /// OAuth callback exchange: trade the authorization code for the first
    /// token pair and persist it.
    pub async fn exchange_code(&self, code: &str, shop_id: &str) -> AppResult<Token> {
        let pair = self.client.get_token(code, shop_id).await?;
        let token = self.save_token(shop_id, &pair).await?;
        log::info!("Authorized shop {shop_id}, token expires at {}", token.expires_at);
        Ok(token)
    }

    async fn require_token(&self) -> AppResult<Token> {
        self.get_valid_token().await?.ok_or_else(|| {
            AppError::AuthError("no valid shop token; re-authorization required".to_string())
        })
    }

    pub async fn authed_get(&self, path: &str, params: &[(&str, String)]) -> AppResult<Value> {
        let token = self.require_token().await?;
        let result = self
            .client
            .get(path, params, Some(auth_of(&token)))
            .await;
        match result {
            Err(e) if e.is_invalid_token() => {
                log::warn!("Invalid token on GET {path}, refreshing and retrying once");
                let token = self.retry_token().await?;
                self.client.get(path, params, Some(auth_of(&token))).await
            }
            other => other,
        }
    }

    pub async fn authed_post(&self, path: &str, body: &Value) -> AppResult<Value> {
        let token = self.require_token().await?;
        let result = self.client.post(path, body, Some(auth_of(&token))).await;
        match result {
            Err(e) if e.is_invalid_token() => {
                log::warn!("Invalid token on POST {path}, refreshing and retrying once");
                let token = self.retry_token().await?;
                self.client.post(path, body, Some(auth_of(&token))).await
            }
            other => other,
        }
    }

    pub async fn authed_download(&self, path: &str, body: &Value) -> AppResult<DocumentDownload> {
        let token = self.require_token().await?;
        let result = self
            .client
            .download(path, body, Some(auth_of(&token)))
            .await;
        match result {
            Err(e) if e.is_invalid_token() => {
                log::warn!("Invalid token on download {path}, refreshing and retrying once");
                let token = self.retry_token().await?;
                self.client.download(path, body, Some(auth_of(&token))).await
            }
            other => other,
        }
    }

    async fn retry_token(&self) -> AppResult<Token> {
        self.force_refresh().await?.ok_or_else(|| {
            AppError::AuthError("token refresh failed during retry; re-authorization required".to_string())
        })
    }
}

fn auth_of(token: &Token) -> ShopAuth<'_> {
    ShopAuth {
        access_token: &token.access_token,
        shop_id: &token.shop_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopeeConfig;
    use crate::external::{PATH_ORDER_LIST, PATH_TOKEN_REFRESH};
    use crate::services::test_stub::{sent_refresh_token, spawn_stub};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    fn unreachable_client() -> ShopeeClient {
        // Nothing listens here; any refresh attempt fails fast.
        ShopeeClient::new(ShopeeConfig {
            partner_id: "1000".to_string(),
            partner_key: "k".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            environment: "production".to_string(),
        })
    }

    fn pair(expire_in: i64) -> TokenPair {
        TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expire_in,
        }
    }

    fn stub_client(base_url: String, environment: &str) -> ShopeeClient {
        ShopeeClient::new(ShopeeConfig {
            partner_id: "1000".to_string(),
            partner_key: "k".to_string(),
            base_url,
            environment: environment.to_string(),
        })
    }

    #[tokio::test]
    async fn test_fresh_token_returned_without_refresh() {
        let service = TokenService::new(test_pool().await, unreachable_client());
        service.save_token("123", &pair(14400)).await.unwrap();

        // The remote is unreachable, so a refresh attempt would yield None.
        let token = service.get_valid_token().await.unwrap();
        assert_eq!(token.unwrap().access_token, "access");
    }

    #[tokio::test]
    async fn test_expired_token_with_failing_refresh_returns_none() {
        let service = TokenService::new(test_pool().await, unreachable_client());
        service.save_token("123", &pair(-10)).await.unwrap();

        let token = service.get_valid_token().await.unwrap();
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_no_token_returns_none() {
        let service = TokenService::new(test_pool().await, unreachable_client());
        assert!(service.get_valid_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_token_upserts_by_shop() {
        let service = TokenService::new(test_pool().await, unreachable_client());
        service.save_token("123", &pair(14400)).await.unwrap();
        let updated = TokenPair {
            access_token: "access2".to_string(),
            refresh_token: "refresh2".to_string(),
            expire_in: 14400,
        };
        service.save_token("123", &updated).await.unwrap();

        let token = service.get_valid_token().await.unwrap().unwrap();
        assert_eq!(token.access_token, "access2");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tokens")
            .fetch_one(&service.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = refreshes.clone();
        // The delay keeps all callers queued behind the first refresh.
        let base = spawn_stub(StdDuration::from_millis(100), move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            r#"{"error":"","access_token":"new_access","refresh_token":"new_refresh","expire_in":14400}"#
                .to_string()
        })
        .await;

        let service = TokenService::new(test_pool().await, stub_client(base, "production"));
        service.save_token("123", &pair(-10)).await.unwrap();

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.get_valid_token().await.unwrap() })
            })
            .collect();
        for task in tasks {
            let token = task.await.unwrap();
            assert_eq!(token.unwrap().access_token, "new_access");
        }

        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_token_refreshes_and_retries_once() {
        let data_calls = Arc::new(AtomicUsize::new(0));
        let refreshes = Arc::new(AtomicUsize::new(0));
        let (dc, rc) = (data_calls.clone(), refreshes.clone());
        let base = spawn_stub(StdDuration::ZERO, move |req| {
            if req.contains(PATH_TOKEN_REFRESH) {
                rc.fetch_add(1, Ordering::SeqCst);
                r#"{"error":"","access_token":"a2","refresh_token":"r2","expire_in":14400}"#
                    .to_string()
            } else if dc.fetch_add(1, Ordering::SeqCst) == 0 {
                r#"{"error":"error_auth","message":"Invalid access_token"}"#.to_string()
            } else {
                r#"{"error":"","message":"","response":{"order_list":[],"more":false},"request_id":"x"}"#
                    .to_string()
            }
        })
        .await;

        let service = TokenService::new(test_pool().await, stub_client(base, "production"));
        service.save_token("123", &pair(14400)).await.unwrap();

        let value = service.authed_get(PATH_ORDER_LIST, &[]).await.unwrap();
        assert!(value["order_list"].is_array());
        assert_eq!(data_calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);

        // The refreshed pair is what got persisted.
        let stored = service.get_valid_token().await.unwrap().unwrap();
        assert_eq!(stored.access_token, "a2");
    }

    #[tokio::test]
    async fn test_invalid_token_surfaces_after_single_retry() {
        let data_calls = Arc::new(AtomicUsize::new(0));
        let dc = data_calls.clone();
        let base = spawn_stub(StdDuration::ZERO, move |req| {
            if req.contains(PATH_TOKEN_REFRESH) {
                r#"{"error":"","access_token":"a2","refresh_token":"r2","expire_in":14400}"#
                    .to_string()
            } else {
                dc.fetch_add(1, Ordering::SeqCst);
                r#"{"error":"error_auth","message":"Invalid access_token"}"#.to_string()
            }
        })
        .await;

        let service = TokenService::new(test_pool().await, stub_client(base, "production"));
        service.save_token("123", &pair(14400)).await.unwrap();

        let err = service.authed_get(PATH_ORDER_LIST, &[]).await.unwrap_err();
        assert!(err.is_invalid_token());
        // One original call, one retry, no loop.
        assert_eq!(data_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lock_waiters_refresh_the_latest_stored_pair() {
        let sent: Arc<StdMutex<Vec<String>>> = Arc::new(StdMutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let (sent2, calls2) = (sent.clone(), calls.clone());
        let base = spawn_stub(StdDuration::from_millis(100), move |req| {
            if let Some(token) = sent_refresh_token(req) {
                sent2.lock().unwrap().push(token);
            }
            // Short-lived pairs stay inside the sandbox margin, so the lock
            // waiter still sees a token needing refresh after its double-check.
            let n = calls2.fetch_add(1, Ordering::SeqCst) + 1;
            format!(
                r#"{{"error":"","access_token":"a{n}","refresh_token":"r{n}","expire_in":5}}"#
            )
        })
        .await;

        let service = TokenService::new(test_pool().await, stub_client(base, "sandbox"));
        let seed = TokenPair {
            access_token: "a0".to_string(),
            refresh_token: "r0".to_string(),
            expire_in: -10,
        };
        service.save_token("123", &seed).await.unwrap();

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.get_valid_token().await.unwrap() }
        });
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.get_valid_token().await.unwrap() }
        });
        assert!(first.await.unwrap().is_some());
        assert!(second.await.unwrap().is_some());

        // The waiter sends the pair its peer just saved, not the pre-lock one.
        assert_eq!(*sent.lock().unwrap(), vec!["r0".to_string(), "r1".to_string()]);
    }

    #[tokio::test]
    async fn test_authed_call_without_token_is_auth_error() {
        let service = TokenService::new(test_pool().await, unreachable_client());
        let err = service
            .authed_get(crate::external::PATH_ORDER_LIST, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }
}
