use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One access/refresh token pair per shop. `expires_at` is always recomputed
/// from the server-provided `expire_in` at fetch/refresh time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Token {
    pub shop_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expire_in: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Token {
    /// True once `now` is inside the safety margin before expiry. The margin
    /// makes refresh proactive: a token is never handed out so close to expiry
    /// that the call it signs would race the deadline.
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now >= self.expires_at - margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_expiring_at(expires_at: DateTime<Utc>) -> Token {
        Token {
            shop_id: "1".to_string(),
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expire_in: 14400,
            expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_needs_refresh_past_expiry() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::seconds(1));
        assert!(token.needs_refresh(now, Duration::seconds(300)));
    }

    #[test]
    fn test_needs_refresh_within_margin() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::seconds(100));
        assert!(token.needs_refresh(now, Duration::seconds(300)));
    }

    #[test]
    fn test_fresh_token_does_not_need_refresh() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::seconds(10_000));
        assert!(!token.needs_refresh(now, Duration::seconds(300)));
    }
}
