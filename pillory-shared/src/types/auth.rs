use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload identifying an admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(admin_id: i32, duration_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: admin_id,
            iat: now,
            exp: now + duration_secs,
            jti: Uuid::now_v7(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn admin_id(&self) -> i32 {
        self.sub
    }
}

/// A caller whose bearer token carried a valid signature and had not expired.
///
/// This says nothing about whether the admin account still exists or is
/// active; services check that against their own storage.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub admin_id: i32,
}

impl From<Claims> for AuthToken {
    fn from(claims: Claims) -> Self {
        Self {
            admin_id: claims.sub,
        }
    }
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedToken<A> {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: A,
}

impl<A> IssuedToken<A> {
    pub fn new(token: String, expires_in: i64, admin: A) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_claims_expire_after_duration() {
        let claims = Claims::new(7, 3600);
        assert_eq!(claims.admin_id(), 7);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn zero_duration_is_expired() {
        let claims = Claims::new(1, 0);
        assert!(claims.is_expired());
    }

    #[test]
    fn auth_token_from_claims() {
        let token = AuthToken::from(Claims::new(3, 60));
        assert_eq!(token.admin_id, 3);
    }
}
