use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::errors::{AppError, ErrorCode};
use crate::types::auth::{AuthToken, Claims};

/// Router state that can hand out the key used to verify access tokens.
pub trait TokenSecret {
    fn jwt_secret(&self) -> &str;
}

impl<T: TokenSecret> TokenSecret for Arc<T> {
    fn jwt_secret(&self) -> &str {
        (**self).jwt_secret()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: TokenSecret + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state.jwt_secret())
    }
}

/// Bearer extraction plus token verification in one step.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthToken, AppError> {
    let token = extract_bearer_token(headers)?;
    let claims = verify_token(token, secret)?;
    Ok(AuthToken::from(claims))
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::new(ErrorCode::Unauthorized, "invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "authorization header must use Bearer scheme"))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, "invalid or expired token"),
    })?;

    if token_data.claims.is_expired() {
        return Err(AppError::new(ErrorCode::TokenExpired, "token has expired"));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn code_of(err: AppError) -> ErrorCode {
        match err {
            AppError::Known { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn valid_token_roundtrip() {
        let token = sign(&Claims::new(42, 3600), SECRET);
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = sign(&Claims::new(1, 3600), "other-secret");
        assert_eq!(code_of(verify_token(&token, SECRET).unwrap_err()), ErrorCode::TokenInvalid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(1, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = sign(&claims, SECRET);
        assert_eq!(code_of(verify_token(&token, SECRET).unwrap_err()), ErrorCode::TokenExpired);
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(code_of(verify_token("not.a.jwt", SECRET).unwrap_err()), ErrorCode::TokenInvalid);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::Unauthorized);
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        assert!(extract_bearer_token(&bearer("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer_token(&bearer("Bearer ")).is_err());
    }

    #[test]
    fn authenticate_yields_admin_id() {
        let token = sign(&Claims::new(9, 60), SECRET);
        let auth = authenticate(&bearer(&format!("Bearer {token}")), SECRET).unwrap();
        assert_eq!(auth.admin_id, 9);
    }
}
