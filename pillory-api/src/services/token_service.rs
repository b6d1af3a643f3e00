use jsonwebtoken::{encode, EncodingKey, Header};

use pillory_shared::errors::AppError;
use pillory_shared::types::auth::Claims;

pub fn issue_token(admin_id: i32, secret: &str, ttl_secs: i64) -> Result<String, AppError> {
    let claims = Claims::new(admin_id, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}
