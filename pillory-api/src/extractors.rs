use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use diesel::prelude::*;

use pillory_shared::errors::{AppError, ErrorCode};
use pillory_shared::types::auth::AuthToken;

use crate::models::Admin;
use crate::schema::admins;
use crate::AppState;

/// An authenticated caller whose admin account still exists and is active.
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub Admin);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = AuthToken::from_request_parts(parts, state).await?;
        let mut conn = state.db.get()?;
        load_active_admin(&mut conn, token.admin_id).map(Self)
    }
}

pub fn load_active_admin(conn: &mut PgConnection, admin_id: i32) -> Result<Admin, AppError> {
    admins::table
        .filter(admins::id.eq(admin_id))
        .filter(admins::is_active.eq(true))
        .first::<Admin>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::AdminInactive, "admin account is inactive"))
}

pub fn require_super_admin(admin: Admin) -> Result<Admin, AppError> {
    if !admin.is_super_admin {
        return Err(AppError::new(
            ErrorCode::SuperAdminRequired,
            "super admin privileges required",
        ));
    }
    Ok(admin)
}
