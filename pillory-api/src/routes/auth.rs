use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use pillory_shared::errors::{AppError, AppResult, ErrorCode};
use pillory_shared::extract::Json;
use pillory_shared::middleware::authenticate;
use pillory_shared::types::api::{ApiResponse, Created};
use pillory_shared::types::auth::IssuedToken;

use crate::extractors::{load_active_admin, require_super_admin, CurrentAdmin};
use crate::models::{Admin, NewAdmin};
use crate::schema::admins;
use crate::services::{auth_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "invalid email address"), length(max = 120))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminEnvelope {
    pub admin: Admin,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<IssuedToken<Admin>>>> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("username and password are required"));
    }

    let mut conn = state.db.get()?;

    let invalid = || AppError::new(ErrorCode::InvalidCredentials, "invalid username or password");

    let admin = admins::table
        .filter(admins::username.eq(username))
        .filter(admins::is_active.eq(true))
        .first::<Admin>(&mut conn)
        .optional()?
        .ok_or_else(invalid)?;

    if !auth_service::verify_password(&req.password, &admin.password_hash)? {
        return Err(invalid());
    }

    let admin: Admin = conn.transaction::<_, AppError, _>(|conn| {
        Ok(diesel::update(admins::table.find(admin.id))
            .set(admins::last_login.eq(Some(Utc::now())))
            .get_result(conn)?)
    })?;

    let token = token_service::issue_token(
        admin.id,
        &state.config.jwt_secret,
        state.config.jwt_ttl_secs,
    )?;

    tracing::info!(admin_id = admin.id, username = %admin.username, "admin logged in");

    Ok(Json(ApiResponse::ok_with_message(
        IssuedToken::new(token, state.config.jwt_ttl_secs, admin),
        "login successful",
    )))
}

/// Tokens are stateless; the client simply discards its copy.
pub async fn logout(CurrentAdmin(admin): CurrentAdmin) -> Json<ApiResponse<()>> {
    tracing::info!(admin_id = admin.id, "admin logged out");
    Json(ApiResponse::ok_with_message((), "logout successful"))
}

pub async fn me(CurrentAdmin(admin): CurrentAdmin) -> Json<ApiResponse<AdminEnvelope>> {
    Json(ApiResponse::ok(AdminEnvelope { admin }))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(AppError::bad_request("current and new password are required"));
    }

    if !auth_service::verify_password(&req.current_password, &admin.password_hash)? {
        return Err(AppError::new(
            ErrorCode::InvalidCurrentPassword,
            "current password is incorrect",
        ));
    }

    auth_service::validate_password(&req.new_password)?;
    let new_hash = auth_service::hash_password(&req.new_password)?;

    let mut conn = state.db.get()?;
    conn.transaction::<_, AppError, _>(|conn| {
        diesel::update(admins::table.find(admin.id))
            .set(admins::password_hash.eq(new_hash))
            .execute(conn)?;
        Ok(())
    })?;

    tracing::info!(admin_id = admin.id, "admin password changed");

    Ok(Json(ApiResponse::ok_with_message((), "password changed")))
}

/// Creates an admin account.
///
/// While no active admin exists anyone may register, and that first account
/// becomes a super admin. Afterwards only an active super admin may register
/// new accounts.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mut req): Json<RegisterRequest>,
) -> AppResult<Created<AdminEnvelope>> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_string();

    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("username, email and password are required"));
    }

    auth_service::validate_username(&req.username)?;
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    auth_service::validate_password(&req.password)?;

    let mut conn = state.db.get()?;

    let active_admins: i64 = admins::table
        .filter(admins::is_active.eq(true))
        .count()
        .get_result(&mut conn)?;
    let bootstrap = active_admins == 0;

    let created_by = if bootstrap {
        None
    } else {
        let token = authenticate(&headers, &state.config.jwt_secret)?;
        let caller = load_active_admin(&mut conn, token.admin_id)?;
        Some(require_super_admin(caller)?.id)
    };

    let password_hash = auth_service::hash_password(&req.password)?;
    let RegisterRequest { username, email, .. } = req;

    let admin: Admin = conn.transaction::<_, AppError, _>(|conn| {
        let username_taken: i64 = admins::table
            .filter(admins::username.eq(&username))
            .count()
            .get_result(conn)?;
        if username_taken > 0 {
            return Err(AppError::new(ErrorCode::UsernameTaken, "username already exists"));
        }

        let email_taken: i64 = admins::table
            .filter(admins::email.eq(&email))
            .count()
            .get_result(conn)?;
        if email_taken > 0 {
            return Err(AppError::new(ErrorCode::EmailTaken, "email already exists"));
        }

        let new_admin = NewAdmin {
            username,
            email,
            password_hash,
            is_super_admin: bootstrap,
        };

        Ok(diesel::insert_into(admins::table)
            .values(&new_admin)
            .get_result(conn)?)
    })?;

    tracing::info!(
        admin_id = admin.id,
        username = %admin.username,
        created_by = ?created_by,
        super_admin = admin.is_super_admin,
        "admin registered"
    );

    Ok(Created(ApiResponse::ok_with_message(
        AdminEnvelope { admin },
        "admin created",
    )))
}
