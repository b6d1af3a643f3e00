use axum::extract::State;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use pillory_shared::errors::{AppError, AppResult, ErrorCode};
use pillory_shared::extract::{Json, Path, Query};
use pillory_shared::types::api::{ApiResponse, Created};
use pillory_shared::types::pagination::{Paginated, PaginationParams};

use crate::extractors::CurrentAdmin;
use crate::models::{NewPlayer, Player, PlayerChanges, PlayerView};
use crate::schema::players;
use crate::services::player_service;
use crate::AppState;

// --- Request types ---

#[derive(Debug, Deserialize)]
pub struct ListPlayersParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerDetailParams {
    /// Comma separated list, e.g. `32,128`.
    pub avatar_sizes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub reported_by: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlayerRequest {
    pub nickname: Option<String>,
    pub reason: Option<String>,
    pub reported_by: Option<String>,
}

impl UpdatePlayerRequest {
    fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.reason.is_none() && self.reported_by.is_none()
    }
}

fn active_players(search: Option<&str>) -> players::BoxedQuery<'static, Pg> {
    let mut query = players::table
        .filter(players::is_active.eq(true))
        .into_boxed();

    if let Some(term) = search {
        query = query.filter(players::nickname.ilike(player_service::search_pattern(term)));
    }
    query
}

fn find_active(conn: &mut PgConnection, player_id: i32) -> AppResult<Player> {
    players::table
        .filter(players::id.eq(player_id))
        .filter(players::is_active.eq(true))
        .first::<Player>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PlayerNotFound, "player not found"))
}

fn nickname_in_use(conn: &mut PgConnection, nickname: &str, except: Option<i32>) -> AppResult<bool> {
    let mut query = players::table
        .filter(players::nickname.eq(nickname))
        .filter(players::is_active.eq(true))
        .into_boxed();

    if let Some(id) = except {
        query = query.filter(players::id.ne(id));
    }

    let count: i64 = query.count().get_result(conn)?;
    Ok(count > 0)
}

// --- List players (public, paginated, optional nickname search) ---

pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPlayersParams>,
) -> AppResult<Json<ApiResponse<Paginated<PlayerView>>>> {
    let pagination = params.pagination;
    let search = params
        .search
        .as_deref()
        .map(player_service::sanitize_input)
        .filter(|term| !term.is_empty());

    let mut conn = state.db.get()?;

    let total: i64 = active_players(search.as_deref())
        .count()
        .get_result(&mut conn)?;

    let items = active_players(search.as_deref())
        .order((players::created_at.desc(), players::id.desc()))
        .offset(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
        .limit(i64::try_from(pagination.limit()).unwrap_or(i64::MAX))
        .load::<Player>(&mut conn)?
        .into_iter()
        .map(|player| PlayerView::new(player, &state.minotar))
        .collect();

    let total = u64::try_from(total).unwrap_or_default();
    Ok(Json(ApiResponse::ok(Paginated::new(items, total, &pagination))))
}

// --- Player details (public) ---

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i32>,
    Query(params): Query<PlayerDetailParams>,
) -> AppResult<Json<ApiResponse<PlayerView>>> {
    let mut conn = state.db.get()?;
    let player = find_active(&mut conn, player_id)?;

    let sizes = params
        .avatar_sizes
        .as_deref()
        .map(player_service::parse_sizes)
        .unwrap_or_default();

    let view = PlayerView::new(player, &state.minotar).with_sizes(&sizes, &state.minotar);
    Ok(Json(ApiResponse::ok(view)))
}

// --- Add player to the blacklist ---

pub async fn add_player(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(req): Json<AddPlayerRequest>,
) -> AppResult<Created<PlayerView>> {
    let new_player = NewPlayer {
        nickname: player_service::validate_nickname(&req.nickname)?,
        reason: player_service::validate_reason(&req.reason)?,
        reported_by: player_service::validate_reporter(&req.reported_by)?,
    };

    let mut conn = state.db.get()?;

    let player: Player = conn.transaction::<_, AppError, _>(|conn| {
        if nickname_in_use(conn, &new_player.nickname, None)? {
            return Err(AppError::new(
                ErrorCode::PlayerAlreadyListed,
                "player is already on the list",
            ));
        }

        Ok(diesel::insert_into(players::table)
            .values(&new_player)
            .get_result(conn)?)
    })?;

    tracing::info!(
        admin_id = admin.id,
        player_id = player.id,
        nickname = %player.nickname,
        "player blacklisted"
    );

    Ok(Created(ApiResponse::ok_with_message(
        PlayerView::new(player, &state.minotar),
        "player added to the blacklist",
    )))
}

// --- Update player ---

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(player_id): Path<i32>,
    Json(req): Json<UpdatePlayerRequest>,
) -> AppResult<Json<ApiResponse<PlayerView>>> {
    let mut conn = state.db.get()?;

    let player: Player = conn.transaction::<_, AppError, _>(|conn| {
        find_active(conn, player_id)?;

        if req.is_empty() {
            return Err(AppError::bad_request("no fields to update"));
        }

        let changes = PlayerChanges {
            nickname: req.nickname.as_deref().map(player_service::validate_nickname).transpose()?,
            reason: req.reason.as_deref().map(player_service::validate_reason).transpose()?,
            reported_by: req
                .reported_by
                .as_deref()
                .map(player_service::validate_reporter)
                .transpose()?,
            updated_at: Some(Utc::now()),
        };

        if let Some(nickname) = &changes.nickname {
            if nickname_in_use(conn, nickname, Some(player_id))? {
                return Err(AppError::new(
                    ErrorCode::NicknameTaken,
                    "another listed player already uses this nickname",
                ));
            }
        }

        Ok(diesel::update(players::table.find(player_id))
            .set(&changes)
            .get_result(conn)?)
    })?;

    tracing::info!(admin_id = admin.id, player_id = player.id, "player updated");

    Ok(Json(ApiResponse::ok_with_message(
        PlayerView::new(player, &state.minotar),
        "player updated",
    )))
}

// --- Remove player from the list (soft delete) ---

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(player_id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    let mut conn = state.db.get()?;

    conn.transaction::<_, AppError, _>(|conn| {
        find_active(conn, player_id)?;

        diesel::update(players::table.find(player_id))
            .set((
                players::is_active.eq(false),
                players::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    tracing::info!(admin_id = admin.id, player_id, "player removed from the list");

    Ok(Json(ApiResponse::ok_with_message((), "player removed from the list")))
}
