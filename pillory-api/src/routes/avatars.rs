use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

use pillory_shared::clients::minotar::{AvatarKind, DEFAULT_SIZE};
use pillory_shared::errors::AppResult;
use pillory_shared::extract::{Path, Query};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvatarParams {
    #[serde(default)]
    pub kind: AvatarKind,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 { DEFAULT_SIZE }

/// GET /avatars/:nickname?kind=avatar&size=64
///
/// Proxies the Minotar image through the local disk cache.
pub async fn get_avatar(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    Query(params): Query<AvatarParams>,
) -> AppResult<Response> {
    let bytes = state
        .minotar
        .fetch(params.kind, &nickname, params.size)
        .await?;

    let cache_control = format!("public, max-age={}", state.minotar.cache_ttl().as_secs());

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        bytes,
    )
        .into_response())
}
