use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use pillory_shared::clients::minotar::{AvatarSize, MinotarClient, DEFAULT_SIZE};

use crate::schema::{admins, players};

// --- Admins ---

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = admins)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_super_admin: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admins)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_super_admin: bool,
}

// --- Players ---

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = players)]
pub struct Player {
    pub id: i32,
    pub nickname: String,
    pub reason: String,
    pub reported_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = players)]
pub struct NewPlayer {
    pub nickname: String,
    pub reason: String,
    pub reported_by: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = players)]
pub struct PlayerChanges {
    pub nickname: Option<String>,
    pub reason: Option<String>,
    pub reported_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AvatarSet {
    pub avatar: String,
    pub helm: String,
    pub body: String,
}

/// A player as returned by the API, with Minotar image URLs attached.
#[derive(Debug, Serialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub player: Player,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatars: Option<BTreeMap<String, AvatarSet>>,
}

impl PlayerView {
    pub fn new(player: Player, minotar: &MinotarClient) -> Self {
        let avatar_url = minotar.avatar_url(&player.nickname, DEFAULT_SIZE);
        Self {
            player,
            avatar_url,
            avatars: None,
        }
    }

    /// Adds `{avatar, helm, body}` URLs for each requested size, keyed `"{size}px"`.
    pub fn with_sizes(mut self, sizes: &[u32], minotar: &MinotarClient) -> Self {
        if sizes.is_empty() {
            return self;
        }

        let nickname = &self.player.nickname;
        let avatars = sizes
            .iter()
            .map(|&px| {
                let size = AvatarSize::normalize(px).get();
                let set = AvatarSet {
                    avatar: minotar.avatar_url(nickname, size),
                    helm: minotar.helm_url(nickname, size),
                    body: minotar.body_url(nickname, size),
                };
                (format!("{size}px"), set)
            })
            .collect();

        self.avatars = Some(avatars);
        self
    }
}
