//! Minotar avatar lookups with a small on-disk cache.
//!
//! Minotar renders Minecraft skins by player name. Image URLs are handed to
//! clients directly; downloaded images are kept under the cache directory and
//! reused until their modification time is older than the configured TTL.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, ErrorCode};

pub const DEFAULT_BASE_URL: &str = "https://minotar.net";
pub const FALLBACK_NICKNAME: &str = "steve";
pub const VALID_SIZES: [u32; 7] = [8, 16, 32, 64, 128, 256, 512];
pub const DEFAULT_SIZE: u32 = 64;

const NICKNAME_MIN_LEN: usize = 3;
const NICKNAME_MAX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    #[default]
    Avatar,
    Helm,
    Body,
}

impl AvatarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarKind::Avatar => "avatar",
            AvatarKind::Helm => "helm",
            AvatarKind::Body => "body",
        }
    }
}

impl fmt::Display for AvatarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image size Minotar can render. Anything else falls back to 64px.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvatarSize(u32);

impl AvatarSize {
    pub fn normalize(px: u32) -> Self {
        if VALID_SIZES.contains(&px) {
            Self(px)
        } else {
            Self(DEFAULT_SIZE)
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for AvatarSize {
    fn default() -> Self {
        Self(DEFAULT_SIZE)
    }
}

impl fmt::Display for AvatarSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trims the nickname and checks it is 3-16 characters of `[A-Za-z0-9_]`.
pub fn sanitize_nickname(nickname: &str) -> Option<&str> {
    let nickname = nickname.trim();
    let len = nickname.chars().count();
    if !(NICKNAME_MIN_LEN..=NICKNAME_MAX_LEN).contains(&len) {
        return None;
    }
    if !nickname.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(nickname)
}

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("invalid player nickname")]
    InvalidNickname,

    #[error("avatar request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("avatar cache I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl From<AvatarError> for AppError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::InvalidNickname => {
                AppError::new(ErrorCode::InvalidNickname, "invalid Minecraft nickname")
            }
            AvatarError::Http(e) => {
                tracing::warn!(error = %e, "avatar upstream request failed");
                AppError::new(ErrorCode::AvatarUnavailable, "avatar service unavailable")
            }
            AvatarError::Io(e) => AppError::internal(format!("avatar cache error: {e}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinotarConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl Default for MinotarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: PathBuf::from("avatar_cache"),
            cache_ttl: Duration::from_secs(24 * 3600),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MinotarClient {
    client: Client,
    base_url: String,
    cache_dir: PathBuf,
    cache_ttl: Duration,
}

impl MinotarClient {
    /// Creates the client and makes sure the cache directory exists.
    pub fn new(config: MinotarConfig) -> Result<Self, AvatarError> {
        std::fs::create_dir_all(&config.cache_dir)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        tracing::info!(
            base_url = %config.base_url,
            cache_dir = %config.cache_dir.display(),
            "Minotar client initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache_dir: config.cache_dir,
            cache_ttl: config.cache_ttl,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Public image URL. Invalid nicknames render the default skin.
    pub fn image_url(&self, kind: AvatarKind, nickname: &str, size: u32) -> String {
        let nickname = sanitize_nickname(nickname).unwrap_or(FALLBACK_NICKNAME);
        let size = AvatarSize::normalize(size);
        format!("{}/{}/{}/{}", self.base_url, kind, nickname, size)
    }

    pub fn avatar_url(&self, nickname: &str, size: u32) -> String {
        self.image_url(AvatarKind::Avatar, nickname, size)
    }

    pub fn helm_url(&self, nickname: &str, size: u32) -> String {
        self.image_url(AvatarKind::Helm, nickname, size)
    }

    pub fn body_url(&self, nickname: &str, size: u32) -> String {
        self.image_url(AvatarKind::Body, nickname, size)
    }

    /// Cache file for an already sanitized nickname.
    pub fn cache_path(&self, kind: AvatarKind, nickname: &str, size: AvatarSize) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}_{}.png", nickname.to_lowercase(), kind, size))
    }

    pub async fn is_cache_valid(&self, path: &Path) -> bool {
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return false;
        };
        if !metadata.is_file() {
            return false;
        }
        match metadata.modified() {
            Ok(modified) => modified
                .checked_add(self.cache_ttl)
                .map_or(true, |expires| expires > SystemTime::now()),
            Err(_) => false,
        }
    }

    /// Returns the path of a cached image, fetching it from Minotar when the
    /// cache entry is missing, stale, or `use_cache` is false.
    pub async fn download(
        &self,
        kind: AvatarKind,
        nickname: &str,
        size: u32,
        use_cache: bool,
    ) -> Result<PathBuf, AvatarError> {
        let nickname = sanitize_nickname(nickname).ok_or(AvatarError::InvalidNickname)?;
        let size = AvatarSize::normalize(size);
        let cache_path = self.cache_path(kind, nickname, size);

        if use_cache && self.is_cache_valid(&cache_path).await {
            tracing::debug!(%nickname, %kind, %size, "avatar cache hit");
            return Ok(cache_path);
        }

        let url = self.image_url(kind, nickname, size.get());
        let bytes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        self.store(&cache_path, &bytes).await?;

        tracing::debug!(%nickname, %kind, %size, bytes = bytes.len(), "avatar downloaded");
        Ok(cache_path)
    }

    /// Writes through a per-download temp file and renames it into place, so
    /// concurrent misses never share a partial file.
    async fn store(&self, cache_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let tmp_path = self.cache_dir.join(format!(".{}.tmp", Uuid::new_v4()));

        let written = match tokio::fs::write(&tmp_path, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp_path, cache_path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp_path).await;
        }
        written
    }

    /// Image bytes, served from the cache when possible.
    pub async fn fetch(&self, kind: AvatarKind, nickname: &str, size: u32) -> Result<Vec<u8>, AvatarError> {
        let path = self.download(kind, nickname, size, true).await?;
        Ok(tokio::fs::read(path).await?)
    }

    /// Deletes cached files, optionally only those older than `older_than`.
    /// Returns how many files were removed.
    pub async fn clear_cache(&self, older_than: Option<Duration>) -> io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            if let Some(bound) = older_than {
                let age = metadata
                    .modified()
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .unwrap_or(Duration::ZERO);
                if age < bound {
                    continue;
                }
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "failed to remove cached avatar");
                }
            }
        }

        tracing::info!(removed, "avatar cache cleared");
        Ok(removed)
    }
}
