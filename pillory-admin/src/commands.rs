use anyhow::{bail, ensure, Context};
use diesel::prelude::*;

use pillory_api::models::{Admin, NewAdmin};
use pillory_api::schema::admins;
use pillory_api::services::auth_service;
use pillory_shared::clients::minotar::MinotarClient;

use crate::cli::hours;

pub const OPERATOR_USERNAME_MIN_LEN: usize = 3;
pub const OPERATOR_PASSWORD_MIN_LEN: usize = 6;

pub fn check_username(username: &str) -> anyhow::Result<()> {
    ensure!(
        username.chars().count() >= OPERATOR_USERNAME_MIN_LEN,
        "username must be at least {OPERATOR_USERNAME_MIN_LEN} characters"
    );
    Ok(())
}

pub fn check_password(password: &str) -> anyhow::Result<()> {
    ensure!(
        password.chars().count() >= OPERATOR_PASSWORD_MIN_LEN,
        "password must be at least {OPERATOR_PASSWORD_MIN_LEN} characters"
    );
    Ok(())
}

pub fn create_admin(
    conn: &mut PgConnection,
    username: &str,
    password: &str,
    email: &str,
    super_admin: bool,
) -> anyhow::Result<Admin> {
    check_username(username)?;
    check_password(password)?;

    let password_hash = auth_service::hash_password(password)?;

    conn.transaction(|conn| {
        let username_taken: i64 = admins::table
            .filter(admins::username.eq(username))
            .count()
            .get_result(conn)?;
        if username_taken > 0 {
            bail!("administrator '{username}' already exists");
        }

        let email_taken: i64 = admins::table
            .filter(admins::email.eq(email))
            .count()
            .get_result(conn)?;
        if email_taken > 0 {
            bail!("an administrator with email '{email}' already exists");
        }

        let admin = diesel::insert_into(admins::table)
            .values(&NewAdmin {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                is_super_admin: super_admin,
            })
            .get_result::<Admin>(conn)
            .context("failed to insert administrator")?;
        Ok(admin)
    })
}

pub fn list_admins(conn: &mut PgConnection) -> anyhow::Result<Vec<Admin>> {
    admins::table
        .order(admins::id.asc())
        .load::<Admin>(conn)
        .context("failed to load administrators")
}

pub fn delete_admin(conn: &mut PgConnection, username: &str) -> anyhow::Result<()> {
    let deleted = conn.transaction(|conn| {
        diesel::delete(admins::table.filter(admins::username.eq(username))).execute(conn)
    })?;
    ensure!(deleted > 0, "administrator '{username}' does not exist");
    Ok(())
}

pub fn change_password(
    conn: &mut PgConnection,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    check_password(new_password)?;
    let password_hash = auth_service::hash_password(new_password)?;

    let updated = conn.transaction(|conn| {
        diesel::update(admins::table.filter(admins::username.eq(username)))
            .set(admins::password_hash.eq(password_hash))
            .execute(conn)
    })?;
    ensure!(updated > 0, "administrator '{username}' does not exist");
    Ok(())
}

pub async fn clear_cache(minotar: &MinotarClient, older_than_hours: Option<u64>) -> anyhow::Result<usize> {
    minotar
        .clear_cache(older_than_hours.map(hours))
        .await
        .with_context(|| format!("failed to clear {}", minotar.cache_dir().display()))
}

/// One line per admin for `list`.
pub fn describe(admin: &Admin) -> String {
    let status = if admin.is_active { "active" } else { "inactive" };
    let role = if admin.is_super_admin { ", super admin" } else { "" };
    format!(
        "- {} (ID: {}, {}, {}{})",
        admin.username, admin.id, admin.email, status, role
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pillory_shared::clients::minotar::MinotarConfig;
    use std::time::Duration;
    use tempfile::TempDir;

    fn admin(is_active: bool, is_super_admin: bool) -> Admin {
        Admin {
            id: 7,
            username: "warden".into(),
            email: "warden@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
            last_login: None,
            is_active,
            is_super_admin,
        }
    }

    #[test]
    fn operator_rules_are_looser_than_http() {
        assert!(check_username("abc").is_ok());
        assert!(check_username("ab").is_err());
        assert!(check_password("simple").is_ok());
        assert!(check_password("short").is_err());
    }

    #[test]
    fn describe_shows_status_and_role() {
        assert_eq!(
            describe(&admin(true, true)),
            "- warden (ID: 7, warden@example.com, active, super admin)"
        );
        assert_eq!(
            describe(&admin(false, false)),
            "- warden (ID: 7, warden@example.com, inactive)"
        );
    }

    #[tokio::test]
    async fn clear_cache_removes_images() {
        let dir = TempDir::new().unwrap();
        let minotar = MinotarClient::new(MinotarConfig {
            cache_dir: dir.path().to_path_buf(),
            timeout: Duration::from_secs(1),
            ..MinotarConfig::default()
        })
        .unwrap();
        std::fs::write(dir.path().join("notch_avatar_64.png"), b"png").unwrap();
        std::fs::write(dir.path().join("jeb__helm_32.png"), b"png").unwrap();

        assert_eq!(clear_cache(&minotar, Some(1)).await.unwrap(), 0);
        assert_eq!(clear_cache(&minotar, None).await.unwrap(), 2);
    }
}
