use anyhow::Context;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::PgConnection;

use pillory_api::config::AppConfig;
use pillory_shared::clients::db::create_pool;
use pillory_shared::clients::minotar::MinotarClient;

mod cli;
mod commands;

use cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::args();
    let config = AppConfig::load()?;

    pillory_shared::middleware::init_tracing("pillory-admin");

    match args {
        Args::Create { username, password, email, super_admin } => {
            let mut conn = connect(&config)?;
            let admin = commands::create_admin(&mut conn, &username, &password, &email, super_admin)?;
            tracing::info!(admin_id = admin.id, username = %admin.username, "admin created from CLI");
            println!("Administrator '{}' created (ID: {}).", admin.username, admin.id);
        }
        Args::List => {
            let mut conn = connect(&config)?;
            let admins = commands::list_admins(&mut conn)?;
            if admins.is_empty() {
                println!("No administrators found.");
            } else {
                println!("Administrators:");
                for admin in &admins {
                    println!("{}", commands::describe(admin));
                }
            }
        }
        Args::Delete { username } => {
            let mut conn = connect(&config)?;
            commands::delete_admin(&mut conn, &username)?;
            tracing::info!(%username, "admin deleted from CLI");
            println!("Administrator '{username}' deleted.");
        }
        Args::Password { username, new_password } => {
            let mut conn = connect(&config)?;
            commands::change_password(&mut conn, &username, &new_password)?;
            tracing::info!(%username, "admin password changed from CLI");
            println!("Password for '{username}' changed.");
        }
        Args::ClearCache { older_than_hours } => {
            let minotar = MinotarClient::new(config.minotar())?;
            let removed = commands::clear_cache(&minotar, older_than_hours).await?;
            println!("Removed {removed} cached avatar(s) from {}.", minotar.cache_dir().display());
        }
    }

    Ok(())
}

fn connect(config: &AppConfig) -> anyhow::Result<PooledConnection<ConnectionManager<PgConnection>>> {
    let pool = create_pool(&config.database_url, 1).context("failed to connect to the database")?;
    Ok(pool.get()?)
}
