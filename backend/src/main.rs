//! Backend entry-point: configuration, migrations, and server bootstrap.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use diesel::Connection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use potluck::inbound::http::health::HealthState;
use potluck::outbound::persistence::{DbPool, PoolConfig};

mod server;

use server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Load the session signing key, falling back to an ephemeral key only in
/// debug builds or when explicitly allowed.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Apply pending migrations over a blocking wrapper around the async
/// connection so the embedded harness can drive them.
async fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut conn: AsyncConnectionWrapper<diesel_async::AsyncPgConnection> =
            AsyncConnectionWrapper::establish(&url)
                .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))
    })
    .await
    .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let key = load_session_key()?;

    run_migrations(&database_url).await?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("pool construction failed: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr, pool);

    info!(%bind_addr, "starting server");
    let server = create_server(health_state, config)?;
    server.await
}
