//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use potluck::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
