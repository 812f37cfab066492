use actix_web::web;
use diesel::SqliteConnection;

use crate::config::Settings;
use crate::crypto::{Passwords, Tokens};
use crate::db::{self, DbPool};
use crate::error::AppResult;

pub struct AppContext {
    pub settings: Settings,
    pub pool: DbPool,
    pub passwords: Passwords,
    pub tokens: Tokens,
}

impl AppContext {
    pub fn new(settings: Settings) -> AppResult<Self> {
        let pool = db::init(&settings.database_url)?;
        Self::with_pool(settings, pool)
    }

    pub fn with_pool(settings: Settings, pool: DbPool) -> AppResult<Self> {
        let passwords = Passwords::new(settings.hash_cost)?;
        let tokens = Tokens::new(settings.secret_key.as_bytes());
        log::info!(
            "context ready: profile={} database={}",
            settings.profile,
            settings.database_url
        );
        Ok(Self {
            settings,
            pool,
            passwords,
            tokens,
        })
    }

    // Runs `f` on a pooled connection off the async executor. The connection
    // goes back to the pool when `f` returns, whatever the outcome.
    pub async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        web::block(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }

    pub fn shutdown(&self) {
        let state = self.pool.state();
        log::info!(
            "shutting down: {} pooled connections ({} idle)",
            state.connections,
            state.idle_connections
        );
    }
}
