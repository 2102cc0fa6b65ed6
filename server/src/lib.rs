mod config;
mod provider;
mod routes;
mod session;

use axum::Router;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use types::Result;

pub use crate::config::{Config, ProviderConfig};
pub use crate::routes::{AppState, router};

/// Log to stdout, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Errs when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Load the configuration and build the `/userinfos` and `/auth` routes.
pub fn init() -> Result<Router> {
    let config = Config::load()?;
    let state = AppState::new(&config)?;
    Ok(router(state))
}
