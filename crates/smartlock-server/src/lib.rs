//! Smartlock production server.
//!
//! This crate provides the production runtime around the sans-IO lock
//! machine using:
//! - axum over tokio for the HTTP transport
//! - OS entropy for challenges
//! - tokio timers for the deferred re-lock
//!
//! ## Architecture
//!
//! ```text
//! smartlock-server
//!   ├─ SystemEnv          (production Environment impl)
//!   ├─ http               (axum routes: /, /challenge, /response, /status)
//!   ├─ LockDriver         (mutex + action executor + re-lock tasks)
//!   ├─ LockMachine        (challenge-response state machine)
//!   └─ Indicator          (tracing sink or disconnected hardware)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
pub mod http;
mod indicator;
mod system_env;

use std::net::SocketAddr;

pub use driver::LockDriver;
pub use error::ServerError;
pub use http::create_router;
pub use indicator::{DisconnectedIndicator, IndicatorKind, TracingIndicator};
use smartlock_core::{Indicator, LockConfig};
pub use system_env::SystemEnv;
use tokio::net::TcpListener;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:80")
    pub bind_address: String,
    /// Lock machine configuration (secret, delay, challenge policy)
    pub lock: LockConfig,
    /// Indicator sink to drive
    pub indicator: IndicatorKind,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            lock: LockConfig::default(),
            indicator: IndicatorKind::default(),
        }
    }
}

/// Production smartlock server.
///
/// Wraps a `LockDriver` with the axum transport and system environment.
pub struct Server {
    /// Shared lock driver
    driver: LockDriver<SystemEnv, Box<dyn Indicator>>,
    /// Bound TCP listener
    listener: TcpListener,
}

impl Server {
    /// Boot the lock and bind the listener.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the bind address is not a socket address, and
    /// `Transport` if binding to it fails.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ServerError::Config(format!("invalid bind address {:?}: {}", config.bind_address, e))
        })?;
        let listener = TcpListener::bind(addr).await?;
        let driver =
            LockDriver::boot(SystemEnv::new(), config.indicator.build(), config.lock).await;

        Ok(Self { driver, listener })
    }

    /// Serve requests until ctrl-c.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        tracing::info!("HTTP server running on http://{}/", addr);

        let router = create_router(self.driver);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::from)?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
