//! Smartlock server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start with the factory secret (development)
//! smartlock-server --bind 0.0.0.0:8080
//!
//! # Start with a provisioned secret
//! SMARTLOCK_SECRET=s3cret smartlock-server --bind 0.0.0.0:80
//! ```

use std::time::Duration;

use clap::Parser;
use smartlock_core::{ChallengePolicy, LockConfig, SharedSecret};
use smartlock_server::{IndicatorKind, Server, ServerError, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Factory secret; devices should be provisioned with their own.
const FACTORY_SECRET: &str = "DEFAULT_KEY";

/// Smartlock challenge-response server
#[derive(Parser, Debug)]
#[command(name = "smartlock-server")]
#[command(about = "Challenge-response smart lock server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:80")]
    bind: String,

    /// Pre-shared key clients combine with the challenge
    #[arg(long, env = "SMARTLOCK_SECRET", default_value = FACTORY_SECRET, hide_env_values = true)]
    secret: String,

    /// Delay before re-locking after a rejected response, in milliseconds
    #[arg(long, default_value = "4000")]
    relock_delay_ms: u64,

    /// Consume the challenge on every verify attempt
    #[arg(long)]
    single_use_challenges: bool,

    /// Indicator sink
    #[arg(long, value_enum, default_value_t = IndicatorKind::Tracing)]
    indicator: IndicatorKind,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Smartlock server starting");
    tracing::info!("Binding to {}", args.bind);

    if args.secret == FACTORY_SECRET {
        tracing::warn!("Using the factory default secret - provision a device secret!");
    }

    let secret = SharedSecret::new(args.secret.into_bytes())
        .map_err(ServerError::Lock)?;
    let challenge_policy = if args.single_use_challenges {
        ChallengePolicy::SingleUse
    } else {
        ChallengePolicy::Reusable
    };

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        lock: LockConfig {
            secret,
            relock_delay: Duration::from_millis(args.relock_delay_ms),
            challenge_policy,
        },
        indicator: args.indicator,
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
