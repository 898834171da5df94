//! # Machinist - Material & Machine Selection
//!
//! The main binary for the Machinist selection engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                apps/machinist (THE BINARY)               │
//! │                                                          │
//! │   ┌─────────────┐    ┌─────────────┐    ┌────────────┐   │
//! │   │   CLI       │    │   HTTP API  │    │   Config   │   │
//! │   │  (clap)     │    │   (axum)    │    │   (toml)   │   │
//! │   └──────┬──────┘    └──────┬──────┘    └─────┬──────┘   │
//! │          └──────────────────┼─────────────────┘          │
//! │                             ▼                            │
//! │                   ┌──────────────────┐                   │
//! │                   │  machinist-core  │                   │
//! │                   │   (THE LOGIC)    │                   │
//! │                   └──────────────────┘                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! machinist init
//! machinist import -f catalog.json
//! machinist materials --min-temp 600 --aerospace
//! machinist machines -c Superalloy -t "±0.01mm" -g complex -f high --feature 5-axis
//! machinist server --port 8080
//! ```

use clap::Parser;
use machinist::cli;
use machinist::config::{AppConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    let log_format = match &loaded {
        Ok((config, _)) => config.log.format,
        Err(_) => LogFormat::Text,
    };
    init_tracing(log_format);

    let mut config = match loaded {
        Ok((config, warnings)) => {
            for warning in warnings {
                tracing::warn!("{}", warning);
            }
            config
        }
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };
    cli.apply_to(&mut config);

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing. `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "machinist=info,tower_http=debug".into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Print the Machinist startup banner.
fn print_banner() {
    println!(
        r#"
  ███╗   ███╗ █████╗  ██████╗██╗  ██╗██╗███╗   ██╗██╗███████╗████████╗
  ████╗ ████║██╔══██╗██╔════╝██║  ██║██║████╗  ██║██║██╔════╝╚══██╔══╝
  ██╔████╔██║███████║██║     ███████║██║██╔██╗ ██║██║███████╗   ██║
  ██║╚██╔╝██║██╔══██║██║     ██╔══██║██║██║╚██╗██║██║╚════██║   ██║
  ██║ ╚═╝ ██║██║  ██║╚██████╗██║  ██║██║██║ ╚████║██║███████║   ██║
  ╚═╝     ╚═╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝╚═╝╚══════╝   ╚═╝

  Material & Machine Selection v{}

  Ranked • Exact • Explainable
"#,
        env!("CARGO_PKG_VERSION")
    );
}
