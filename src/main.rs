//! Builder: compiler event host
//!
//! Loads configuration, boots the builder services, applies their plugins to
//! an in-process compiler and runs one build. Exits with the build code.

use tracing_subscriber::{EnvFilter, fmt};

use builder_core::config::BuilderConfig;
use builder_core::error::AppError;
use builder_core::events::BuildOutcome;
use builder_plugin::compiler::{Compiler, Stats};
use builder_service::Builder;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match run(config).await {
        Ok(outcome) => std::process::exit(i32::from(outcome.code())),
        Err(e) => {
            tracing::error!("Build error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<BuilderConfig, AppError> {
    let env = std::env::var("BUILDER_ENV").unwrap_or_else(|_| "development".to_string());
    BuilderConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &BuilderConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Logs go to stderr; stdout is the default IPC target.
    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Boot the builder and run one build
async fn run(config: BuilderConfig) -> Result<BuildOutcome, AppError> {
    tracing::info!("Starting builder v{}", env!("CARGO_PKG_VERSION"));

    let mut builder = Builder::new(config).await?;
    let registered = builder.register_default_services();
    tracing::info!("Registered {} service(s)", registered);
    builder.echo();

    let compiler = Compiler::new();
    let applied = builder.apply_plugins(&compiler)?;
    tracing::info!(
        "Applied {} plugin(s), {} listener(s) bound",
        applied,
        compiler.listener_count()
    );

    let stats = compiler.run(Stats::new()).await?;
    Ok(BuildOutcome::from_has_errors(stats.has_errors()))
}
