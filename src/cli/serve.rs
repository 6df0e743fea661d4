//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, QuerygateConfig};
use crate::dispatch::Dispatcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<QuerygateConfig, Box<dyn std::error::Error>> {
    let mut config = QuerygateConfig::load_or_default(&args.config)?.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if config.enable_content_logging {
        eprintln!("WARNING: Content logging is enabled. Query text and result rows will be logged.");
        eprintln!("         This may include sensitive data. Use only for debugging.");
    }

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!("Starting querygate server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Build the dispatcher once and inject it into the router
    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
    for gateway in dispatcher.gateways() {
        match gateway.target() {
            Some(target) => tracing::info!(
                gateway = gateway.name(),
                source = %gateway.source(),
                command = %target,
                "Gateway configured"
            ),
            None => tracing::warn!(
                gateway = gateway.name(),
                source = %gateway.source(),
                "Gateway has no launch command; its queries will fail"
            ),
        }
    }

    let state = Arc::new(AppState::new(dispatcher, Arc::new(config.clone())));
    let app = create_router(state);

    // 4. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "querygate API server listening");

    let cancel_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    tracing::info!("querygate server stopped");
    Ok(())
}
