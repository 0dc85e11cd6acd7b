//! # Preview-Relay Service
//!
//! Binary entry point for the preview-relay HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging
//! - Constructs the CMP client and its token provider
//! - Starts the HTTP server from preview-relay-api

use std::sync::Arc;
use std::time::Duration;

use cmp_client::{CmpClient, CmpClientConfig};
use preview_relay_api::{start_server, ServiceConfig, ServiceError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "preview_relay_service=info,preview_relay_api=info,cmp_client=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Preview-Relay Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/preview-relay/service.yaml    — system-wide defaults
    //  2. ./config/service.yaml              — deployment-local override
    //  3. Path given by PRELAY_CONFIG_FILE   — operator-specified file
    //  4. Environment variables prefixed PRELAY (double-underscore separator)
    //     e.g. PRELAY__SERVER__PORT=9090 sets server.port = 9090
    //
    // Server and logging fields carry serde defaults, so absent files produce
    // a startable server configuration. The CMP and preview settings have no
    // usable defaults; validate() rejects a configuration that leaves any of
    // them empty, because the service cannot speak the preview protocol
    // without them.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/preview-relay/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("PRELAY_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("PRELAY").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Build the CMP client
    //
    // The client owns the token provider; both share one HTTP connection
    // pool and carry the configured timeout on every outbound call.
    // -------------------------------------------------------------------------
    let client_config = CmpClientConfig::default()
        .with_api_base_url(&service_config.cmp.api_base_url)
        .with_auth_base_url(&service_config.cmp.auth_base_url)
        .with_credentials(
            &service_config.cmp.client_id,
            &service_config.cmp.client_secret,
        )
        .with_timeout(Duration::from_secs(service_config.cmp.timeout_seconds));

    let cmp = match CmpClient::new(client_config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "Failed to construct CMP client; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        cmp_api = %service_config.cmp.api_base_url,
        "Starting HTTP server"
    );

    // Start the server
    if let Err(e) = start_server(service_config, cmp).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
