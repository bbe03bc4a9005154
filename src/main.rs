//! Keycloak OIDC Setup - Main entry point
//!
//! Registers an external OpenID Connect identity provider inside a Keycloak
//! realm: imports the base configuration from the provider's discovery
//! endpoint, fills in the required provider settings, and creates the broker.

mod config;
mod error;
mod keycloak;

use config::Config;
use error::Result;
use keycloak::{KeycloakAdmin, ProviderConfigService};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();

    // Set up logging
    setup_logging(&config);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if !config.silent {
        info!("Keycloak URL: {}", config.keycloak_url);
        info!("Realm: {}", config.realm);
        info!("Webapp URL: {}", config.webapp_url);
        info!(
            "Provider: {} ({})",
            config.oidc_app_name,
            config.provider_type()
        );
    }

    if let Err(e) = run_setup(config).await {
        error!("Setup error: {}", e);
        std::process::exit(1);
    }
}

async fn run_setup(config: Config) -> Result<()> {
    info!("Authenticating against Keycloak...");

    let admin = KeycloakAdmin::login(
        &config.keycloak_url,
        &config.realm,
        &config.admin_username,
        &config.admin_password,
    )
    .await?;

    let service = ProviderConfigService::new(config.webapp_url.clone(), config.realm.clone());
    let oidc_config = config.oidc_config();
    let provider_type = config.provider_type();

    info!("Importing provider configuration from discovery endpoint...");
    let imported = service
        .import_provider_from(&admin, &oidc_config, &provider_type)
        .await?;

    let provider_config = service.setup_provider_config(&oidc_config, imported);

    info!("Registering identity provider {}...", oidc_config.app_name);
    admin
        .register_identity_provider(&oidc_config.app_name, &provider_type, provider_config)
        .await?;

    info!("Identity provider {} registered", oidc_config.app_name);

    Ok(())
}
