//! Configuration parsing and validation

use crate::error::{Result, SetupError};
use crate::keycloak::OidcConfig;
use clap::Parser;

const DEFAULT_PROVIDER_TYPE: &str = "oidc";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "keycloak-oidc-setup",
    version,
    about = "Keycloak OIDC identity provider setup",
    long_about = "Registers an external OpenID Connect identity provider inside a Keycloak realm, importing its base configuration from the provider's discovery endpoint"
)]
pub struct Config {
    /// Base URL of the Keycloak server (e.g., https://keycloak.example.com)
    #[arg(value_name = "KEYCLOAK_URL", env = "KEYCLOAK_URL")]
    pub keycloak_url: String,

    /// Keycloak admin username (master realm)
    #[arg(long, env = "KEYCLOAK_ADMIN_USER")]
    pub admin_username: String,

    /// Keycloak admin password
    #[arg(long, env = "KEYCLOAK_ADMIN_PASSWORD")]
    pub admin_password: String,

    /// Realm the identity provider is registered into
    #[arg(long, env = "KEYCLOAK_REALM")]
    pub realm: String,

    /// Base URL of the web application the provider redirects back to
    #[arg(long, env = "WEBAPP_URL")]
    pub webapp_url: String,

    /// OIDC provider domain (issuer host, scheme optional)
    #[arg(long, env = "OIDC_DOMAIN")]
    pub oidc_domain: String,

    /// Provider app name, used as the broker alias and in the redirect path
    #[arg(long, env = "OIDC_APP_NAME")]
    pub oidc_app_name: String,

    /// OAuth client ID registered with the provider
    #[arg(long, env = "OIDC_CLIENT_ID")]
    pub oidc_client_id: String,

    /// OAuth client secret
    #[arg(long, env = "OIDC_CLIENT_SECRET")]
    pub oidc_client_secret: String,

    /// Keycloak provider type to import as (default: "oidc")
    #[arg(long, env = "KEYCLOAK_PROVIDER_TYPE")]
    pub provider_type: Option<String>,

    /// Show only error messages
    #[arg(long, conflicts_with = "debug")]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long, env = "KEYCLOAK_SETUP_DEBUG")]
    pub debug: bool,
}

impl Config {
    /// Parse configuration from CLI arguments and environment variables
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.keycloak_url.is_empty() {
            return Err(SetupError::Config("Keycloak URL is required".to_string()));
        }

        if self.realm.is_empty() {
            return Err(SetupError::Config("Realm name is required".to_string()));
        }

        if self.webapp_url.is_empty() {
            return Err(SetupError::Config("Webapp URL is required".to_string()));
        }

        if self.oidc_domain.is_empty() {
            return Err(SetupError::Config("OIDC domain is required".to_string()));
        }

        if self.oidc_app_name.is_empty() {
            return Err(SetupError::Config("OIDC app name is required".to_string()));
        }

        if self.oidc_client_id.is_empty() {
            return Err(SetupError::Config("OIDC client ID is required".to_string()));
        }

        // Validate URLs
        url::Url::parse(&self.keycloak_url)
            .map_err(|e| SetupError::Config(format!("Invalid Keycloak URL: {}", e)))?;

        url::Url::parse(&self.webapp_url)
            .map_err(|e| SetupError::Config(format!("Invalid webapp URL: {}", e)))?;

        Ok(())
    }

    /// Get the Keycloak provider type (with default)
    pub fn provider_type(&self) -> String {
        self.provider_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PROVIDER_TYPE.to_string())
    }

    /// Build the OIDC provider settings from the parsed arguments
    pub fn oidc_config(&self) -> OidcConfig {
        OidcConfig {
            domain: self.oidc_domain.clone(),
            app_name: self.oidc_app_name.clone(),
            client_id: self.oidc_client_id.clone(),
            client_secret: self.oidc_client_secret.clone(),
        }
    }

    /// Get log level based on flags
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
