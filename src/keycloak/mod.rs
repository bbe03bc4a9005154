//! Keycloak identity provider setup

pub mod admin;
pub mod provider;

pub use admin::{IdentityProviderRegistry, KeycloakAdmin};
pub use provider::{ConfigurationMap, OidcConfig, ProviderConfigService};
