//! Provider configuration maps
//!
//! Builds the key/value maps Keycloak's admin API consumes when an external
//! OIDC identity provider is imported and registered in a realm.

use std::collections::HashMap;
use std::fmt;

use super::admin::IdentityProviderRegistry;
use crate::error::Result;

const HTTPS_PREFIX: &str = "https://";
const WELL_KNOWN_OPENID_CONFIGURATION_SUFFIX: &str = ".well-known/openid-configuration";
const DEFAULT_SCOPE: &str = "openid email profile";

/// Wire payload for the identity provider admin endpoints
pub type ConfigurationMap = HashMap<String, String>;

/// Settings describing one external OIDC provider
#[derive(Clone)]
pub struct OidcConfig {
    /// Provider issuer host, scheme optional
    pub domain: String,
    /// Broker alias, also used in the redirect path
    pub app_name: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The client secret stays out of logs
        f.debug_struct("OidcConfig")
            .field("domain", &self.domain)
            .field("app_name", &self.app_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Builds provider configuration maps for a fixed webapp URL and realm.
///
/// Construct once and share by reference; both operations are stateless
/// transformations over the configuration captured at construction.
pub struct ProviderConfigService {
    webapp_url: String,
    realm: String,
}

impl ProviderConfigService {
    pub fn new(webapp_url: String, realm: String) -> Self {
        Self { webapp_url, realm }
    }

    /// Import a base provider configuration from the provider's discovery endpoint.
    ///
    /// Builds the import request map and delegates to the registry; whatever
    /// map Keycloak returns is passed through unchanged, and so is any error.
    pub async fn import_provider_from(
        &self,
        registry: &dyn IdentityProviderRegistry,
        oidc_config: &OidcConfig,
        provider_id: &str,
    ) -> Result<ConfigurationMap> {
        let mut map = ConfigurationMap::new();
        map.insert("providerId".to_string(), provider_id.to_string());
        map.insert("fromUrl".to_string(), provider_discovery_url(oidc_config));

        registry.import_from(&map).await
    }

    /// Decorate an imported configuration map with the required provider settings.
    ///
    /// Every entry of `config_map` is preserved, then the required keys are
    /// written on top; a same-named key in the input loses.
    pub fn setup_provider_config(
        &self,
        oidc_config: &OidcConfig,
        config_map: ConfigurationMap,
    ) -> ConfigurationMap {
        let mut config = config_map;

        config.insert("clientId".to_string(), oidc_config.client_id.clone());
        config.insert("clientSecret".to_string(), oidc_config.client_secret.clone());
        config.insert("defaultScope".to_string(), DEFAULT_SCOPE.to_string());
        config.insert(
            "redirectUris".to_string(),
            self.provider_redirect_url(oidc_config),
        );
        config.insert("backchannelSupported".to_string(), "true".to_string());
        config.insert(
            "backchannel_logout_session_supported".to_string(),
            "true".to_string(),
        );

        config
    }

    /// Broker endpoint the provider redirects back to after authentication
    fn provider_redirect_url(&self, oidc_config: &OidcConfig) -> String {
        format!(
            "{}/auth/realms/{}/broker/{}/endpoint",
            self.webapp_url.trim_end_matches('/'),
            self.realm,
            oidc_config.app_name
        )
    }
}

/// Discovery URL for a provider domain.
///
/// Prepends `https://` when the scheme is missing and appends the well-known
/// suffix with exactly one separating slash, unless the domain already ends
/// with it.
fn provider_discovery_url(oidc_config: &OidcConfig) -> String {
    let mut domain = oidc_config.domain.clone();

    if !domain.starts_with(HTTPS_PREFIX) {
        domain = format!("{}{}", HTTPS_PREFIX, domain);
    }

    if !domain.ends_with(WELL_KNOWN_OPENID_CONFIGURATION_SUFFIX) {
        if !domain.ends_with('/') {
            domain.push('/');
        }
        domain.push_str(WELL_KNOWN_OPENID_CONFIGURATION_SUFFIX);
    }

    domain
}
