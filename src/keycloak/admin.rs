//! Keycloak admin API client
//!
//! Authenticates against the master realm and drives the realm's identity
//! provider endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::ConfigurationMap;
use crate::error::{Result, SetupError};

const ADMIN_CLI_CLIENT_ID: &str = "admin-cli";

/// Registry of identity providers within a realm.
///
/// The realm's import capability, injected so tests can substitute a double
/// for the live admin API.
#[async_trait]
pub trait IdentityProviderRegistry: Send + Sync {
    /// Import a provider configuration from a discovery URL
    async fn import_from(&self, payload: &ConfigurationMap) -> Result<ConfigurationMap>;
}

/// Token response from the master realm token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Identity provider instance as the admin API represents it
#[derive(Debug, Serialize)]
struct IdentityProviderRepresentation {
    alias: String,
    #[serde(rename = "providerId")]
    provider_id: String,
    enabled: bool,
    config: ConfigurationMap,
}

/// Authenticated client for a realm's identity provider endpoints
pub struct KeycloakAdmin {
    base_url: String,
    realm: String,
    access_token: String,
    client: reqwest::Client,
}

impl KeycloakAdmin {
    /// Log in to the master realm with the admin-cli password grant
    pub async fn login(
        base_url: &str,
        realm: &str,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let token_url = format!("{}/realms/master/protocol/openid-connect/token", base_url);

        let client = reqwest::Client::new();
        let params = [
            ("grant_type", "password"),
            ("client_id", ADMIN_CLI_CLIENT_ID),
            ("username", username),
            ("password", password),
        ];

        let response = client.post(&token_url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(SetupError::Token(format!(
                "Admin login failed with status: {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;

        tracing::debug!("Authenticated against {} as {}", base_url, username);

        Ok(Self {
            base_url,
            realm: realm.to_string(),
            access_token: token.access_token,
            client,
        })
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/realms/{}/{}", self.base_url, self.realm, path)
    }

    /// Create the identity provider instance, replacing an existing provider
    /// with the same alias.
    pub async fn register_identity_provider(
        &self,
        alias: &str,
        provider_id: &str,
        config: ConfigurationMap,
    ) -> Result<()> {
        let representation = IdentityProviderRepresentation {
            alias: alias.to_string(),
            provider_id: provider_id.to_string(),
            enabled: true,
            config,
        };

        let response = self
            .client
            .post(self.admin_url("identity-provider/instances"))
            .bearer_auth(&self.access_token)
            .json(&representation)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            tracing::info!("Identity provider {} already exists, replacing it", alias);

            let response = self
                .client
                .put(self.admin_url(&format!("identity-provider/instances/{}", alias)))
                .bearer_auth(&self.access_token)
                .json(&representation)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(SetupError::Admin(format!(
                    "Updating identity provider {} failed with status: {}",
                    alias,
                    response.status()
                )));
            }

            return Ok(());
        }

        if !response.status().is_success() {
            return Err(SetupError::Admin(format!(
                "Creating identity provider {} failed with status: {}",
                alias,
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl IdentityProviderRegistry for KeycloakAdmin {
    async fn import_from(&self, payload: &ConfigurationMap) -> Result<ConfigurationMap> {
        tracing::debug!(
            "Importing provider configuration from {:?}",
            payload.get("fromUrl")
        );

        let response = self
            .client
            .post(self.admin_url("identity-provider/import-config"))
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SetupError::Admin(format!(
                "Provider import failed with status: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
