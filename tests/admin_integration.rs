//! Integration tests for the Keycloak admin client
//!
//! Drives admin login, provider import and registration against a mocked
//! Keycloak admin API.

use keycloak_oidc_setup::error::SetupError;
use keycloak_oidc_setup::keycloak::{
    ConfigurationMap, KeycloakAdmin, OidcConfig, ProviderConfigService,
};
use mockito::{Matcher, ServerGuard};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

fn test_oidc_config() -> OidcConfig {
    OidcConfig {
        domain: "login.example.com".to_string(),
        app_name: "okta".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

/// Helper to mock the master realm token endpoint and log in against it
async fn login_against(server: &mut ServerGuard) -> KeycloakAdmin {
    let _token_mock = server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".to_string(), "password".to_string()),
            Matcher::UrlEncoded("client_id".to_string(), "admin-cli".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "test-token", "token_type": "Bearer"}"#)
        .create_async()
        .await;

    KeycloakAdmin::login(&server.url(), "airbyte", "admin", "admin")
        .await
        .expect("Failed to log in against mocked Keycloak")
}

#[tokio::test]
async fn test_login_fails_on_bad_credentials() {
    let mut server = mockito::Server::new_async().await;

    let _token_mock = server
        .mock("POST", TOKEN_PATH)
        .with_status(401)
        .with_body(r#"{"error": "invalid_grant"}"#)
        .create_async()
        .await;

    let result = KeycloakAdmin::login(&server.url(), "airbyte", "admin", "wrong").await;

    assert!(matches!(result, Err(SetupError::Token(_))));
}

#[tokio::test]
async fn test_import_posts_derived_discovery_url() {
    let mut server = mockito::Server::new_async().await;
    let admin = login_against(&mut server).await;

    let import_mock = server
        .mock("POST", "/admin/realms/airbyte/identity-provider/import-config")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(serde_json::json!({
            "providerId": "oidc",
            "fromUrl": "https://login.example.com/.well-known/openid-configuration"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "authorizationUrl": "https://login.example.com/authorize",
                "tokenUrl": "https://login.example.com/token"
            }"#,
        )
        .create_async()
        .await;

    let service = ProviderConfigService::new(
        "http://localhost:8000".to_string(),
        "airbyte".to_string(),
    );

    let imported = service
        .import_provider_from(&admin, &test_oidc_config(), "oidc")
        .await
        .unwrap();

    import_mock.assert_async().await;
    assert_eq!(
        imported.get("authorizationUrl").unwrap(),
        "https://login.example.com/authorize"
    );
    assert_eq!(
        imported.get("tokenUrl").unwrap(),
        "https://login.example.com/token"
    );
}

#[tokio::test]
async fn test_import_propagates_admin_failure() {
    let mut server = mockito::Server::new_async().await;
    let admin = login_against(&mut server).await;

    let _import_mock = server
        .mock("POST", "/admin/realms/airbyte/identity-provider/import-config")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let service = ProviderConfigService::new(
        "http://localhost:8000".to_string(),
        "airbyte".to_string(),
    );

    let result = service
        .import_provider_from(&admin, &test_oidc_config(), "oidc")
        .await;

    assert!(matches!(result, Err(SetupError::Admin(_))));
}

#[tokio::test]
async fn test_register_creates_provider_instance() {
    let mut server = mockito::Server::new_async().await;
    let admin = login_against(&mut server).await;

    let create_mock = server
        .mock("POST", "/admin/realms/airbyte/identity-provider/instances")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "alias": "okta",
            "providerId": "oidc",
            "enabled": true,
            "config": {
                "clientId": "client-id",
                "authorizationUrl": "https://login.example.com/authorize"
            }
        })))
        .with_status(201)
        .create_async()
        .await;

    let service = ProviderConfigService::new(
        "http://localhost:8000".to_string(),
        "airbyte".to_string(),
    );
    let oidc_config = test_oidc_config();

    let mut imported = ConfigurationMap::new();
    imported.insert(
        "authorizationUrl".to_string(),
        "https://login.example.com/authorize".to_string(),
    );
    let config = service.setup_provider_config(&oidc_config, imported);

    admin
        .register_identity_provider(&oidc_config.app_name, "oidc", config)
        .await
        .unwrap();

    create_mock.assert_async().await;
}

#[tokio::test]
async fn test_register_replaces_existing_provider_on_conflict() {
    let mut server = mockito::Server::new_async().await;
    let admin = login_against(&mut server).await;

    let create_mock = server
        .mock("POST", "/admin/realms/airbyte/identity-provider/instances")
        .with_status(409)
        .with_body(r#"{"errorMessage": "Identity Provider okta already exists"}"#)
        .create_async()
        .await;

    let update_mock = server
        .mock("PUT", "/admin/realms/airbyte/identity-provider/instances/okta")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "alias": "okta",
            "enabled": true
        })))
        .with_status(204)
        .create_async()
        .await;

    admin
        .register_identity_provider("okta", "oidc", ConfigurationMap::new())
        .await
        .unwrap();

    create_mock.assert_async().await;
    update_mock.assert_async().await;
}

#[tokio::test]
async fn test_register_fails_on_unexpected_status() {
    let mut server = mockito::Server::new_async().await;
    let admin = login_against(&mut server).await;

    let _create_mock = server
        .mock("POST", "/admin/realms/airbyte/identity-provider/instances")
        .with_status(403)
        .create_async()
        .await;

    let result = admin
        .register_identity_provider("okta", "oidc", ConfigurationMap::new())
        .await;

    assert!(matches!(result, Err(SetupError::Admin(_))));
}
