use anyhow::anyhow;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use crate::configuration::ProviderSettings;
use crate::schemas::GenericResponse;

#[derive(Debug, Deserialize)]
pub struct SessionInfo {
    pub vendor_id: Uuid,
    pub vendor_name: String,
}

/// Client for the session service. The dashboard itself issues no tokens; it
/// only checks that a presented one is still live before admitting a socket.
#[derive(Debug)]
pub struct SessionClient {
    http_client: Client,
    base_url: String,
    authorization_token: SecretString,
}

impl SessionClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .expect("Failed to build session provider client");
        Self {
            http_client,
            base_url: settings.base_url.clone(),
            authorization_token: settings.token.clone(),
        }
    }

    fn get_auth_token(&self) -> String {
        format!("Bearer {}", self.authorization_token.expose_secret())
    }

    #[tracing::instrument(name = "Fetch session", skip(self, token))]
    pub async fn fetch_session(&self, token: &str) -> Result<Option<SessionInfo>, anyhow::Error> {
        let url = format!("{}/session/verify", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.get_auth_token())
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let status = response.status();
        let response_body: GenericResponse<SessionInfo> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            Ok(response_body.data)
        } else {
            Err(anyhow!(response_body.customer_message))
        }
    }
}
