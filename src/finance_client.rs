use anyhow::anyhow;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::configuration::ProviderSettings;
use crate::schemas::GenericResponse;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FinancialSummary {
    #[schema(value_type = f64)]
    pub gross_sales: BigDecimal,
    #[schema(value_type = f64)]
    pub commission_due: BigDecimal,
    #[schema(value_type = f64)]
    pub net_earnings: BigDecimal,
    #[schema(value_type = f64)]
    pub wallet_balance: BigDecimal,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommissionRow {
    #[schema(value_type = String)]
    pub order_id: Uuid,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    pub gross_amount: BigDecimal,
    #[schema(value_type = f64)]
    pub commission_rate: BigDecimal,
    #[schema(value_type = f64)]
    pub commission_amount: BigDecimal,
    pub settled: bool,
}

/// Result of a bulk remittance. `error` carries business rejections such as
/// an insufficient wallet balance; those stay scoped to the remit dialog.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RemitOutcome {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RemitRequest<'a> {
    order_ids: &'a [Uuid],
}

#[derive(Debug)]
pub struct FinanceClient {
    http_client: Client,
    base_url: String,
    authorization_token: SecretString,
}

impl FinanceClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .expect("Failed to build finance provider client");
        Self {
            http_client,
            base_url: settings.base_url.clone(),
            authorization_token: settings.token.clone(),
        }
    }

    fn get_auth_token(&self) -> String {
        format!("Bearer {}", self.authorization_token.expose_secret())
    }

    #[tracing::instrument(name = "Fetch financial summary", skip(self))]
    pub async fn fetch_summary(&self) -> Result<FinancialSummary, anyhow::Error> {
        let url = format!("{}/finance/summary", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.get_auth_token())
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<FinancialSummary> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            response_body
                .data
                .ok_or_else(|| anyhow!("Summary missing from response"))
        } else {
            Err(anyhow!(response_body.customer_message))
        }
    }

    #[tracing::instrument(name = "Fetch commission breakdown", skip(self))]
    pub async fn fetch_breakdown(&self) -> Result<Vec<CommissionRow>, anyhow::Error> {
        let url = format!("{}/finance/breakdown", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.get_auth_token())
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<Vec<CommissionRow>> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            Ok(response_body.data.unwrap_or_default())
        } else {
            Err(anyhow!(response_body.customer_message))
        }
    }

    /// Moves owed commission for the given orders from the wallet balance to
    /// the platform. Side effects live entirely on the provider.
    #[tracing::instrument(name = "Bulk remit commissions", skip(self))]
    pub async fn bulk_remit(&self, order_ids: &[Uuid]) -> Result<RemitOutcome, anyhow::Error> {
        let url = format!("{}/finance/remit", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.get_auth_token())
            .json(&RemitRequest { order_ids })
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<RemitOutcome> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        match response_body.data {
            Some(outcome) => Ok(outcome),
            None if status.is_success() => Ok(RemitOutcome {
                success: true,
                error: None,
            }),
            None => Ok(RemitOutcome {
                success: false,
                error: Some(response_body.customer_message),
            }),
        }
    }
}
