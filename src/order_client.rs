use anyhow::anyhow;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::configuration::ProviderSettings;
use crate::routes::order::schemas::{
    AgreementMessage, MessageSender, Order, OrderFilters, OrderStatus,
};
use crate::schemas::GenericResponse;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum OrderProviderError {
    /// Business rejection from the order store (invalid transition, closed
    /// order, ...). Recoverable; shown inline next to the triggering order.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl std::fmt::Debug for OrderProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Serialize)]
struct OrderQueryRequest<'a> {
    #[serde(flatten)]
    filters: &'a OrderFilters,
    page: u32,
    page_size: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
struct StatusUpdateBody<'a> {
    status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_number: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AddMessageBody<'a> {
    sender: MessageSender,
    message: &'a str,
}

/// Client for the order data store. The dashboard never persists orders
/// itself; every durable mutation round-trips through here.
#[derive(Debug)]
pub struct OrderClient {
    http_client: Client,
    base_url: String,
    authorization_token: SecretString,
}

impl OrderClient {
    pub fn new(settings: &ProviderSettings) -> Self {
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .expect("Failed to build order provider client");
        Self {
            http_client,
            base_url: settings.base_url.clone(),
            authorization_token: settings.token.clone(),
        }
    }

    fn get_auth_token(&self) -> String {
        format!("Bearer {}", self.authorization_token.expose_secret())
    }

    #[tracing::instrument(name = "Fetch order page", skip(self))]
    pub async fn fetch_orders(
        &self,
        filters: &OrderFilters,
        page: u32,
        page_size: u32,
    ) -> Result<OrdersPage, OrderProviderError> {
        let url = format!("{}/orders/query", self.base_url);
        let request_body = OrderQueryRequest {
            filters,
            page,
            page_size,
        };
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.get_auth_token())
            .json(&request_body)
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<OrdersPage> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            response_body
                .data
                .ok_or_else(|| OrderProviderError::Rejected("Order page missing".to_string()))
        } else {
            Err(OrderProviderError::Rejected(response_body.customer_message))
        }
    }

    #[tracing::instrument(name = "Fetch single order", skip(self))]
    pub async fn fetch_single_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<Order>, OrderProviderError> {
        let url = format!("{}/orders/{}", self.base_url, order_id);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.get_auth_token())
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        let response_body: GenericResponse<Order> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            Ok(response_body.data)
        } else {
            Err(OrderProviderError::Rejected(response_body.customer_message))
        }
    }

    #[tracing::instrument(name = "Update order status", skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        next_status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<(), OrderProviderError> {
        let url = format!("{}/orders/{}/status", self.base_url, order_id);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.get_auth_token())
            .json(&StatusUpdateBody {
                status: next_status,
                tracking_number,
            })
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<()> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            Ok(())
        } else {
            Err(OrderProviderError::Rejected(response_body.customer_message))
        }
    }

    /// Appends one vendor message to the order's agreement thread. The store
    /// assigns the timestamp, so the returned message is the canonical copy
    /// local state must merge.
    #[tracing::instrument(name = "Add agreement message", skip(self, message))]
    pub async fn add_agreement_message(
        &self,
        order_id: Uuid,
        message: &str,
    ) -> Result<AgreementMessage, OrderProviderError> {
        let url = format!("{}/orders/{}/agreement-message", self.base_url, order_id);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.get_auth_token())
            .json(&AddMessageBody {
                sender: MessageSender::Vendor,
                message,
            })
            .send()
            .await
            .map_err(|err| anyhow!("Request error: {}", err))?;

        let status = response.status();
        let response_body: GenericResponse<AgreementMessage> = response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse response: {}", err))?;
        if status.is_success() {
            response_body
                .data
                .ok_or_else(|| OrderProviderError::Rejected("Stored message missing".to_string()))
        } else {
            Err(OrderProviderError::Rejected(response_body.customer_message))
        }
    }
}

/// Receipt eligibility. Mirrors the store-side predicate: nothing printable
/// before the order is at least paid.
pub fn can_print(order: &Order) -> bool {
    matches!(
        order.status,
        OrderStatus::Paid | OrderStatus::Shipped | OrderStatus::Delivered
    )
}
