use crate::constants::{DEFAULT_PAGE_SIZE, PAGE_SIZE_CHOICES};
use crate::errors::GenericError;
use actix_http::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Wallet,
    Gcash,
    Cod,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "Wallet",
            PaymentMethod::Gcash => "GCash",
            PaymentMethod::Cod => "Cash on Delivery",
        }
    }
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Pending,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Pending => "Pending",
        }
    }
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Customer,
    Vendor,
}

/// One entry of an order's agreement thread. Identity is the full value
/// triple; there is no server-assigned message id.
#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AgreementMessage {
    pub sender: MessageSender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone)]
pub struct OrderItem {
    pub name: String,
    pub label: Option<String>,
    pub quantity: u32,
    #[schema(value_type = f64)]
    pub unit_price: BigDecimal,
    pub image_url: Option<String>,
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Default)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub barangay: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub zip: String,
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone)]
pub struct Order {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub order_id: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[schema(value_type = f64)]
    pub sub_total: BigDecimal,
    #[schema(value_type = f64)]
    pub shipping_fee: BigDecimal,
    #[schema(value_type = f64)]
    pub gross_amount: BigDecimal,
    #[schema(value_type = f64)]
    pub commission_amount: BigDecimal,
    pub tracking_number: Option<String>,
    pub customer_name: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    /// Free-text note captured at checkout; never mutated afterwards.
    pub agreement_details: Option<String>,
    pub agreement_messages: Vec<AgreementMessage>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    Asc,
    Desc,
}

impl Default for SortDir {
    fn default() -> Self {
        SortDir::Desc
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

/// Filter set applied to the order list. Changing any of these resets the
/// page to 1.
#[derive(Deserialize, Debug, Serialize, ToSchema, Clone, Default, PartialEq)]
pub struct OrderFilters {
    pub search: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sort: SortDir,
}

/// Page window over the filtered result count.
///
/// `page` is always within `[1, page_count()]`; out-of-range requests are
/// no-ops rather than clamps, so the prior valid page survives.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
    total: u64,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        let page_size = if PAGE_SIZE_CHOICES.contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self {
            page: 1,
            page_size,
            total: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_count(&self) -> u32 {
        let count = self.total.div_ceil(self.page_size as u64).max(1);
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Returns false and leaves the state untouched when `page` falls outside
    /// `[1, page_count()]`.
    pub fn set_page(&mut self, page: u32) -> bool {
        if page >= 1 && page <= self.page_count() {
            self.page = page;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self) -> bool {
        let next = self.page.saturating_add(1);
        self.set_page(next)
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.set_page(self.page - 1)
    }

    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        if !PAGE_SIZE_CHOICES.contains(&page_size) {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = total;
        // Shrinking results may strand the page past the last one.
        if self.page > self.page_count() {
            self.page = self.page_count();
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct OrderListRequest {
    #[serde(flatten)]
    pub filters: OrderFilters,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl FromRequest for OrderListRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Query::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(query) => Ok(query.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SearchRequest {
    pub query: String,
}

impl FromRequest for SearchRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

impl FromRequest for StatusUpdateRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ShipOrderRequest {
    pub tracking_number: Option<String>,
}

impl FromRequest for ShipOrderRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SendMessageRequest {
    pub message: String,
}

impl FromRequest for SendMessageRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

/// `new_agreement_message` push from the order provider.
#[derive(Deserialize, Debug, Serialize, ToSchema)]
pub struct AgreementMessageEvent {
    #[schema(value_type = String)]
    pub order_id: Uuid,
    pub sender: MessageSender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl FromRequest for AgreementMessageEvent {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct BulkReceiptRequest {
    #[schema(value_type = Vec<String>)]
    pub order_ids: Vec<Uuid>,
}

impl FromRequest for BulkReceiptRequest {
    type Error = GenericError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = web::Json::<Self>::from_request(req, payload);

        Box::pin(async move {
            match fut.await {
                Ok(json) => Ok(json.into_inner()),
                Err(e) => Err(GenericError::ValidationError(e.to_string())),
            }
        })
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct OrderListData {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: u32,
    pub page_count: u32,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TransitionData {
    pub transitions: Vec<OrderStatus>,
    pub can_ship: bool,
    pub can_cancel: bool,
    pub can_print: bool,
}
