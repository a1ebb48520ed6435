use std::sync::Mutex;

use actix::Addr;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::Deserialize;
use serde_json::json;
use utoipa::TupleUnit;
use uuid::Uuid;

use super::models::{MergeOutcome, OrderBoard};
use super::receipt::build_receipt_document;
use super::schemas::{
    AgreementMessage, AgreementMessageEvent, BulkReceiptRequest, Order, OrderListData,
    OrderListRequest, OrderStatus, SearchRequest, SendMessageRequest, ShipOrderRequest,
    StatusUpdateRequest, TransitionData,
};
use super::utils::{
    allowed_transitions, can_cancel, can_ship, order_list_data, refresh_order_list,
    schedule_search_refresh, validate_draft, SendGuard, StatusUpdateGuard,
};
use crate::configuration::Settings;
use crate::constants::PAGE_SIZE_CHOICES;
use crate::errors::GenericError;
use crate::order_client::{can_print, OrderClient};
use crate::schemas::{GenericResponse, RequestMetaData};
use crate::session_client::SessionClient;
use crate::websocket::{IsConnected, MessageToClient, Server, WebSocketActionType, WebSocketSession};

/// Reads an order through the board; falls back to the store and caches the
/// result so the list and chat surfaces share one copy.
async fn load_order(
    board: &web::Data<Mutex<OrderBoard>>,
    client: &OrderClient,
    order_id: Uuid,
) -> Result<Order, GenericError> {
    {
        let board = board.lock().expect("order board lock poisoned");
        if let Some(order) = board.get(order_id) {
            return Ok(order.clone());
        }
    }
    match client.fetch_single_order(order_id).await? {
        Some(order) => {
            board
                .lock()
                .expect("order board lock poisoned")
                .insert(order.clone());
            Ok(order)
        }
        None => Err(GenericError::NotFoundError(format!(
            "Order {} is not found",
            order_id
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/order/list",
    tag = "Order List",
    responses(
        (status=200, description= "Order List", body= GenericResponse<OrderListData>),
    )
)]
#[tracing::instrument(name = "order list", skip(board, client, ws_server))]
pub async fn order_list(
    query: OrderListRequest,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<OrderListData>>, GenericError> {
    if !PAGE_SIZE_CHOICES.contains(&query.page_size) {
        return Err(GenericError::ValidationError(format!(
            "{} is not a valid page size",
            query.page_size
        )));
    }
    let generation = {
        let mut board = board.lock().expect("order board lock poisoned");
        board.set_filters(query.filters);
        board.pagination_mut().set_page_size(query.page_size);
        board.pagination_mut().set_page(query.page);
        board.next_generation()
    };
    refresh_order_list(&board, &client, &ws_server, generation).await?;

    let data = {
        let board = board.lock().expect("order board lock poisoned");
        order_list_data(&board)
    };
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched order list",
        Some(data),
    )))
}

#[utoipa::path(
    post,
    path = "/order/search",
    tag = "Order Search",
    request_body(content = SearchRequest, description = "Request Body"),
    responses(
        (status=200, description= "Order Search", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "order search", skip(board, client, ws_server))]
pub async fn order_search(
    body: SearchRequest,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let query = body.query.trim();
    let search = if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    };
    let epoch = {
        let mut board = board.lock().expect("order board lock poisoned");
        board.set_search(search)
    };
    schedule_search_refresh(board, client, ws_server, epoch);
    Ok(web::Json(GenericResponse::success(
        "Search scheduled",
        Some(()),
    )))
}

#[utoipa::path(
    get,
    path = "/order/fetch/{id}",
    tag = "Order Fetch",
    responses(
        (status=200, description= "Order Fetch", body= GenericResponse<Order>),
    )
)]
#[tracing::instrument(name = "order fetch", skip(board, client))]
pub async fn order_fetch(
    path: web::Path<Uuid>,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
) -> Result<web::Json<GenericResponse<Order>>, GenericError> {
    let order = load_order(&board, &client, path.into_inner()).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched order",
        Some(order),
    )))
}

#[utoipa::path(
    get,
    path = "/order/transitions/{id}",
    tag = "Order Transitions",
    responses(
        (status=200, description= "Permissible actions for an order", body= GenericResponse<TransitionData>),
    )
)]
#[tracing::instrument(name = "order transitions", skip(board, client))]
pub async fn order_transitions(
    path: web::Path<Uuid>,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
) -> Result<web::Json<GenericResponse<TransitionData>>, GenericError> {
    let order = load_order(&board, &client, path.into_inner()).await?;
    let data = TransitionData {
        transitions: allowed_transitions(&order),
        can_ship: can_ship(&order),
        can_cancel: can_cancel(&order),
        can_print: can_print(&order),
    };
    Ok(web::Json(GenericResponse::success(
        "Successfully computed transitions",
        Some(data),
    )))
}

async fn apply_status_change(
    board: &web::Data<Mutex<OrderBoard>>,
    client: &OrderClient,
    ws_server: &Addr<Server>,
    order_id: Uuid,
    next_status: OrderStatus,
    tracking_number: Option<&str>,
) -> Result<(), GenericError> {
    let _guard = StatusUpdateGuard::try_begin(board, order_id).ok_or_else(|| {
        GenericError::ConflictError(format!(
            "A status update for order {} is already in progress",
            order_id
        ))
    })?;
    // Local state moves only after the store accepts; a failure leaves the
    // displayed status untouched.
    client
        .update_order_status(order_id, next_status, tracking_number)
        .await?;
    {
        let mut board = board.lock().expect("order board lock poisoned");
        board.set_status(order_id, next_status);
        board.set_tracking_number(order_id, tracking_number.map(|t| t.to_string()));
    }
    ws_server.do_send(MessageToClient::new(
        WebSocketActionType::StatusUpdated,
        json!({ "order_id": order_id, "status": next_status }),
        None,
    ));
    Ok(())
}

#[utoipa::path(
    post,
    path = "/order/status/{id}",
    tag = "Order Status Update",
    request_body(content = StatusUpdateRequest, description = "Request Body"),
    responses(
        (status=200, description= "Order Status Update", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "order status update", skip(board, client, ws_server))]
pub async fn order_status_update(
    path: web::Path<Uuid>,
    body: StatusUpdateRequest,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let order_id = path.into_inner();
    let order = load_order(&board, &client, order_id).await?;
    if !allowed_transitions(&order).contains(&body.status) {
        return Err(GenericError::ValidationError(format!(
            "Transition to {} is not permitted for order {}",
            body.status, order.order_id
        )));
    }
    apply_status_change(&board, &client, &ws_server, order_id, body.status, None).await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully updated order status",
        Some(()),
    )))
}

#[utoipa::path(
    post,
    path = "/order/ship/{id}",
    tag = "Order Ship",
    request_body(content = ShipOrderRequest, description = "Request Body"),
    responses(
        (status=200, description= "Order Ship", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "order ship", skip(board, client, ws_server))]
pub async fn order_ship(
    path: web::Path<Uuid>,
    body: ShipOrderRequest,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let order_id = path.into_inner();
    let order = load_order(&board, &client, order_id).await?;
    if !can_ship(&order) {
        return Err(GenericError::ValidationError(format!(
            "Order {} can only be shipped while pending",
            order.order_id
        )));
    }
    apply_status_change(
        &board,
        &client,
        &ws_server,
        order_id,
        OrderStatus::Shipped,
        body.tracking_number.as_deref(),
    )
    .await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully marked order as shipped",
        Some(()),
    )))
}

#[utoipa::path(
    post,
    path = "/order/cancel/{id}",
    tag = "Order Cancel",
    responses(
        (status=200, description= "Order Cancel", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "order cancel", skip(board, client, ws_server))]
pub async fn order_cancel(
    path: web::Path<Uuid>,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let order_id = path.into_inner();
    let order = load_order(&board, &client, order_id).await?;
    if !can_cancel(&order) {
        return Err(GenericError::ValidationError(format!(
            "Order {} can no longer be cancelled",
            order.order_id
        )));
    }
    apply_status_change(
        &board,
        &client,
        &ws_server,
        order_id,
        OrderStatus::Cancelled,
        None,
    )
    .await?;
    Ok(web::Json(GenericResponse::success(
        "Successfully cancelled order",
        Some(()),
    )))
}

#[utoipa::path(
    post,
    path = "/order/message/{id}",
    tag = "Agreement Message Send",
    request_body(content = SendMessageRequest, description = "Request Body"),
    responses(
        (status=200, description= "Agreement Message Send", body= GenericResponse<AgreementMessage>),
    )
)]
#[tracing::instrument(name = "agreement message send", skip(board, client, ws_server, body))]
pub async fn agreement_message_send(
    path: web::Path<Uuid>,
    body: SendMessageRequest,
    meta_data: RequestMetaData,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<AgreementMessage>>, GenericError> {
    let order_id = path.into_inner();
    let Some(draft) = validate_draft(&body.message) else {
        return Err(GenericError::ValidationError(
            "Message is empty".to_string(),
        ));
    };
    let connected = ws_server
        .send(IsConnected {
            id: meta_data.device_id.clone(),
        })
        .await
        .map_err(|err| anyhow::anyhow!("Websocket hub unavailable: {}", err))?;
    if !connected {
        // No provider request goes out; the client keeps its draft.
        return Err(GenericError::ValidationError(
            "Realtime channel is not connected".to_string(),
        ));
    }
    load_order(&board, &client, order_id).await?;
    let _guard = SendGuard::try_begin(&board, order_id).ok_or_else(|| {
        GenericError::ConflictError(format!(
            "A message for order {} is already being sent",
            order_id
        ))
    })?;

    let stored = client.add_agreement_message(order_id, draft).await?;
    let outcome = {
        let mut board = board.lock().expect("order board lock poisoned");
        board.merge_agreement_message(order_id, stored.clone())
    };
    if outcome == MergeOutcome::Appended {
        ws_server.do_send(MessageToClient::new(
            WebSocketActionType::NewAgreementMessage,
            json!({
                "order_id": order_id,
                "sender": stored.sender,
                "message": stored.message,
                "timestamp": stored.timestamp,
            }),
            Some(order_id),
        ));
    }
    Ok(web::Json(GenericResponse::success(
        "Successfully sent message",
        Some(stored),
    )))
}

#[utoipa::path(
    post,
    path = "/webhook/agreement-message",
    tag = "Agreement Message Webhook",
    request_body(content = AgreementMessageEvent, description = "Request Body"),
    responses(
        (status=200, description= "Agreement Message Webhook", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "agreement message webhook", skip(board, ws_server))]
pub async fn agreement_message_webhook(
    body: AgreementMessageEvent,
    board: web::Data<Mutex<OrderBoard>>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    let message = AgreementMessage {
        sender: body.sender,
        message: body.message.clone(),
        timestamp: body.timestamp,
    };
    let outcome = {
        let mut board = board.lock().expect("order board lock poisoned");
        board.merge_agreement_message(body.order_id, message)
    };
    match outcome {
        MergeOutcome::Appended => {
            ws_server.do_send(MessageToClient::new(
                WebSocketActionType::NewAgreementMessage,
                serde_json::to_value(&body)
                    .map_err(|err| GenericError::SerializationError(err.to_string()))?,
                Some(body.order_id),
            ));
        }
        // Already merged via the send path, or the order page moved on.
        MergeOutcome::Duplicate | MergeOutcome::UnknownOrder => {}
    }
    Ok(web::Json(GenericResponse::success(
        "Event processed",
        Some(()),
    )))
}

#[utoipa::path(
    get,
    path = "/order/receipt/{id}",
    tag = "Order Receipt",
    responses(
        (status=200, description= "Printable receipt document"),
    )
)]
#[tracing::instrument(name = "order receipt", skip(board, client, settings))]
pub async fn order_receipt(
    path: web::Path<Uuid>,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, GenericError> {
    let order = load_order(&board, &client, path.into_inner()).await?;
    if !can_print(&order) {
        return Err(GenericError::ValidationError(format!(
            "Order {} is not eligible for printing",
            order.order_id
        )));
    }
    let document = build_receipt_document(&[order], &settings.receipt.brand_name);
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(document))
}

#[utoipa::path(
    post,
    path = "/order/receipt/bulk",
    tag = "Order Receipt Bulk",
    request_body(content = BulkReceiptRequest, description = "Request Body"),
    responses(
        (status=200, description= "Printable batch receipt document"),
    )
)]
#[tracing::instrument(name = "order receipt bulk", skip(board, client, settings))]
pub async fn order_receipt_bulk(
    body: BulkReceiptRequest,
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    settings: web::Data<Settings>,
) -> Result<HttpResponse, GenericError> {
    let mut orders = Vec::with_capacity(body.order_ids.len());
    for order_id in body.order_ids {
        let order = load_order(&board, &client, order_id).await?;
        if can_print(&order) {
            orders.push(order);
        }
    }
    if orders.is_empty() {
        return Err(GenericError::ValidationError(
            "None of the selected orders are eligible for printing".to_string(),
        ));
    }
    let document = build_receipt_document(&orders, &settings.receipt.brand_name);
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(document))
}

#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    pub token: String,
    pub device_id: String,
}

#[tracing::instrument(name = "websocket connect", skip(req, stream, session_client, ws_server, query))]
pub async fn websocket_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsConnectQuery>,
    session_client: web::Data<SessionClient>,
    ws_server: web::Data<Addr<Server>>,
) -> Result<HttpResponse, GenericError> {
    let session = session_client.fetch_session(&query.token).await?;
    if session.is_none() {
        return Err(GenericError::ValidationError(
            "Session token is not valid".to_string(),
        ));
    }
    let session_actor = WebSocketSession::new(query.device_id.clone(), ws_server.get_ref().clone());
    ws::start(session_actor, &req, stream)
        .map_err(|err| GenericError::UnexpectedError(anyhow::anyhow!("{}", err)))
}
