use std::sync::Mutex;

use actix::Addr;
use actix_web::web;
use uuid::Uuid;

use super::models::OrderBoard;
use super::schemas::{Order, OrderListData, OrderStatus, PaymentMethod};
use crate::constants::SEARCH_DEBOUNCE;
use crate::order_client::{OrderClient, OrderProviderError};
use crate::websocket::{MessageToClient, Server, WebSocketActionType};

/// Statuses an order can be advanced to through the generic status control.
/// Shipping is deliberately absent: it has its own action, offered only
/// while the order is still pending.
const GENERAL_TRANSITIONS: [OrderStatus; 3] =
    [OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Delivered];

pub fn allowed_transitions(order: &Order) -> Vec<OrderStatus> {
    if order.status.is_terminal() {
        return Vec::new();
    }
    GENERAL_TRANSITIONS
        .into_iter()
        .filter(|next| *next != order.status)
        .filter(|next| *next != OrderStatus::Shipped)
        .filter(|next| {
            // COD payments are collected physically, never marked paid here.
            !(*next == OrderStatus::Paid && order.payment_method == PaymentMethod::Cod)
        })
        .collect()
}

pub fn can_ship(order: &Order) -> bool {
    order.status == OrderStatus::Pending
}

pub fn can_cancel(order: &Order) -> bool {
    !matches!(
        order.status,
        OrderStatus::Cancelled | OrderStatus::Delivered | OrderStatus::Shipped
    )
}

/// Trims the drafted message; `None` means there is nothing to send.
pub fn validate_draft(draft: &str) -> Option<&str> {
    let trimmed = draft.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Clears the per-order busy flag on every exit path of a status update.
pub struct StatusUpdateGuard {
    board: web::Data<Mutex<OrderBoard>>,
    order_id: Uuid,
}

impl StatusUpdateGuard {
    pub fn try_begin(board: &web::Data<Mutex<OrderBoard>>, order_id: Uuid) -> Option<Self> {
        let began = board
            .lock()
            .expect("order board lock poisoned")
            .begin_status_update(order_id);
        began.then(|| Self {
            board: board.clone(),
            order_id,
        })
    }
}

impl Drop for StatusUpdateGuard {
    fn drop(&mut self) {
        self.board
            .lock()
            .expect("order board lock poisoned")
            .finish_status_update(self.order_id);
    }
}

/// Same idea for in-flight message sends.
pub struct SendGuard {
    board: web::Data<Mutex<OrderBoard>>,
    order_id: Uuid,
}

impl SendGuard {
    pub fn try_begin(board: &web::Data<Mutex<OrderBoard>>, order_id: Uuid) -> Option<Self> {
        let began = board
            .lock()
            .expect("order board lock poisoned")
            .begin_send(order_id);
        began.then(|| Self {
            board: board.clone(),
            order_id,
        })
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.board
            .lock()
            .expect("order board lock poisoned")
            .finish_send(self.order_id);
    }
}

pub fn order_list_data(board: &OrderBoard) -> OrderListData {
    OrderListData {
        orders: board.page_orders(),
        total: board.pagination().total(),
        page: board.pagination().page(),
        page_count: board.pagination().page_count(),
    }
}

/// Fetches the current page from the order store and applies it under the
/// supersession rule: a fetch only lands when no newer one already has.
/// Applied pages are pushed to every connected dashboard session.
#[tracing::instrument(name = "Refresh order list", skip(board, client, ws_server))]
pub async fn refresh_order_list(
    board: &web::Data<Mutex<OrderBoard>>,
    client: &OrderClient,
    ws_server: &Addr<Server>,
    generation: u64,
) -> Result<(), OrderProviderError> {
    let (filters, page, page_size) = {
        let board = board.lock().expect("order board lock poisoned");
        (
            board.filters().clone(),
            board.pagination().page(),
            board.pagination().page_size(),
        )
    };
    let page_data = client.fetch_orders(&filters, page, page_size).await?;

    let applied = {
        let mut board = board.lock().expect("order board lock poisoned");
        board.apply_fetch(generation, page_data.orders, page_data.total)
    };
    if applied {
        let data = {
            let board = board.lock().expect("order board lock poisoned");
            order_list_data(&board)
        };
        let payload = serde_json::to_value(&data)
            .map_err(|err| anyhow::anyhow!("Failed to serialize order list: {}", err))?;
        ws_server.do_send(MessageToClient::new(
            WebSocketActionType::OrderList,
            payload,
            None,
        ));
    } else {
        tracing::info!("Discarding stale order fetch (generation {})", generation);
    }
    Ok(())
}

/// Debounce for search-text changes: wait out the typing pause, then refresh
/// only if no newer keystroke bumped the epoch in the meantime.
pub fn schedule_search_refresh(
    board: web::Data<Mutex<OrderBoard>>,
    client: web::Data<OrderClient>,
    ws_server: web::Data<Addr<Server>>,
    epoch: u64,
) {
    actix_web::rt::spawn(async move {
        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        let generation = {
            let mut board = board.lock().expect("order board lock poisoned");
            if board.search_epoch() != epoch {
                return;
            }
            board.next_generation()
        };
        if let Err(err) = refresh_order_list(&board, &client, &ws_server, generation).await {
            tracing::error!("Debounced search refresh failed: {:?}", err);
        }
    });
}
