use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use super::schemas::{AgreementMessage, Order, OrderFilters, OrderStatus, Pagination};
use crate::constants::DEFAULT_PAGE_SIZE;

#[derive(Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended,
    Duplicate,
    UnknownOrder,
}

/// In-memory state for one vendor's dashboard session.
///
/// All views (order list, chat panel) read and write through the same
/// id-indexed entry, so a message merged once is visible everywhere and
/// the dedup check runs exactly once per event.
#[derive(Debug)]
pub struct OrderBoard {
    orders: HashMap<Uuid, Order>,
    page_ids: Vec<Uuid>,
    pinned: HashSet<Uuid>,
    filters: OrderFilters,
    pagination: Pagination,
    busy: HashSet<Uuid>,
    sending: HashSet<Uuid>,
    issued_generation: u64,
    applied_generation: u64,
    search_epoch: u64,
}

impl Default for OrderBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBoard {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            page_ids: Vec::new(),
            pinned: HashSet::new(),
            filters: OrderFilters::default(),
            pagination: Pagination::new(DEFAULT_PAGE_SIZE),
            busy: HashSet::new(),
            sending: HashSet::new(),
            issued_generation: 0,
            applied_generation: 0,
            search_epoch: 0,
        }
    }

    pub fn filters(&self) -> &OrderFilters {
        &self.filters
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    pub fn get(&self, order_id: Uuid) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// Caches an order loaded outside the list fetch (open chat or detail
    /// view). Pinned entries survive page re-fetches so their threads keep
    /// receiving merges.
    pub fn insert(&mut self, order: Order) {
        self.pinned.insert(order.id);
        self.orders.insert(order.id, order);
    }

    /// Current page of orders in list order.
    pub fn page_orders(&self) -> Vec<Order> {
        self.page_ids
            .iter()
            .filter_map(|id| self.orders.get(id))
            .cloned()
            .collect()
    }

    /// Replaces the filter set, resetting the page to 1 when anything
    /// actually changed.
    pub fn set_filters(&mut self, filters: OrderFilters) -> bool {
        if self.filters == filters {
            return false;
        }
        self.filters = filters;
        self.pagination.reset();
        true
    }

    /// Records a new search text and returns the epoch the debounce timer
    /// must still match once it fires.
    pub fn set_search(&mut self, query: Option<String>) -> u64 {
        self.filters.search = query;
        self.pagination.reset();
        self.search_epoch += 1;
        self.search_epoch
    }

    pub fn search_epoch(&self) -> u64 {
        self.search_epoch
    }

    pub fn next_generation(&mut self) -> u64 {
        self.issued_generation += 1;
        self.issued_generation
    }

    /// Applies a completed fetch. Returns false when a newer fetch already
    /// landed; the stale page is discarded so the list never flickers back.
    pub fn apply_fetch(&mut self, generation: u64, orders: Vec<Order>, total: u64) -> bool {
        if generation <= self.applied_generation {
            return false;
        }
        self.applied_generation = generation;
        let incoming: HashSet<Uuid> = orders.iter().map(|order| order.id).collect();
        // Only the previous page's entries are replaced. Pinned orders stay
        // loaded even when they fall off the page.
        for id in std::mem::take(&mut self.page_ids) {
            if !incoming.contains(&id) && !self.pinned.contains(&id) {
                self.orders.remove(&id);
            }
        }
        self.page_ids = orders.iter().map(|order| order.id).collect();
        for order in orders {
            self.orders.insert(order.id, order);
        }
        self.pagination.set_total(total);
        true
    }

    /// Busy flag serializing status updates per order id.
    pub fn begin_status_update(&mut self, order_id: Uuid) -> bool {
        self.busy.insert(order_id)
    }

    pub fn finish_status_update(&mut self, order_id: Uuid) {
        self.busy.remove(&order_id);
    }

    pub fn is_busy(&self, order_id: Uuid) -> bool {
        self.busy.contains(&order_id)
    }

    /// One message send in flight per order.
    pub fn begin_send(&mut self, order_id: Uuid) -> bool {
        self.sending.insert(order_id)
    }

    pub fn finish_send(&mut self, order_id: Uuid) {
        self.sending.remove(&order_id);
    }

    /// Applied only after the provider confirmed the transition; a failed
    /// request therefore never moves the displayed status.
    pub fn set_status(&mut self, order_id: Uuid, status: OrderStatus) {
        if let Some(order) = self.orders.get_mut(&order_id) {
            order.status = status;
            order.updated_on = Some(Utc::now());
        }
    }

    pub fn set_tracking_number(&mut self, order_id: Uuid, tracking_number: Option<String>) {
        if let Some(order) = self.orders.get_mut(&order_id) {
            if tracking_number.is_some() {
                order.tracking_number = tracking_number;
            }
        }
    }

    /// Merges one agreement message into the matching order.
    ///
    /// Identity is value equality on (timestamp, message, sender); there is
    /// no server-issued message id. Two genuinely distinct messages that
    /// share all three fields collapse into one entry — known limitation,
    /// kept as-is. Events for orders not currently loaded are discarded.
    pub fn merge_agreement_message(
        &mut self,
        order_id: Uuid,
        message: AgreementMessage,
    ) -> MergeOutcome {
        let Some(order) = self.orders.get_mut(&order_id) else {
            return MergeOutcome::UnknownOrder;
        };
        if order.agreement_messages.iter().any(|m| *m == message) {
            return MergeOutcome::Duplicate;
        }
        order.agreement_messages.push(message);
        MergeOutcome::Appended
    }
}
