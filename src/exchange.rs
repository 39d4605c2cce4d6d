//! Order execution boundary: the venue capability, an in-process paper
//! venue, and the tick-buffered router in front of it.

use chrono::{DateTime, Utc};

use crate::error::GatewayError;
use crate::types::Direction;

#[derive(Clone, Debug, PartialEq)]
pub struct OrderRequest {
    pub client_id: String,
    pub symbol: String,
    pub direction: Direction,
    pub quantity: f64,
    /// Market price at submission; refreshed when a buffered order is flushed.
    pub price: f64,
    pub stop_distance: f64,
    pub target_distance: f64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderFill {
    pub order_id: String,
    pub request: OrderRequest,
    pub fill_price: f64,
    pub filled_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountInfo {
    pub balance: f64,
    pub realized_pnl: f64,
    pub orders_filled: u64,
}

/// Venue capability injected into the router. Market orders only.
pub trait ExchangeGateway: Send {
    fn place_order(&mut self, request: &OrderRequest) -> Result<OrderFill, GatewayError>;

    fn cancel_order(&mut self, order_id: &str) -> Result<(), GatewayError>;

    fn account_info(&self) -> AccountInfo;

    /// Settlement hook for realized P&L on a closed position.
    fn report_pnl(&mut self, _realized: f64) {}
}

// ─── Paper venue ──────────────────────────────────────────────────────────────

/// Fills every valid market order immediately at the requested price.
pub struct PaperExchange {
    next_order: u64,
    balance: f64,
    realized: f64,
}

impl PaperExchange {
    pub fn new(balance: f64) -> Self {
        PaperExchange {
            next_order: 1,
            balance,
            realized: 0.0,
        }
    }

    /// Ids are `paper-N`; every id below the counter was filled.
    fn was_issued(&self, order_id: &str) -> bool {
        order_id
            .strip_prefix("paper-")
            .filter(|n| !n.starts_with('0'))
            .and_then(|n| n.parse::<u64>().ok())
            .map(|n| n >= 1 && n < self.next_order)
            .unwrap_or(false)
    }
}

impl ExchangeGateway for PaperExchange {
    fn place_order(&mut self, request: &OrderRequest) -> Result<OrderFill, GatewayError> {
        if !(request.quantity.is_finite() && request.quantity > 0.0) {
            return Err(GatewayError::Rejected(format!("invalid quantity {}", request.quantity)));
        }
        if !(request.price.is_finite() && request.price > 0.0) {
            return Err(GatewayError::Rejected(format!("invalid price {}", request.price)));
        }
        if request.direction == Direction::Close {
            return Err(GatewayError::Rejected("close orders are not supported".to_string()));
        }

        let order_id = format!("paper-{}", self.next_order);
        self.next_order += 1;
        log::debug!(
            "[{}] Paper fill {} {} {:.4} @ {:.2}",
            request.symbol, order_id, request.direction, request.quantity, request.price
        );
        Ok(OrderFill {
            order_id,
            request: request.clone(),
            fill_price: request.price,
            filled_at: request.submitted_at,
        })
    }

    fn cancel_order(&mut self, order_id: &str) -> Result<(), GatewayError> {
        if self.was_issued(order_id) {
            Err(GatewayError::Rejected(format!("order {} already filled", order_id)))
        } else {
            Err(GatewayError::UnknownOrder(order_id.to_string()))
        }
    }

    fn account_info(&self) -> AccountInfo {
        AccountInfo {
            balance: self.balance,
            realized_pnl: self.realized,
            orders_filled: self.next_order - 1,
        }
    }

    fn report_pnl(&mut self, realized: f64) {
        self.balance += realized;
        self.realized += realized;
    }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Holds orders back for `tick_buffer` ticks before sending them to the
/// venue. A buffer of 0 sends immediately.
pub struct OrderRouter<G: ExchangeGateway> {
    gateway: G,
    tick_buffer: u32,
    pending_ticks: u32,
    queue: Vec<OrderRequest>,
}

impl<G: ExchangeGateway> OrderRouter<G> {
    pub fn new(gateway: G, tick_buffer: u32) -> Self {
        OrderRouter {
            gateway,
            tick_buffer,
            pending_ticks: 0,
            queue: Vec::new(),
        }
    }

    pub fn tick_buffer(&self) -> u32 {
        self.tick_buffer
    }

    pub fn set_tick_buffer(&mut self, buffer: u32) {
        self.tick_buffer = buffer;
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn pending(&self) -> &[OrderRequest] {
        &self.queue
    }

    /// Queues `request`, or sends it straight away when buffering is off.
    pub fn submit(&mut self, request: OrderRequest) -> Vec<OrderFill> {
        if self.tick_buffer > 0 {
            log::debug!(
                "[{}] Order {} buffered ({} tick(s))",
                request.symbol, request.client_id, self.tick_buffer
            );
            self.queue.push(request);
            return Vec::new();
        }
        self.send(&request).into_iter().collect()
    }

    /// Advances the buffer by one tick and flushes the queue once it has
    /// waited long enough. Market orders are repriced at `market_price`.
    pub fn on_tick(&mut self, market_price: f64, now: DateTime<Utc>) -> Vec<OrderFill> {
        if self.tick_buffer > 0 {
            self.pending_ticks += 1;
            if self.pending_ticks < self.tick_buffer {
                return Vec::new();
            }
            self.pending_ticks = 0;
        }
        let queued = std::mem::take(&mut self.queue);
        queued
            .into_iter()
            .filter_map(|mut request| {
                request.price = market_price;
                request.submitted_at = now;
                self.send(&request)
            })
            .collect()
    }

    /// Drops a buffered order before it reaches the venue.
    pub fn cancel_pending(&mut self, client_id: &str) -> bool {
        let before = self.queue.len();
        self.queue.retain(|r| r.client_id != client_id);
        self.queue.len() != before
    }

    pub fn cancel_order(&mut self, order_id: &str) -> Result<(), GatewayError> {
        self.gateway.cancel_order(order_id)
    }

    fn send(&mut self, request: &OrderRequest) -> Option<OrderFill> {
        match self.gateway.place_order(request) {
            Ok(fill) => {
                log::info!(
                    "[{}] Order {} filled: {} {:.4} @ {:.2}",
                    request.symbol, fill.order_id, request.direction, request.quantity, fill.fill_price
                );
                Some(fill)
            }
            Err(e) => {
                log::error!("[{}] Order {} failed: {}", request.symbol, request.client_id, e);
                None
            }
        }
    }
}
