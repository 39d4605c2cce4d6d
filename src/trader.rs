//! Wires the pattern engine, the risk ledger and the order router for one
//! symbol. The engine and ledger locks are never held together: each call
//! into a component completes before the next component is touched.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::error::EngineError;
use crate::events::EventBus;
use crate::exchange::{AccountInfo, ExchangeGateway, OrderFill, OrderRequest, OrderRouter};
use crate::position_manager::protective_levels;
use crate::risk_ledger::RiskLedger;
use crate::strategy_engine::{PatternEngine, TickOutcome};
use crate::types::{CounterPhase, EngineState, Position, Signal};

/// What one tick did across the three components.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub outcome: TickOutcome,
    pub opened: Vec<Position>,
    pub closed: Vec<Position>,
    pub rejected: usize,
}

pub struct Trader<G: ExchangeGateway> {
    symbol: String,
    engine: Arc<PatternEngine>,
    ledger: Arc<RiskLedger>,
    router: Mutex<OrderRouter<G>>,
    next_client_id: AtomicU64,
}

impl<G: ExchangeGateway> Trader<G> {
    pub fn new(cfg: &AppConfig, gateway: G, events: Arc<EventBus>) -> Self {
        let symbol = cfg.trading.default_symbol.clone();
        let engine = Arc::new(PatternEngine::from_config(&cfg.strategy, &symbol, events.clone()));
        let ledger = Arc::new(RiskLedger::from_config(cfg, events));
        let router = OrderRouter::new(gateway, cfg.strategy.tick_buffer);

        if cfg.risk.counter_trading_enabled {
            ledger.start_new_counter();
        }

        Trader {
            symbol,
            engine,
            ledger,
            router: Mutex::new(router),
            next_client_id: AtomicU64::new(1),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn engine(&self) -> &Arc<PatternEngine> {
        &self.engine
    }

    pub fn ledger(&self) -> &Arc<RiskLedger> {
        &self.ledger
    }

    fn router(&self) -> MutexGuard<'_, OrderRouter<G>> {
        self.router.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn start(&self) -> Result<(), EngineError> {
        self.engine.start()
    }

    pub fn stop(&self) {
        self.engine.stop();
    }

    pub fn account_info(&self) -> AccountInfo {
        self.router().gateway().account_info()
    }

    pub fn pending_orders(&self) -> Vec<OrderRequest> {
        self.router().pending().to_vec()
    }

    pub fn cancel_pending(&self, client_id: &str) -> bool {
        self.router().cancel_pending(client_id)
    }

    /// Feeds one tick through engine → ledger → router.
    pub fn process_tick(&self, price: f64, timestamp: DateTime<Utc>) -> Result<TickReport, EngineError> {
        self.ledger.roll_day(timestamp);

        let outcome = self.engine.process_tick(price, timestamp)?;
        let closed = self.mark_positions(price, timestamp);

        let flushed = self.router().on_tick(price, timestamp);
        let mut opened: Vec<Position> = flushed.into_iter().filter_map(|f| self.register_fill(f)).collect();

        // Fills are registered before the next signal is admitted so the
        // open-position limit sees them.
        let mut rejected = 0;
        for signal in &outcome.signals {
            match self.route_signal(signal, price, timestamp) {
                Some(fills) => opened.extend(fills.into_iter().filter_map(|f| self.register_fill(f))),
                None => rejected += 1,
            }
        }

        self.manage_counter();

        Ok(TickReport { outcome, opened, closed, rejected })
    }

    /// Marks this symbol's open positions and closes those whose stop or
    /// target was crossed.
    fn mark_positions(&self, price: f64, timestamp: DateTime<Utc>) -> Vec<Position> {
        let mut closed = Vec::new();
        for position in self.ledger.open_positions() {
            if position.symbol != self.symbol {
                continue;
            }
            let Ok(marked) = self.ledger.update_position(&position.id, price) else {
                continue;
            };
            if !(marked.stop_hit(price) || marked.target_hit(price)) {
                continue;
            }
            let reason = if marked.target_hit(price) { "target" } else { "stop" };
            let Ok(done) = self.ledger.close_position_at(&marked.id, price, timestamp) else {
                continue;
            };
            log::info!("[{}] {} closed on {}", self.symbol, done.id, reason);

            self.router().gateway_mut().report_pnl(done.realized_pnl);
            if let Err(e) = self.engine.record_signal_outcome(done.realized_pnl > 0.0) {
                log::warn!("[{}] Could not record outcome: {}", self.symbol, e);
            }
            closed.push(done);
        }
        closed
    }

    /// Sizes and admits one signal, then hands it to the router. `None`
    /// when the signal was turned away.
    fn route_signal(&self, signal: &Signal, price: f64, timestamp: DateTime<Utc>) -> Option<Vec<OrderFill>> {
        if !self.ledger.should_continue_trading() {
            log::info!("[{}] {} skipped: counter closed without profit", self.symbol, signal.setup_kind);
            return None;
        }

        let size = self.ledger.calculate_lot_size(
            &self.symbol,
            signal.proposed_stop_distance,
            self.engine.risk_percent(),
        );
        if let Err(reason) = self.ledger.admission_check(&self.symbol, size) {
            log::info!("[{}] {} rejected: {}", self.symbol, signal.setup_kind, reason);
            return None;
        }

        let client_id = format!("c{}", self.next_client_id.fetch_add(1, Ordering::Relaxed));
        let request = OrderRequest {
            client_id,
            symbol: self.symbol.clone(),
            direction: signal.direction,
            quantity: size,
            price,
            stop_distance: signal.proposed_stop_distance,
            target_distance: signal.proposed_target_distance,
            submitted_at: timestamp,
        };
        Some(self.router().submit(request))
    }

    fn register_fill(&self, fill: OrderFill) -> Option<Position> {
        let req = &fill.request;
        let (stop, target) =
            protective_levels(req.direction, fill.fill_price, req.stop_distance, req.target_distance);
        let position = Position::new(
            fill.order_id.clone(),
            req.symbol.clone(),
            req.direction,
            req.quantity,
            fill.fill_price,
            stop,
            target,
            fill.filled_at,
        );
        match self.ledger.add_position(position.clone()) {
            Ok(()) => Some(position),
            Err(e) => {
                log::error!("[{}] Fill {} not registered: {}", self.symbol, fill.order_id, e);
                None
            }
        }
    }

    /// Ends a completed counter and opens the next one if it made money;
    /// otherwise pauses the engine.
    fn manage_counter(&self) {
        if !self.ledger.limits().counter_trading_enabled {
            return;
        }
        if self.ledger.counter_number() == 0 {
            self.ledger.start_new_counter();
            return;
        }
        if self.ledger.counter_phase() != CounterPhase::Complete {
            return;
        }

        let keep_going = self.ledger.should_continue_trading();
        self.ledger.end_current_counter();
        if keep_going {
            self.ledger.start_new_counter();
        } else {
            log::warn!("[{}] ⛔ Counter closed without profit, trading paused", self.symbol);
            if let Err(e) = self.engine.pause() {
                log::error!("[{}] {}", self.symbol, e);
            }
        }
    }

    /// Periodic risk sweep. Pauses the engine when any limit fired.
    pub fn run_risk_sweep(&self) -> Vec<String> {
        let reasons = self.ledger.check_risk_limits();
        if !reasons.is_empty() && self.engine.state() == EngineState::Running {
            log::warn!("[{}] ⛔ Trading halted: {}", self.symbol, reasons.join("; "));
            if let Err(e) = self.engine.pause() {
                log::error!("[{}] {}", self.symbol, e);
            }
        }
        self.ledger.refresh_metrics();
        reasons
    }

    pub fn status_line(&self) -> String {
        let m = self.ledger.get_risk_metrics();
        let forming = self
            .engine
            .forming_brick()
            .map(|b| format!("{:.0}%", b.formation_fraction * 100.0))
            .unwrap_or_else(|| "-".into());
        format!(
            "[{}] {} | bricks {} (forming {}) | signals {} | equity {:.2} | day {:+.2} | open {} | trades {} | WR {:.1}%",
            self.symbol,
            self.engine.state(),
            self.engine.brick_count(),
            forming,
            self.engine.total_signals(),
            m.total_equity,
            m.daily_pnl,
            m.open_positions,
            m.total_trades,
            m.win_rate
        )
    }
}
