//! Risk and position ledger.
//!
//! Owns equity, open and closed positions, the daily/weekly/monthly
//! counters and the counter-trading group. Every operation runs under a
//! single ledger-wide lock; notifications are published after it is
//! released.

use chrono::{DateTime, Datelike, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{symbol_limits, AppConfig, RiskConfig};
use crate::counter::CounterState;
use crate::error::{LedgerError, RiskRejection};
use crate::events::{EventBus, Notification};
use crate::position_manager::{calculate_lot_size, pnl_at, position_risk, update_position_pnl};
use crate::types::{CounterPhase, Position, RiskMetrics};

struct LedgerState {
    limits: RiskConfig,
    initial_equity: f64,
    equity: f64,
    open: Vec<Position>,
    closed: VecDeque<Position>,

    daily_pnl: f64,
    weekly_pnl: f64,
    monthly_pnl: f64,
    daily_trades: u32,
    total_trades: u32,
    winning_trades: u32,
    total_profit: f64,
    total_loss: f64,
    largest_win: f64,
    largest_loss: f64,
    max_drawdown: f64,

    counter: CounterState,
    last_roll: Option<DateTime<Utc>>,
    pending: Vec<Notification>,
}

pub struct RiskLedger {
    inner: Mutex<LedgerState>,
    events: Arc<EventBus>,
}

impl RiskLedger {
    pub fn new(limits: RiskConfig, equity: f64, events: Arc<EventBus>) -> Self {
        RiskLedger {
            inner: Mutex::new(LedgerState {
                limits,
                initial_equity: equity,
                equity,
                open: Vec::new(),
                closed: VecDeque::new(),
                daily_pnl: 0.0,
                weekly_pnl: 0.0,
                monthly_pnl: 0.0,
                daily_trades: 0,
                total_trades: 0,
                winning_trades: 0,
                total_profit: 0.0,
                total_loss: 0.0,
                largest_win: 0.0,
                largest_loss: 0.0,
                max_drawdown: 0.0,
                counter: CounterState::new(),
                last_roll: None,
                pending: Vec::new(),
            }),
            events,
        }
    }

    pub fn from_config(cfg: &AppConfig, events: Arc<EventBus>) -> Self {
        Self::new(cfg.risk.clone(), cfg.capital.total_capital, events)
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        let (result, events) = {
            let mut inner = self.lock();
            let result = f(&mut *inner);
            (result, std::mem::take(&mut inner.pending))
        };
        self.events.publish_all(events);
        result
    }

    // ─── Limits ───────────────────────────────────────────────────────────────

    pub fn limits(&self) -> RiskConfig {
        self.lock().limits.clone()
    }

    pub fn set_limits(&self, limits: RiskConfig) {
        self.lock().limits = limits;
    }

    pub fn set_max_risk_per_trade(&self, percent: f64) {
        self.lock().limits.max_risk_per_trade = percent;
    }

    pub fn set_max_daily_risk(&self, percent: f64) {
        self.lock().limits.max_daily_risk = percent;
    }

    pub fn set_max_open_positions(&self, count: usize) {
        self.lock().limits.max_open_positions = count;
    }

    pub fn set_max_drawdown(&self, percent: f64) {
        self.lock().limits.max_drawdown = percent;
    }

    pub fn set_max_trades_per_day(&self, count: u32) {
        self.lock().limits.max_trades_per_day = count;
    }

    pub fn set_counter_trading_enabled(&self, enabled: bool) {
        self.lock().limits.counter_trading_enabled = enabled;
    }

    pub fn set_trades_per_counter(&self, count: u32) {
        self.lock().limits.trades_per_counter = count;
    }

    /// Overrides current equity (e.g. from a venue balance). Drawdown is still
    /// measured against the initial stake.
    pub fn set_equity(&self, equity: f64) {
        self.with_inner(|inner| {
            inner.equity = equity;
            inner.update_drawdown();
        });
    }

    // ─── Sizing & admission ───────────────────────────────────────────────────

    /// Flat-risk lot size for `symbol`, clamped to the configured minimum and
    /// the symbol's maximum lot.
    pub fn calculate_lot_size(&self, symbol: &str, stop_distance: f64, risk_percent: f64) -> f64 {
        let inner = self.lock();
        let max_lot = symbol_limits(symbol)
            .map(|l| l.max_lot)
            .unwrap_or(inner.limits.max_lot_size);
        calculate_lot_size(inner.equity, risk_percent, stop_distance, inner.limits.min_lot_size, max_lot)
    }

    pub fn calculate_max_lot_size(&self, symbol: &str) -> f64 {
        symbol_limits(symbol)
            .map(|l| l.max_lot)
            .unwrap_or_else(|| self.lock().limits.max_lot_size)
    }

    /// Would a trade of `size` risking `stop_distance` stay inside both the
    /// per-trade and the daily risk budget?
    pub fn is_risk_acceptable(&self, size: f64, stop_distance: f64) -> bool {
        let inner = self.lock();
        let risk = size * stop_distance;
        if risk > inner.per_trade_limit() {
            return false;
        }
        inner.daily_pnl.abs() + risk <= inner.daily_limit()
    }

    /// Admission gate for a new position. Evaluated on one snapshot of the
    /// ledger; no state changes.
    pub fn admission_check(&self, symbol: &str, size: f64) -> Result<(), RiskRejection> {
        let result = self.lock().admission(size);
        if let Err(reason) = &result {
            log::debug!("[{}] Admission refused for size {:.4}: {}", symbol, size, reason);
        }
        result
    }

    pub fn can_open_position(&self, symbol: &str, size: f64) -> bool {
        self.admission_check(symbol, size).is_ok()
    }

    pub fn should_close_position(&self, id: &str) -> bool {
        let inner = self.lock();
        if inner.daily_risk_exceeded() || inner.drawdown_exceeded() {
            return true;
        }
        inner
            .open
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.unrealized_pnl.abs() > inner.per_trade_limit())
            .unwrap_or(false)
    }

    pub fn is_daily_risk_exceeded(&self) -> bool {
        self.lock().daily_risk_exceeded()
    }

    pub fn is_drawdown_exceeded(&self) -> bool {
        self.lock().drawdown_exceeded()
    }

    pub fn is_max_trades_reached(&self) -> bool {
        self.lock().max_trades_reached()
    }

    // ─── Position lifecycle ───────────────────────────────────────────────────

    pub fn add_position(&self, position: Position) -> Result<(), LedgerError> {
        self.with_inner(|inner| {
            let id = position.id.clone();
            if inner.open.iter().any(|p| p.id == id) || inner.closed.iter().any(|p| p.id == id) {
                log::warn!("[{}] Position id {} already in use", position.symbol, id);
                return Err(LedgerError::DuplicatePosition(id));
            }
            log::info!(
                "[{}] 📈 Opened {} {} {:.4} @ {:.2} | SL {:.2} | TP {:.2}",
                position.symbol,
                position.id,
                position.direction,
                position.size,
                position.entry_price,
                position.stop_loss,
                position.take_profit
            );
            inner.pending.push(Notification::PositionOpened(position.clone()));
            inner.open.push(position);
            Ok(())
        })
    }

    /// Marks an open position at `current_price`. The only place unrealized
    /// P&L changes.
    pub fn update_position(&self, id: &str, current_price: f64) -> Result<Position, LedgerError> {
        self.with_inner(|inner| {
            let Some(position) = inner.open.iter_mut().find(|p| p.id == id) else {
                log::warn!("update_position: unknown position {}", id);
                return Err(LedgerError::UnknownPosition(id.to_string()));
            };
            update_position_pnl(position, current_price);
            let snapshot = position.clone();
            inner.pending.push(Notification::PositionUpdated(snapshot.clone()));
            Ok(snapshot)
        })
    }

    pub fn close_position(&self, id: &str, close_price: f64) -> Result<Position, LedgerError> {
        self.close_position_at(id, close_price, Utc::now())
    }

    /// Realizes P&L at `close_price`, moves the position to the closed
    /// history and updates trade, counter and drawdown statistics.
    pub fn close_position_at(
        &self,
        id: &str,
        close_price: f64,
        closed_at: DateTime<Utc>,
    ) -> Result<Position, LedgerError> {
        self.with_inner(|inner| {
            let Some(idx) = inner.open.iter().position(|p| p.id == id) else {
                log::warn!("close_position: unknown position {}", id);
                return Err(LedgerError::UnknownPosition(id.to_string()));
            };
            let mut position = inner.open.remove(idx);
            let pnl = pnl_at(&position, close_price);
            position.current_price = close_price;
            position.realized_pnl = pnl;
            position.unrealized_pnl = 0.0;
            position.closed_at = Some(closed_at);
            position.open = false;

            inner.record_close(pnl);

            let emoji = if pnl > 0.0 { "✅" } else { "❌" };
            log::info!(
                "[{}] {} Closed {} @ {:.2} | P&L {:+.2} | equity {:.2}",
                position.symbol, emoji, position.id, close_price, pnl, inner.equity
            );

            inner.closed.push_back(position.clone());
            while inner.closed.len() > inner.limits.max_closed_history.max(1) {
                inner.closed.pop_front();
            }
            inner.pending.push(Notification::PositionClosed(position.clone()));
            Ok(position)
        })
    }

    /// Drops every open position without realizing P&L.
    pub fn clear_all_positions(&self) {
        let mut inner = self.lock();
        if !inner.open.is_empty() {
            log::warn!("Clearing {} open position(s) without closing", inner.open.len());
        }
        inner.open.clear();
    }

    pub fn open_positions(&self) -> Vec<Position> {
        self.lock().open.clone()
    }

    pub fn closed_positions(&self) -> Vec<Position> {
        self.lock().closed.iter().cloned().collect()
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        let inner = self.lock();
        inner
            .open
            .iter()
            .chain(inner.closed.iter())
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn open_position_count(&self) -> usize {
        self.lock().open.len()
    }

    // ─── Counter trading ──────────────────────────────────────────────────────

    pub fn start_new_counter(&self) -> u32 {
        let mut inner = self.lock();
        let equity = inner.equity;
        let number = inner.counter.start(equity);
        log::info!("Counter #{} started at equity {:.2}", number, equity);
        number
    }

    /// Ends the active counter and returns its P&L. `None` when no counter
    /// was active.
    pub fn end_current_counter(&self) -> Option<f64> {
        self.with_inner(|inner| {
            let equity = inner.equity;
            let (counter_number, pnl) = inner.counter.end(equity)?;
            log::info!("Counter #{} completed | P&L {:+.2}", counter_number, pnl);
            inner.pending.push(Notification::CounterCompleted { counter_number, pnl });
            Some(pnl)
        })
    }

    pub fn is_counter_complete(&self) -> bool {
        let inner = self.lock();
        inner.counter.is_complete(inner.limits.trades_per_counter)
    }

    /// False only when counter trading is on, the counter is complete and
    /// it did not make money.
    pub fn should_continue_trading(&self) -> bool {
        let inner = self.lock();
        if inner.limits.counter_trading_enabled
            && inner.counter.is_complete(inner.limits.trades_per_counter)
        {
            return inner.counter.pnl(inner.equity) > 0.0;
        }
        true
    }

    pub fn counter_number(&self) -> u32 {
        self.lock().counter.counter_number()
    }

    pub fn current_counter_trades(&self) -> u32 {
        self.lock().counter.trades()
    }

    pub fn counter_phase(&self) -> CounterPhase {
        self.lock().counter.phase()
    }

    pub fn counter_results(&self) -> Vec<f64> {
        self.lock().counter.results().to_vec()
    }

    // ─── Sweeps & metrics ─────────────────────────────────────────────────────

    /// Evaluates each halting condition independently. Every condition that
    /// holds raises a limit-reached and a trading-halted notification; the
    /// reasons are returned.
    pub fn check_risk_limits(&self) -> Vec<String> {
        self.with_inner(|inner| {
            let mut reasons = Vec::new();
            if inner.daily_risk_exceeded() {
                reasons.push("Daily risk limit exceeded".to_string());
            }
            if inner.drawdown_exceeded() {
                reasons.push("Maximum drawdown exceeded".to_string());
            }
            if inner.max_trades_reached() {
                reasons.push("Maximum daily trades reached".to_string());
            }
            for reason in &reasons {
                log::warn!("⚠️ Risk limit: {}", reason);
                inner.pending.push(Notification::RiskLimitReached(reason.clone()));
                inner.pending.push(Notification::TradingHalted(reason.clone()));
            }
            reasons
        })
    }

    /// Side-effect-free snapshot.
    pub fn get_risk_metrics(&self) -> RiskMetrics {
        self.lock().metrics()
    }

    /// Recomputes drawdown and publishes a metrics snapshot.
    pub fn refresh_metrics(&self) -> RiskMetrics {
        self.with_inner(|inner| {
            inner.update_drawdown();
            let metrics = inner.metrics();
            inner.pending.push(Notification::RiskMetricsUpdated(metrics.clone()));
            metrics
        })
    }

    pub fn equity(&self) -> f64 {
        self.lock().equity
    }

    pub fn initial_equity(&self) -> f64 {
        self.lock().initial_equity
    }

    pub fn daily_pnl(&self) -> f64 {
        self.lock().daily_pnl
    }

    pub fn daily_trade_count(&self) -> u32 {
        self.lock().daily_trades
    }

    pub fn total_trades(&self) -> u32 {
        self.lock().total_trades
    }

    pub fn winning_trades(&self) -> u32 {
        self.lock().winning_trades
    }

    pub fn total_profit(&self) -> f64 {
        self.lock().total_profit
    }

    pub fn total_loss(&self) -> f64 {
        self.lock().total_loss
    }

    pub fn max_drawdown(&self) -> f64 {
        self.lock().max_drawdown
    }

    // ─── Day boundaries ───────────────────────────────────────────────────────

    /// Resets daily counters when `now` falls on a new UTC date, and the
    /// weekly/monthly P&L on a new ISO week or month. Returns true when a
    /// new day began.
    pub fn roll_day(&self, now: DateTime<Utc>) -> bool {
        let mut inner = self.lock();
        let Some(last) = inner.last_roll else {
            inner.last_roll = Some(now);
            return false;
        };
        if last.date_naive() == now.date_naive() {
            return false;
        }
        if last.iso_week() != now.iso_week() {
            inner.weekly_pnl = 0.0;
        }
        if (last.year(), last.month()) != (now.year(), now.month()) {
            inner.monthly_pnl = 0.0;
        }
        log::info!(
            "📅 New trading day {} | yesterday P&L {:+.2} over {} trade(s)",
            now.date_naive(),
            inner.daily_pnl,
            inner.daily_trades
        );
        inner.reset_daily();
        inner.last_roll = Some(now);
        true
    }

    pub fn reset_daily_counters(&self) {
        let mut inner = self.lock();
        inner.reset_daily();
        inner.last_roll = Some(Utc::now());
    }
}

impl LedgerState {
    fn per_trade_limit(&self) -> f64 {
        self.equity * (self.limits.max_risk_per_trade / 100.0)
    }

    fn daily_limit(&self) -> f64 {
        self.equity * (self.limits.max_daily_risk / 100.0)
    }

    fn drawdown_limit(&self) -> f64 {
        self.initial_equity * (self.limits.max_drawdown / 100.0)
    }

    fn daily_risk_exceeded(&self) -> bool {
        self.daily_pnl.abs() >= self.daily_limit()
    }

    fn drawdown_exceeded(&self) -> bool {
        self.max_drawdown >= self.drawdown_limit()
    }

    fn max_trades_reached(&self) -> bool {
        self.daily_trades >= self.limits.max_trades_per_day
    }

    fn admission(&self, size: f64) -> Result<(), RiskRejection> {
        let l = &self.limits;
        if self.open.len() >= l.max_open_positions {
            return Err(RiskRejection::MaxOpenPositions(l.max_open_positions));
        }
        if self.max_trades_reached() {
            return Err(RiskRejection::MaxTradesPerDay(l.max_trades_per_day));
        }
        if self.daily_risk_exceeded() {
            return Err(RiskRejection::DailyRiskExceeded {
                daily_pnl: self.daily_pnl,
                limit: self.daily_limit(),
            });
        }
        if self.drawdown_exceeded() {
            return Err(RiskRejection::DrawdownExceeded {
                drawdown: self.max_drawdown,
                limit: self.drawdown_limit(),
            });
        }
        if l.counter_trading_enabled && self.counter.is_complete(l.trades_per_counter) {
            return Err(RiskRejection::CounterComplete {
                trades: self.counter.trades(),
                per_counter: l.trades_per_counter,
            });
        }
        // Implied risk uses a fixed stop distance, not the signal's own stop.
        let risk = size * l.admission_stop_units;
        if risk > self.per_trade_limit() {
            return Err(RiskRejection::TradeRiskTooLarge {
                risk,
                limit: self.per_trade_limit(),
            });
        }
        Ok(())
    }

    fn record_close(&mut self, pnl: f64) {
        self.equity += pnl;
        self.daily_pnl += pnl;
        self.weekly_pnl += pnl;
        self.monthly_pnl += pnl;
        self.total_trades += 1;
        self.daily_trades += 1;

        if pnl > 0.0 {
            self.winning_trades += 1;
            self.total_profit += pnl;
            self.largest_win = self.largest_win.max(pnl);
        } else {
            self.total_loss += pnl.abs();
            self.largest_loss = self.largest_loss.max(pnl.abs());
        }

        if self.counter.record_close(self.limits.trades_per_counter) {
            log::info!(
                "Counter #{} reached {} trade(s)",
                self.counter.counter_number(),
                self.counter.trades()
            );
        }
        self.update_drawdown();
    }

    fn update_drawdown(&mut self) {
        let current = self.initial_equity - self.equity;
        if current > self.max_drawdown {
            self.max_drawdown = current;
            log::warn!("📉 Drawdown {:.2} ({:.2}% of initial)", current, current / self.initial_equity * 100.0);
            self.pending.push(Notification::DrawdownWarning(current));
        }
    }

    fn reset_daily(&mut self) {
        self.daily_pnl = 0.0;
        self.daily_trades = 0;
    }

    fn metrics(&self) -> RiskMetrics {
        let total_risk: f64 = self.open.iter().map(position_risk).sum();
        let risk_used = if self.equity > 0.0 { total_risk / self.equity * 100.0 } else { 0.0 };
        let used_margin: f64 = self
            .open
            .iter()
            .map(|p| p.entry_price * p.size * self.limits.margin_requirement_pct / 100.0)
            .sum();
        let win_rate = if self.total_trades > 0 {
            self.winning_trades as f64 / self.total_trades as f64 * 100.0
        } else {
            0.0
        };
        let profit_factor = if self.total_loss > 0.0 { self.total_profit / self.total_loss } else { 0.0 };

        RiskMetrics {
            total_equity: self.equity,
            available_margin: self.equity - used_margin,
            used_margin,
            daily_pnl: self.daily_pnl,
            weekly_pnl: self.weekly_pnl,
            monthly_pnl: self.monthly_pnl,
            max_drawdown: self.max_drawdown,
            risk_used,
            risk_remaining: (self.limits.max_daily_risk - risk_used).max(0.0),
            win_rate,
            profit_factor,
            largest_win: self.largest_win,
            largest_loss: self.largest_loss,
            open_positions: self.open.len(),
            daily_trades: self.daily_trades,
            total_trades: self.total_trades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ledger() -> RiskLedger {
        RiskLedger::new(RiskConfig::default(), 10_000.0, Arc::new(EventBus::new()))
    }

    fn long(id: &str, entry: f64, size: f64) -> Position {
        Position::new(id, "BTCUSD", Direction::Buy, size, entry, entry - 20.0, entry + 30.0, ts())
    }

    #[test]
    fn lot_size_uses_equity_and_symbol_cap() {
        let l = ledger();
        assert_eq!(l.calculate_lot_size("BTCUSD", 100.0, 2.0), 2.0);
        assert_eq!(l.calculate_lot_size("BTCUSD", 0.0, 2.0), 0.01);
        assert_eq!(l.calculate_lot_size("BTCUSD", 10.0, 2.0), 5.0);
        assert_eq!(l.calculate_lot_size("UNLISTED", 1.0, 2.0), 100.0);
    }

    #[test]
    fn risk_acceptable_checks_both_budgets() {
        let l = ledger();
        assert!(l.is_risk_acceptable(2.0, 100.0));
        assert!(!l.is_risk_acceptable(2.1, 100.0));
    }

    #[test]
    fn admission_uses_fixed_stop_units() {
        let l = ledger();
        // 20 × 10 = 200 = 2 % of 10 000
        assert!(l.can_open_position("BTCUSD", 20.0));
        assert!(matches!(
            l.admission_check("BTCUSD", 20.5),
            Err(RiskRejection::TradeRiskTooLarge { .. })
        ));
    }

    #[test]
    fn max_open_positions_blocks_admission() {
        let l = ledger();
        l.set_max_open_positions(1);
        l.add_position(long("p1", 100.0, 1.0)).unwrap();
        assert_eq!(l.admission_check("BTCUSD", 1.0), Err(RiskRejection::MaxOpenPositions(1)));
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let l = ledger();
        l.add_position(long("p1", 100.0, 1.0)).unwrap();
        assert_eq!(
            l.add_position(long("p1", 100.0, 1.0)),
            Err(LedgerError::DuplicatePosition("p1".into()))
        );
        l.close_position_at("p1", 110.0, ts()).unwrap();
        assert!(l.add_position(long("p1", 100.0, 1.0)).is_err());
    }

    #[test]
    fn unknown_ids_are_reported_without_state_change() {
        let l = ledger();
        assert_eq!(
            l.close_position("ghost", 1.0),
            Err(LedgerError::UnknownPosition("ghost".into()))
        );
        assert!(l.update_position("ghost", 1.0).is_err());
        assert_eq!(l.total_trades(), 0);
        assert_eq!(l.equity(), 10_000.0);
    }

    #[test]
    fn drawdown_only_grows() {
        let l = ledger();
        l.add_position(long("a", 100.0, 1.0)).unwrap();
        l.close_position_at("a", 80.0, ts()).unwrap();
        assert_eq!(l.max_drawdown(), 20.0);
        l.add_position(long("b", 100.0, 1.0)).unwrap();
        l.close_position_at("b", 150.0, ts()).unwrap();
        assert_eq!(l.max_drawdown(), 20.0);
        assert_eq!(l.equity(), 10_030.0);
    }

    #[test]
    fn risk_used_and_margin() {
        let l = ledger();
        l.add_position(long("a", 100.0, 5.0)).unwrap();
        let m = l.get_risk_metrics();
        // |100 − 80| × 5 = 100 → 1 % of equity
        assert!((m.risk_used - 1.0).abs() < 1e-12);
        assert!((m.used_margin - 100.0).abs() < 1e-12);
        assert!((m.available_margin - 9_900.0).abs() < 1e-9);
        assert_eq!(m.open_positions, 1);
    }

    #[test]
    fn should_close_on_large_unrealized_loss() {
        let l = ledger();
        l.add_position(long("a", 100.0, 10.0)).unwrap();
        l.update_position("a", 90.0).unwrap();
        assert!(!l.should_close_position("a"));
        l.update_position("a", 70.0).unwrap();
        assert!(l.should_close_position("a"));
    }

    #[test]
    fn day_roll_resets_daily_counters_only() {
        let l = ledger();
        assert!(!l.roll_day(ts()));
        l.add_position(long("a", 100.0, 1.0)).unwrap();
        l.close_position_at("a", 110.0, ts()).unwrap();
        assert_eq!(l.daily_trade_count(), 1);

        assert!(!l.roll_day(ts() + chrono::Duration::minutes(1)));
        assert!(l.roll_day(ts() + chrono::Duration::days(1)));
        assert_eq!(l.daily_trade_count(), 0);
        assert_eq!(l.daily_pnl(), 0.0);
        assert_eq!(l.total_trades(), 1);
    }

    #[test]
    fn set_equity_keeps_drawdown_base() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let l = RiskLedger::new(RiskConfig::default(), 10_000.0, bus);

        l.set_equity(9_000.0);
        assert_eq!(l.equity(), 9_000.0);
        assert_eq!(l.initial_equity(), 10_000.0);
        assert_eq!(l.max_drawdown(), 1_000.0);
        assert!(matches!(rx.try_recv(), Ok(Notification::DrawdownWarning(d)) if d == 1_000.0));
        assert!(!l.is_drawdown_exceeded());

        // 20 % of the initial 10 000.
        l.set_equity(8_000.0);
        assert!(l.is_drawdown_exceeded());

        // Recovering does not shrink the recorded maximum.
        l.set_equity(12_000.0);
        assert_eq!(l.max_drawdown(), 2_000.0);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn limit_setters_drive_admission() {
        let l = ledger();
        l.set_max_trades_per_day(1);
        l.add_position(long("a", 100.0, 1.0)).unwrap();
        l.close_position_at("a", 101.0, ts()).unwrap();
        assert_eq!(l.admission_check("BTCUSD", 1.0), Err(RiskRejection::MaxTradesPerDay(1)));

        l.reset_daily_counters();
        assert_eq!(l.daily_trade_count(), 0);
        assert!(l.can_open_position("BTCUSD", 1.0));

        l.set_max_risk_per_trade(1.0);
        // 10 100 × 1 % = 101 against 11 × 10 units.
        assert!(matches!(
            l.admission_check("BTCUSD", 11.0),
            Err(RiskRejection::TradeRiskTooLarge { .. })
        ));

        l.set_max_trades_per_day(20);
        l.set_counter_trading_enabled(true);
        l.set_trades_per_counter(1);
        l.start_new_counter();
        l.add_position(long("b", 100.0, 1.0)).unwrap();
        l.close_position_at("b", 101.0, ts()).unwrap();
        assert!(matches!(
            l.admission_check("BTCUSD", 1.0),
            Err(RiskRejection::CounterComplete { trades: 1, per_counter: 1 })
        ));

        l.set_limits(RiskConfig::default());
        assert_eq!(l.limits(), RiskConfig::default());
        assert!(l.can_open_position("BTCUSD", 1.0));
    }

    #[test]
    fn daily_and_drawdown_setters() {
        let l = ledger();
        l.add_position(long("a", 100.0, 10.0)).unwrap();
        l.close_position_at("a", 90.0, ts()).unwrap();
        assert!(!l.is_daily_risk_exceeded());
        // |−100| against 9 900 × 1 % = 99.
        l.set_max_daily_risk(1.0);
        assert!(l.is_daily_risk_exceeded());

        assert!(!l.is_drawdown_exceeded());
        l.set_max_drawdown(1.0);
        assert!(l.is_drawdown_exceeded());
    }

    #[test]
    fn closed_history_is_bounded() {
        let l = RiskLedger::new(
            RiskConfig { max_closed_history: 2, max_trades_per_day: 100, ..RiskConfig::default() },
            10_000.0,
            Arc::new(EventBus::new()),
        );
        for i in 0..4 {
            let id = format!("p{}", i);
            l.add_position(long(&id, 100.0, 1.0)).unwrap();
            l.close_position_at(&id, 101.0, ts()).unwrap();
        }
        let closed = l.closed_positions();
        assert_eq!(closed.len(), 2);
        assert_eq!(closed[0].id, "p2");
        assert_eq!(l.total_trades(), 4);
    }
}
