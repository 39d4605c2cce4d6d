//! Renko pattern engine for a single symbol.
//!
//! All state lives behind one mutex; notifications raised during an
//! operation are queued and published after the lock is released.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{
    StrategyConfig, BRICK_FORMATION_THRESHOLD, DEFAULT_BRICK_SIZE, DEFAULT_RISK_PERCENT,
    DEFAULT_TICK_BUFFER, MAX_BRICKS_PER_TICK, MAX_BRICK_HISTORY, MAX_BRICK_SIZE,
    MAX_RISK_PERCENT, MAX_SIGNAL_HISTORY, MIN_BRICK_SIZE, MIN_SIGNAL_SIZE,
    REFERENCE_ACCOUNT_SIZE, STOP_BRICKS, TARGET_BRICKS,
};
use crate::error::EngineError;
use crate::events::{EventBus, Notification};
use crate::pattern_detector::{scan_patterns, scan_pending_setup, DetectorParams, PendingSetupInfo};
use crate::position_manager::{calculate_position_size, validate_trade};
use crate::renko::BrickSeries;
use crate::types::{Brick, EngineState, Signal};

// ─── Validation hook ──────────────────────────────────────────────────────────

/// Secondary check applied to every detected signal before emission.
/// A rejected signal is dropped without being counted.
pub trait SignalValidator: Send + Sync {
    fn validate(&self, signal: &Signal) -> bool;
}

pub struct AcceptAll;

impl SignalValidator for AcceptAll {
    fn validate(&self, _signal: &Signal) -> bool {
        true
    }
}

/// Adapts a closure into a validator.
pub struct ValidatorFn<F>(pub F);

impl<F> SignalValidator for ValidatorFn<F>
where
    F: Fn(&Signal) -> bool + Send + Sync,
{
    fn validate(&self, signal: &Signal) -> bool {
        (self.0)(signal)
    }
}

/// Rejects undersized, low-notional or inconsistently levelled signals.
pub struct StrictValidator {
    pub min_size: f64,
    pub min_notional: f64,
}

impl SignalValidator for StrictValidator {
    fn validate(&self, signal: &Signal) -> bool {
        match validate_trade(signal, self.min_size, self.min_notional) {
            Ok(()) => true,
            Err(reason) => {
                log::debug!("[{}] Signal rejected: {}", signal.symbol, reason);
                false
            }
        }
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Bricks and signals produced by one tick, in formation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub bricks: Vec<Brick>,
    pub signals: Vec<Signal>,
}

struct EngineInner {
    symbol: String,
    initialized: bool,
    state: EngineState,
    series: BrickSeries,
    setup1_enabled: bool,
    setup2_enabled: bool,
    setup2_sell_on_red_run: bool,
    tick_buffer: u32,
    max_bricks_per_tick: usize,
    risk_percent: f64,
    reference_account_size: f64,
    min_size: f64,
    validator: Box<dyn SignalValidator>,
    last_price: Option<(f64, DateTime<Utc>)>,
    last_signal: Option<Signal>,
    signal_history: VecDeque<Signal>,
    total_signals: u32,
    successful_signals: u32,
    pending: Vec<Notification>,
}

pub struct PatternEngine {
    inner: Mutex<EngineInner>,
    events: Arc<EventBus>,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(EngineError::ConfigurationRejected { field, value: value.to_string() })
    }
}

impl PatternEngine {
    /// Uninitialised engine with default settings. Call `initialize`
    /// before `start` or `process_tick`.
    pub fn new(symbol: &str, events: Arc<EventBus>) -> Self {
        PatternEngine {
            inner: Mutex::new(EngineInner {
                symbol: symbol.to_string(),
                initialized: false,
                state: EngineState::Idle,
                series: BrickSeries::new(DEFAULT_BRICK_SIZE, MAX_BRICK_HISTORY),
                setup1_enabled: true,
                setup2_enabled: true,
                setup2_sell_on_red_run: false,
                tick_buffer: DEFAULT_TICK_BUFFER,
                max_bricks_per_tick: MAX_BRICKS_PER_TICK,
                risk_percent: DEFAULT_RISK_PERCENT,
                reference_account_size: REFERENCE_ACCOUNT_SIZE,
                min_size: MIN_SIGNAL_SIZE,
                validator: Box::new(AcceptAll),
                last_price: None,
                last_signal: None,
                signal_history: VecDeque::new(),
                total_signals: 0,
                successful_signals: 0,
                pending: Vec::new(),
            }),
            events,
        }
    }

    /// Initialised engine configured from `cfg`. Out-of-range values keep
    /// their defaults.
    pub fn from_config(cfg: &StrategyConfig, symbol: &str, events: Arc<EventBus>) -> Self {
        let engine = PatternEngine::new(symbol, events);
        engine.set_brick_size(cfg.brick_size);
        engine.set_tick_buffer(cfg.tick_buffer);
        engine.set_setup1_enabled(cfg.setup1_enabled);
        engine.set_setup2_enabled(cfg.setup2_enabled);
        engine.set_setup2_sell_on_red_run(cfg.setup2_sell_on_red_run);
        engine.set_risk_percent(cfg.risk_percent);
        engine.set_reference_account_size(cfg.reference_account_size);
        engine.set_min_size(cfg.min_size);
        engine.set_max_brick_history(cfg.max_brick_history);
        engine.set_max_bricks_per_tick(cfg.max_bricks_per_tick);
        engine.initialize();
        engine
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `f` under the engine lock, then publishes whatever it queued.
    fn with_inner<R>(&self, f: impl FnOnce(&mut EngineInner) -> R) -> R {
        let (result, events) = {
            let mut inner = self.lock();
            let result = f(&mut *inner);
            (result, std::mem::take(&mut inner.pending))
        };
        self.events.publish_all(events);
        result
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    pub fn initialize(&self) {
        self.with_inner(|inner| {
            inner.initialized = true;
            inner.state = EngineState::Idle;
            inner.status("Engine initialized");
        });
    }

    pub fn start(&self) -> Result<(), EngineError> {
        self.with_inner(|inner| {
            inner.require_initialized()?;
            inner.state = EngineState::Running;
            inner.status("Engine started");
            Ok(())
        })
    }

    /// Always legal; leaves the engine ready for a later `start`.
    pub fn stop(&self) {
        self.with_inner(|inner| {
            inner.state = EngineState::Stopped;
            inner.status("Engine stopped");
        });
    }

    pub fn pause(&self) -> Result<(), EngineError> {
        self.with_inner(|inner| {
            inner.require_initialized()?;
            if inner.state == EngineState::Running {
                inner.state = EngineState::Paused;
                inner.status("Engine paused");
            }
            Ok(())
        })
    }

    pub fn resume(&self) -> Result<(), EngineError> {
        self.with_inner(|inner| {
            inner.require_initialized()?;
            if inner.state == EngineState::Paused {
                inner.state = EngineState::Running;
                inner.status("Engine resumed");
            }
            Ok(())
        })
    }

    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lock().state, EngineState::Running | EngineState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.lock().state == EngineState::Paused
    }

    // ── Tick ingestion ───────────────────────────────────────────────────────

    /// Feeds one price observation. Bricks are formed in every lifecycle
    /// state; patterns are only evaluated while running.
    pub fn process_tick(&self, price: f64, timestamp: DateTime<Utc>) -> Result<TickOutcome, EngineError> {
        self.with_inner(|inner| {
            inner.require_initialized()?;
            if !price.is_finite() {
                log::warn!("[{}] Ignoring non-finite tick {}", inner.symbol, price);
                return Ok(TickOutcome::default());
            }
            Ok(inner.ingest(price, timestamp))
        })
    }

    // ── Configuration ────────────────────────────────────────────────────────

    pub fn set_symbol(&self, symbol: &str) {
        self.lock().symbol = symbol.to_string();
    }

    /// Accepted within `[0.1, 1000]`. A new size clears the brick series.
    pub fn set_brick_size(&self, size: f64) {
        let mut inner = self.lock();
        match check_range("brick_size", size, MIN_BRICK_SIZE, MAX_BRICK_SIZE) {
            Ok(size) => {
                inner.series.set_brick_size(size);
                inner.last_price = None;
            }
            Err(e) => log::debug!("[{}] {}", inner.symbol, e),
        }
    }

    pub fn set_setup1_enabled(&self, enabled: bool) {
        self.lock().setup1_enabled = enabled;
    }

    pub fn set_setup2_enabled(&self, enabled: bool) {
        self.lock().setup2_enabled = enabled;
    }

    pub fn set_setup2_sell_on_red_run(&self, enabled: bool) {
        self.lock().setup2_sell_on_red_run = enabled;
    }

    /// Downstream hint only; the engine itself never buffers ticks.
    pub fn set_tick_buffer(&self, buffer: u32) {
        self.lock().tick_buffer = buffer;
    }

    pub fn set_risk_percent(&self, percent: f64) {
        let mut inner = self.lock();
        match check_range("risk_percent", percent, f64::MIN_POSITIVE, MAX_RISK_PERCENT) {
            Ok(p) => inner.risk_percent = p,
            Err(e) => log::debug!("[{}] {}", inner.symbol, e),
        }
    }

    pub fn set_reference_account_size(&self, size: f64) {
        let mut inner = self.lock();
        match check_range("reference_account_size", size, f64::MIN_POSITIVE, f64::MAX) {
            Ok(s) => inner.reference_account_size = s,
            Err(e) => log::debug!("[{}] {}", inner.symbol, e),
        }
    }

    pub fn set_min_size(&self, size: f64) {
        let mut inner = self.lock();
        match check_range("min_size", size, f64::MIN_POSITIVE, f64::MAX) {
            Ok(s) => inner.min_size = s,
            Err(e) => log::debug!("[{}] {}", inner.symbol, e),
        }
    }

    pub fn set_max_brick_history(&self, bricks: usize) {
        self.lock().series.set_capacity(bricks);
    }

    /// Jumps wider than this many bricks re-seed the series. Zero is ignored.
    pub fn set_max_bricks_per_tick(&self, bricks: usize) {
        let mut inner = self.lock();
        if bricks == 0 {
            log::debug!("[{}] max_bricks_per_tick must be at least 1", inner.symbol);
            return;
        }
        inner.max_bricks_per_tick = bricks;
    }

    pub fn max_bricks_per_tick(&self) -> usize {
        self.lock().max_bricks_per_tick
    }

    pub fn set_validator(&self, validator: Box<dyn SignalValidator>) {
        self.lock().validator = validator;
    }

    pub fn symbol(&self) -> String {
        self.lock().symbol.clone()
    }

    pub fn brick_size(&self) -> f64 {
        self.lock().series.brick_size()
    }

    pub fn tick_buffer(&self) -> u32 {
        self.lock().tick_buffer
    }

    pub fn risk_percent(&self) -> f64 {
        self.lock().risk_percent
    }

    pub fn is_setup1_enabled(&self) -> bool {
        self.lock().setup1_enabled
    }

    pub fn is_setup2_enabled(&self) -> bool {
        self.lock().setup2_enabled
    }

    // ── Brick series reads ───────────────────────────────────────────────────

    pub fn bricks(&self) -> Vec<Brick> {
        self.lock().series.to_vec()
    }

    pub fn last_brick(&self) -> Option<Brick> {
        self.lock().series.last().cloned()
    }

    pub fn brick_count(&self) -> usize {
        self.lock().series.len()
    }

    /// The partially formed brick at the last observed price.
    pub fn forming_brick(&self) -> Option<Brick> {
        let inner = self.lock();
        let (price, ts) = inner.last_price?;
        inner.series.partial(price, ts)
    }

    pub fn is_brick_nearly_formed(&self) -> bool {
        self.forming_brick()
            .map(|b| b.formation_fraction >= BRICK_FORMATION_THRESHOLD)
            .unwrap_or(false)
    }

    pub fn pending_setup(&self) -> Option<PendingSetupInfo> {
        let mut inner = self.lock();
        let params = inner.detector_params();
        scan_pending_setup(inner.series.contiguous(), &params)
    }

    pub fn reset_bricks(&self) {
        let mut inner = self.lock();
        inner.series.clear();
        inner.last_price = None;
    }

    // ── Signals & statistics ─────────────────────────────────────────────────

    pub fn last_signal(&self) -> Option<Signal> {
        self.lock().last_signal.clone()
    }

    pub fn signal_history(&self) -> Vec<Signal> {
        self.lock().signal_history.iter().cloned().collect()
    }

    pub fn total_signals(&self) -> u32 {
        self.lock().total_signals
    }

    pub fn successful_signals(&self) -> u32 {
        self.lock().successful_signals
    }

    /// Reports whether an emitted signal ended up profitable. Feeds the
    /// win-rate statistic only.
    pub fn record_signal_outcome(&self, successful: bool) -> Result<(), EngineError> {
        self.with_inner(|inner| {
            inner.require_initialized()?;
            if successful && inner.successful_signals < inner.total_signals {
                inner.successful_signals += 1;
            }
            Ok(())
        })
    }

    pub fn win_rate(&self) -> f64 {
        let inner = self.lock();
        if inner.total_signals == 0 {
            return 0.0;
        }
        inner.successful_signals as f64 / inner.total_signals as f64 * 100.0
    }
}

impl EngineInner {
    fn status(&mut self, status: &str) {
        log::info!("[{}] {}", self.symbol, status);
        self.pending.push(Notification::StrategyStatusChanged(status.to_string()));
    }

    fn require_initialized(&mut self) -> Result<(), EngineError> {
        if self.initialized {
            return Ok(());
        }
        let err = EngineError::NotInitialized;
        log::error!("[{}] {}", self.symbol, err);
        self.pending.push(Notification::EngineError(err.to_string()));
        Err(err)
    }

    fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            setup1_enabled: self.setup1_enabled,
            setup2_enabled: self.setup2_enabled,
            setup2_sell_on_red_run: self.setup2_sell_on_red_run,
        }
    }

    fn ingest(&mut self, price: f64, timestamp: DateTime<Utc>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.last_price = Some((price, timestamp));

        let (count, color) = match self.series.bricks_for(price) {
            Some((count, _)) if count > self.max_bricks_per_tick => {
                log::warn!(
                    "[{}] Tick {} is {} bricks away (limit {}); re-seeding",
                    self.symbol, price, count, self.max_bricks_per_tick
                );
                self.series.clear();
                outcome.bricks.push(self.seed(price, timestamp));
                return outcome;
            }
            Some(step) => step,
            None => {
                outcome.bricks.push(self.seed(price, timestamp));
                return outcome;
            }
        };

        for _ in 0..count {
            let Some(brick) = self.series.push_step(color, timestamp) else { break };
            log::debug!(
                "[{}] {:?} brick {:.2} → {:.2}",
                self.symbol, color, brick.open, brick.close
            );
            self.brick_formed(&brick);
            outcome.bricks.push(brick);

            // Detection sees only the bricks formed so far in this tick.
            if self.state == EngineState::Running {
                if let Some(signal) = self.analyze_pattern(timestamp) {
                    outcome.signals.push(signal);
                }
            }
        }
        outcome
    }

    fn seed(&mut self, price: f64, timestamp: DateTime<Utc>) -> Brick {
        let seed = self.series.push_seed(price, timestamp);
        log::debug!("[{}] Seed brick @ {:.2}", self.symbol, price);
        self.brick_formed(&seed);
        seed
    }

    fn brick_formed(&mut self, brick: &Brick) {
        self.pending.push(Notification::BrickFormed {
            symbol: self.symbol.clone(),
            brick: brick.clone(),
        });
    }

    fn analyze_pattern(&mut self, timestamp: DateTime<Utc>) -> Option<Signal> {
        let params = self.detector_params();
        let found = scan_patterns(self.series.contiguous(), &params)?;
        let reference_price = self.series.last()?.close;

        let brick_size = self.series.brick_size();
        let stop_distance = brick_size * STOP_BRICKS;
        let target_distance = brick_size * TARGET_BRICKS;
        let size = calculate_position_size(
            self.reference_account_size,
            self.risk_percent,
            stop_distance,
            self.min_size,
        );

        let signal = Signal {
            setup_kind: found.setup,
            direction: found.direction,
            symbol: self.symbol.clone(),
            reference_price,
            proposed_stop_distance: stop_distance,
            proposed_target_distance: target_distance,
            proposed_size: size,
            timestamp,
            valid: true,
            rationale: found.description.to_string(),
        };

        if !self.validator.validate(&signal) {
            log::debug!("[{}] {} discarded by validator", self.symbol, signal.setup_kind);
            return None;
        }

        log::info!(
            "[{}] {} {} @ {:.2} | size {:.4} | SL {:.2} | TP {:.2}",
            self.symbol,
            signal.setup_kind,
            signal.direction,
            signal.reference_price,
            signal.proposed_size,
            signal.stop_price(),
            signal.target_price()
        );

        self.total_signals += 1;
        self.last_signal = Some(signal.clone());
        self.signal_history.push_back(signal.clone());
        if self.signal_history.len() > MAX_SIGNAL_HISTORY {
            self.signal_history.pop_front();
        }
        self.pending.push(Notification::SignalEmitted(signal.clone()));
        Some(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn engine() -> PatternEngine {
        let e = PatternEngine::new("BTCUSD", Arc::new(EventBus::new()));
        e.initialize();
        e
    }

    #[test]
    fn lifecycle_transitions() {
        let e = engine();
        assert_eq!(e.state(), EngineState::Idle);
        e.pause().unwrap();
        assert_eq!(e.state(), EngineState::Idle);
        e.start().unwrap();
        assert_eq!(e.state(), EngineState::Running);
        e.pause().unwrap();
        assert_eq!(e.state(), EngineState::Paused);
        assert!(e.is_running());
        e.resume().unwrap();
        assert_eq!(e.state(), EngineState::Running);
        e.stop();
        e.stop();
        assert_eq!(e.state(), EngineState::Stopped);
        e.start().unwrap();
        assert_eq!(e.state(), EngineState::Running);
    }

    #[test]
    fn uninitialized_engine_rejects_mutations() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let e = PatternEngine::new("BTCUSD", bus);

        assert_eq!(e.start(), Err(EngineError::NotInitialized));
        assert_eq!(e.process_tick(100.0, ts(0)), Err(EngineError::NotInitialized));
        assert_eq!(e.brick_count(), 0);
        assert_eq!(e.state(), EngineState::Idle);
        assert!(matches!(rx.try_recv(), Ok(Notification::EngineError(_))));
    }

    #[test]
    fn out_of_range_settings_are_ignored() {
        let e = engine();
        e.set_brick_size(0.05);
        e.set_brick_size(5000.0);
        e.set_brick_size(f64::NAN);
        assert_eq!(e.brick_size(), DEFAULT_BRICK_SIZE);
        e.set_brick_size(0.1);
        assert_eq!(e.brick_size(), 0.1);
        e.set_brick_size(1000.0);
        assert_eq!(e.brick_size(), 1000.0);

        e.set_risk_percent(0.0);
        e.set_risk_percent(150.0);
        assert_eq!(e.risk_percent(), DEFAULT_RISK_PERCENT);
    }

    #[test]
    fn paused_engine_forms_bricks_without_signals() {
        let e = engine();
        e.start().unwrap();
        e.pause().unwrap();
        e.process_tick(100.0, ts(0)).unwrap();
        let out = e.process_tick(130.0, ts(1)).unwrap();
        assert_eq!(out.bricks.len(), 3);
        assert!(out.signals.is_empty());
        assert_eq!(e.total_signals(), 0);
    }

    #[test]
    fn validator_rejection_is_not_counted() {
        let e = engine();
        e.set_validator(Box::new(ValidatorFn(|_: &Signal| false)));
        e.start().unwrap();
        e.process_tick(100.0, ts(0)).unwrap();
        let out = e.process_tick(130.0, ts(1)).unwrap();
        assert!(out.signals.is_empty());
        assert_eq!(e.total_signals(), 0);
        assert!(e.last_signal().is_none());
    }

    #[test]
    fn win_rate_tracks_reported_outcomes() {
        let e = engine();
        e.start().unwrap();
        e.process_tick(100.0, ts(0)).unwrap();
        e.process_tick(130.0, ts(1)).unwrap(); // G G G → Setup2
        e.process_tick(140.0, ts(2)).unwrap(); // G G G again
        assert_eq!(e.total_signals(), 2);
        e.record_signal_outcome(true).unwrap();
        e.record_signal_outcome(false).unwrap();
        assert_eq!(e.win_rate(), 50.0);
    }

    #[test]
    fn forming_brick_tracks_last_price() {
        let e = engine();
        e.process_tick(100.0, ts(0)).unwrap();
        e.process_tick(108.0, ts(1)).unwrap();
        let partial = e.forming_brick().unwrap();
        assert!(partial.is_green());
        assert!((partial.formation_fraction - 0.8).abs() < 1e-12);
        assert!(e.is_brick_nearly_formed());
        assert_eq!(e.brick_count(), 1);
    }

    #[test]
    fn brick_limit_boundary() {
        let e = engine();
        e.set_max_bricks_per_tick(3);
        e.start().unwrap();
        e.process_tick(100.0, ts(0)).unwrap();

        let out = e.process_tick(130.0, ts(1)).unwrap();
        assert_eq!(out.bricks.len(), 3);
        assert_eq!(out.signals.len(), 1);

        // Four widths is one over the limit: the series restarts at 170.
        let out = e.process_tick(170.0, ts(2)).unwrap();
        assert_eq!(out.bricks.len(), 1);
        assert!(out.bricks[0].is_seed());
        assert!(out.signals.is_empty());
        assert_eq!(e.brick_count(), 1);
        assert_eq!(e.last_brick().unwrap().close, 170.0);

        let out = e.process_tick(180.0, ts(3)).unwrap();
        assert_eq!(out.bricks.len(), 1);
        assert!(out.bricks[0].is_green());
    }

    #[test]
    fn huge_jump_reseeds_without_forming_bricks() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let e = PatternEngine::new("BTCUSD", bus);
        e.set_brick_size(0.1);
        e.initialize();
        e.start().unwrap();
        e.process_tick(100.0, ts(0)).unwrap();

        let out = e.process_tick(1e300, ts(1)).unwrap();
        assert_eq!(out.bricks.len(), 1);
        assert!(out.bricks[0].is_seed());
        assert_eq!(e.brick_count(), 1);

        let formed = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|n| matches!(n, Notification::BrickFormed { .. }))
            .count();
        assert_eq!(formed, 2);
    }

    #[test]
    fn zero_brick_limit_is_ignored() {
        let e = engine();
        e.set_max_bricks_per_tick(0);
        assert_eq!(e.max_bricks_per_tick(), MAX_BRICKS_PER_TICK);
    }

    #[test]
    fn two_red_bricks_leave_setup1_pending() {
        let e = engine();
        e.process_tick(100.0, ts(0)).unwrap();
        e.process_tick(80.0, ts(1)).unwrap();
        let info = e.pending_setup().unwrap();
        assert_eq!(info.setup, crate::types::SetupKind::Setup1);
        assert!(info.missing.contains("80.00"));

        e.reset_bricks();
        assert!(e.pending_setup().is_none());
        assert!(e.forming_brick().is_none());
    }

    #[test]
    fn from_config_applies_and_initializes() {
        let cfg = StrategyConfig {
            brick_size: 25.0,
            setup2_enabled: false,
            risk_percent: 500.0,
            ..StrategyConfig::default()
        };
        let e = PatternEngine::from_config(&cfg, "ETHUSD", Arc::new(EventBus::new()));
        assert!(e.is_initialized());
        assert_eq!(e.brick_size(), 25.0);
        assert!(!e.is_setup2_enabled());
        assert_eq!(e.risk_percent(), DEFAULT_RISK_PERCENT);
        assert_eq!(e.symbol(), "ETHUSD");
    }
}
