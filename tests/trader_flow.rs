//! End-to-end: ticks → bricks → signals → admission → paper fills →
//! stop/target exits.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use renko_trader::types::CounterPhase;
use renko_trader::{AppConfig, Direction, EngineState, EventBus, PaperExchange, Trader};

fn ts(i: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + i, 0).unwrap()
}

fn config(tick_buffer: u32) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.strategy.brick_size = 10.0;
    cfg.strategy.tick_buffer = tick_buffer;
    cfg
}

fn trader(cfg: &AppConfig) -> Trader<PaperExchange> {
    let t = Trader::new(cfg, PaperExchange::new(cfg.capital.total_capital), Arc::new(EventBus::new()));
    t.start().unwrap();
    t
}

#[test]
fn green_run_opens_and_target_closes() {
    let t = trader(&config(0));
    for (i, p) in [100.0, 110.0, 120.0].iter().enumerate() {
        let r = t.process_tick(*p, ts(i as i64)).unwrap();
        assert!(r.opened.is_empty());
    }

    let r = t.process_tick(130.0, ts(3)).unwrap();
    assert_eq!(r.outcome.signals.len(), 1);
    assert_eq!(r.opened.len(), 1);
    let pos = &r.opened[0];
    assert_eq!(pos.direction, Direction::Buy);
    // 10 000 × 2 % / 20 = 10, capped at 5 for BTCUSD
    assert_eq!(pos.size, 5.0);
    assert_eq!((pos.entry_price, pos.stop_loss, pos.take_profit), (130.0, 110.0, 160.0));

    let r = t.process_tick(125.0, ts(4)).unwrap();
    assert!(r.closed.is_empty());
    assert_eq!(t.ledger().position(&pos.id).unwrap().unrealized_pnl, -25.0);

    // Target reached; the three new green bricks each signal again.
    let r = t.process_tick(160.0, ts(5)).unwrap();
    assert_eq!(r.closed.len(), 1);
    assert_eq!(r.closed[0].realized_pnl, 150.0);
    assert_eq!(r.outcome.signals.len(), 3);
    assert_eq!(r.opened.len(), 3);

    assert_eq!(t.engine().successful_signals(), 1);
    assert_eq!(t.ledger().equity(), 10_150.0);
    assert_eq!(t.account_info().balance, 10_150.0);
    assert_eq!(t.ledger().open_position_count(), 3);
}

#[test]
fn open_position_limit_applies_within_a_tick() {
    let mut cfg = config(0);
    cfg.risk.max_open_positions = 2;
    let t = trader(&cfg);
    t.process_tick(100.0, ts(0)).unwrap();

    // 100 → 160: G G G fires on bricks 3..6 → four signals, two admitted.
    let r = t.process_tick(160.0, ts(1)).unwrap();
    assert_eq!(r.outcome.signals.len(), 4);
    assert_eq!(r.opened.len(), 2);
    assert_eq!(r.rejected, 2);
}

#[test]
fn buffered_orders_fill_after_tick_buffer() {
    let t = trader(&config(2));
    for (i, p) in [100.0, 110.0, 120.0].iter().enumerate() {
        t.process_tick(*p, ts(i as i64)).unwrap();
    }
    let r = t.process_tick(130.0, ts(3)).unwrap();
    assert_eq!(r.outcome.signals.len(), 1);
    assert!(r.opened.is_empty());
    assert_eq!(t.pending_orders().len(), 1);

    assert!(t.process_tick(131.0, ts(4)).unwrap().opened.is_empty());
    let r = t.process_tick(132.0, ts(5)).unwrap();
    assert_eq!(r.opened.len(), 1);
    assert_eq!(r.opened[0].entry_price, 132.0);
    assert_eq!(r.opened[0].stop_loss, 112.0);
    assert!(t.pending_orders().is_empty());
}

#[test]
fn risk_sweep_pauses_engine() {
    let t = trader(&config(0));
    assert!(t.run_risk_sweep().is_empty());
    assert_eq!(t.engine().state(), EngineState::Running);

    t.ledger().set_max_trades_per_day(0);
    let reasons = t.run_risk_sweep();
    assert_eq!(reasons, vec!["Maximum daily trades reached".to_string()]);
    assert_eq!(t.engine().state(), EngineState::Paused);

    // Paused: bricks still form, no orders.
    t.process_tick(100.0, ts(0)).unwrap();
    let r = t.process_tick(130.0, ts(1)).unwrap();
    assert_eq!(r.outcome.bricks.len(), 3);
    assert!(r.outcome.signals.is_empty());
}

#[test]
fn losing_counter_halts_trading() {
    let mut cfg = config(0);
    cfg.risk.counter_trading_enabled = true;
    cfg.risk.trades_per_counter = 1;
    let t = trader(&cfg);
    assert_eq!(t.ledger().counter_number(), 1);

    for (i, p) in [100.0, 110.0, 120.0, 130.0].iter().enumerate() {
        t.process_tick(*p, ts(i as i64)).unwrap();
    }
    assert_eq!(t.ledger().open_position_count(), 1);

    // Stop at 110 is crossed: −25 × 5.
    let r = t.process_tick(105.0, ts(4)).unwrap();
    assert_eq!(r.closed.len(), 1);
    assert_eq!(r.closed[0].realized_pnl, -125.0);

    assert_eq!(t.ledger().counter_results(), vec![-125.0]);
    assert_eq!(t.ledger().counter_phase(), CounterPhase::Inactive);
    assert_eq!(t.engine().state(), EngineState::Paused);
    assert!(!t.ledger().should_continue_trading());
}

#[test]
fn engine_is_ready_after_construction() {
    let t = trader(&config(0));
    assert!(t.engine().is_initialized());
    assert!(t.status_line().contains("running"));
}
