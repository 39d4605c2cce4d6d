#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[cfg(feature = "jemalloc")]
fn jemalloc_purge() {
    use tikv_jemalloc_ctl::epoch;
    // Advancing the epoch lets jemalloc evaluate its decay windows and
    // return dirty pages to the OS.
    if let Ok(e) = epoch::mib() {
        let _ = e.advance();
    }
    log::debug!("jemalloc: epoch advanced");
}

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

use renko_trader::config::{RISK_SWEEP_INTERVAL_MS, STATUS_INTERVAL_SECS, TICK_INTERVAL_MS};
use renko_trader::notifier::Notifier;
use renko_trader::{AppConfig, EngineState, EventBus, PaperExchange, Trader};

/// Random-walk step of up to half a brick either way, kept above one brick.
fn next_price(rng: &mut StdRng, price: f64, brick_size: f64) -> f64 {
    let step = rng.gen_range(-0.5..=0.5) * brick_size;
    (price + step).max(brick_size)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg_path = AppConfig::path_from_env();
    let cfg = AppConfig::load_or_default(&cfg_path)?;
    if !cfg.trading.paper_trading_mode {
        log::warn!("No live venue configured — running against the paper exchange");
    }

    let events = Arc::new(EventBus::new());
    let notifier = Notifier::new("notify");
    tokio::spawn(notifier.clone().run(events.subscribe()));

    let trader = Arc::new(Trader::new(
        &cfg,
        PaperExchange::new(cfg.capital.total_capital),
        events.clone(),
    ));
    trader.start()?;

    let brick_size = trader.engine().brick_size();
    notifier.notify_start(trader.symbol(), brick_size, cfg.capital.total_capital);
    log::info!(
        "Renko trader started — {} | brick {} | tick buffer {}",
        trader.symbol(),
        brick_size,
        cfg.strategy.tick_buffer
    );

    // ── Risk sweep ────────────────────────────────────────────────────────────
    {
        let trader = trader.clone();
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(Duration::from_millis(RISK_SWEEP_INTERVAL_MS));
            loop {
                sweep.tick().await;
                trader.run_risk_sweep();
            }
        });
    }

    // ── Main loop ─────────────────────────────────────────────────────────────
    let mut rng = StdRng::from_entropy();
    let mut price = brick_size * 1000.0;
    let mut ticks = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
    let status_interval = Duration::from_secs(STATUS_INTERVAL_SECS);
    let mut last_status_ts = Instant::now()
        .checked_sub(status_interval)
        .unwrap_or_else(Instant::now);
    let mut current_day = Utc::now().date_naive();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Ctrl-C received — shutting down");
                break;
            }
            _ = ticks.tick() => {
                let now = Utc::now();

                // Summarise the finished day before the ledger rolls it over.
                if now.date_naive() != current_day {
                    let m = trader.ledger().get_risk_metrics();
                    notifier.notify_daily_summary(m.daily_pnl, m.daily_trades, m.win_rate, m.total_equity);
                    current_day = now.date_naive();
                    #[cfg(feature = "jemalloc")]
                    jemalloc_purge();
                }

                price = next_price(&mut rng, price, brick_size);
                match trader.process_tick(price, now) {
                    Ok(report) => {
                        if !report.outcome.bricks.is_empty() {
                            log::debug!(
                                "[{}] {:.2} → {} brick(s), {} signal(s), {} opened, {} closed",
                                trader.symbol(),
                                price,
                                report.outcome.bricks.len(),
                                report.outcome.signals.len(),
                                report.opened.len(),
                                report.closed.len()
                            );
                        }
                    }
                    Err(e) => log::error!("[{}] tick rejected: {}", trader.symbol(), e),
                }

                if last_status_ts.elapsed() >= status_interval {
                    let metrics = trader.ledger().get_risk_metrics();
                    let running = trader.engine().state() == EngineState::Running;
                    notifier.notify_status(&[trader.status_line()], &metrics, running);
                    last_status_ts = Instant::now();
                }
            }
        }
    }

    trader.stop();
    let m = trader.ledger().refresh_metrics();
    let account = trader.account_info();
    log::info!(
        "Final: equity {:.2} | trades {} | WR {:.1}% | PF {:.2} | max DD {:.2} | paper balance {:.2}",
        m.total_equity,
        m.total_trades,
        m.win_rate,
        m.profit_factor,
        m.max_drawdown,
        account.balance
    );
    Ok(())
}
