/// Renko backtester: replays a tick CSV (`timestamp_ms,price`) through the
/// trader against the paper venue.
/// Run: cargo run --bin backtest --release -- data/BTCUSD_ticks.csv
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use renko_trader::types::CounterPhase;
use renko_trader::{AppConfig, EngineState, EventBus, PaperExchange, Position, Trader};

const DEFAULT_TICKS: &str = "data/BTCUSD_ticks.csv";

#[derive(Clone, Debug)]
struct Tick {
    ts: DateTime<Utc>,
    price: f64,
}

// ── CSV loader ────────────────────────────────────────────────────────────────
/// Header line and malformed rows are skipped.
fn load_csv(path: &Path) -> std::io::Result<Vec<Tick>> {
    let mut out = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        let mut f = line.split(',');
        let (Some(ts), Some(price)) = (f.next(), f.next()) else { continue };
        let (Ok(ts_ms), Ok(price)) = (ts.trim().parse::<i64>(), price.trim().parse::<f64>()) else {
            continue;
        };
        let Some(ts) = DateTime::from_timestamp_millis(ts_ms) else { continue };
        out.push(Tick { ts, price });
    }
    out.sort_by_key(|t| t.ts);
    Ok(out)
}

// ── Statistics ────────────────────────────────────────────────────────────────
struct Stats {
    trades: usize, wins: usize, losses: usize,
    win_rate: f64, total_pnl: f64, total_pnl_pct: f64,
    avg_win: f64, avg_loss: f64, profit_factor: f64,
    max_drawdown: f64, best: f64, worst: f64,
}

fn compute_stats(closed: &[Position], initial_balance: f64) -> Stats {
    let wins: Vec<f64> = closed.iter().filter(|p| p.realized_pnl > 0.0).map(|p| p.realized_pnl).collect();
    let losses: Vec<f64> = closed.iter().filter(|p| p.realized_pnl <= 0.0).map(|p| p.realized_pnl.abs()).collect();
    let gross_win: f64 = wins.iter().sum();
    let gross_loss: f64 = losses.iter().sum();
    let total_pnl: f64 = closed.iter().map(|p| p.realized_pnl).sum();

    let mut bal = initial_balance;
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;
    for p in closed {
        bal += p.realized_pnl;
        peak = peak.max(bal);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - bal) / peak * 100.0);
        }
    }

    Stats {
        trades: closed.len(), wins: wins.len(), losses: losses.len(),
        win_rate: if closed.is_empty() { 0.0 } else { wins.len() as f64 / closed.len() as f64 * 100.0 },
        total_pnl, total_pnl_pct: total_pnl / initial_balance * 100.0,
        avg_win:  if wins.is_empty()   { 0.0 } else { gross_win  / wins.len() as f64 },
        avg_loss: if losses.is_empty() { 0.0 } else { gross_loss / losses.len() as f64 },
        profit_factor: if gross_loss == 0.0 { 0.0 } else { gross_win / gross_loss },
        max_drawdown: max_dd,
        best:  closed.iter().map(|p| p.realized_pnl).fold(0.0, f64::max),
        worst: closed.iter().map(|p| p.realized_pnl).fold(0.0, f64::min),
    }
}

fn print_stats(symbol: &str, s: &Stats, counters: &[f64]) {
    let verdict = if s.win_rate >= 55.0 && s.profit_factor >= 1.5 { "✅ VIABLE" }
                  else if s.win_rate >= 50.0 { "⚠️  MARGINAL" }
                  else { "❌ NOT VIABLE" };
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │  {:12}                    {}  │", symbol, verdict);
    println!("  ├─────────────────────────────────────────────┤");
    println!("  │  Trades         {:>6}   ({} W / {} L)", s.trades, s.wins, s.losses);
    println!("  │  Win Rate       {:>6.1}%", s.win_rate);
    println!("  │  Total PnL      {:>+9.2}  ({:+.1}%)", s.total_pnl, s.total_pnl_pct);
    println!("  │  Avg Win        {:>+9.2}", s.avg_win);
    println!("  │  Avg Loss       {:>+9.2}", -s.avg_loss);
    println!("  │  Profit Factor  {:>9.2}", s.profit_factor);
    println!("  │  Max Drawdown   {:>6.1}%", s.max_drawdown);
    println!("  │  Best Trade     {:>+9.2}", s.best);
    println!("  │  Worst Trade    {:>+9.2}", s.worst);
    println!("  └─────────────────────────────────────────────┘");

    if !counters.is_empty() {
        println!();
        println!("  Counters:");
        for (i, pnl) in counters.iter().enumerate() {
            let mark = if *pnl > 0.0 { "✅" } else { "❌" };
            println!("    #{:<4} {:>+9.2}  {}", i + 1, pnl, mark);
        }
    }
}

// ── Trade log CSV ─────────────────────────────────────────────────────────────
fn save_trades(closed: &[Position], path: &Path) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    writeln!(f, "id,symbol,side,entry_date,exit_date,entry,exit,qty,sl,tp,pnl")?;
    for p in closed {
        let exit_date = p
            .closed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        writeln!(f, "{},{},{},{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            p.id, p.symbol, p.direction, p.opened_at.format("%Y-%m-%d %H:%M:%S"), exit_date,
            p.entry_price, p.current_price, p.size, p.stop_loss, p.take_profit, p.realized_pnl
        )?;
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let csv: PathBuf = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_TICKS.to_string()).into();
    let mut cfg = AppConfig::load_or_default(AppConfig::path_from_env())?;
    // Keep every closed trade for the report.
    cfg.risk.max_closed_history = usize::MAX;
    let initial_balance = cfg.capital.total_capital;

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║                RENKO BACKTESTER                       ║");
    println!("║  Capital: ${}   Brick: {}   Risk: {}%", initial_balance as u64, cfg.strategy.brick_size, cfg.strategy.risk_percent);
    println!("╚═══════════════════════════════════════════════════════╝");

    let ticks = load_csv(&csv)?;
    if ticks.is_empty() {
        eprintln!("  ⚠  No ticks in {:?}", csv);
        return Ok(());
    }
    println!("  {} ticks  →  replaying …", ticks.len());

    let events = Arc::new(EventBus::new());
    let trader = Trader::new(&cfg, PaperExchange::new(initial_balance), events);
    trader.start()?;

    let mut day = ticks[0].ts.date_naive();
    for tick in &ticks {
        // A new day lifts a halt from the previous one.
        if tick.ts.date_naive() != day {
            day = tick.ts.date_naive();
            if trader.engine().state() == EngineState::Paused {
                trader.engine().resume()?;
            }
            let ledger = trader.ledger();
            if cfg.risk.counter_trading_enabled && ledger.counter_phase() == CounterPhase::Inactive {
                ledger.start_new_counter();
            }
        }
        trader.process_tick(tick.price, tick.ts)?;
        trader.run_risk_sweep();
    }

    // Flatten what is still open at the last price.
    if let Some(last) = ticks.last() {
        for p in trader.ledger().open_positions() {
            trader.ledger().close_position_at(&p.id, last.price, last.ts)?;
        }
    }
    if trader.ledger().counter_phase() != CounterPhase::Inactive {
        trader.ledger().end_current_counter();
    }
    trader.stop();

    let closed = trader.ledger().closed_positions();
    let stats = compute_stats(&closed, initial_balance);
    print_stats(trader.symbol(), &stats, &trader.ledger().counter_results());

    let log_path = csv.with_extension("trades.csv");
    save_trades(&closed, &log_path)?;
    println!("\n  📄 Trade log saved: {:?}\n", log_path);
    Ok(())
}
