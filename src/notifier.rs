use tokio::sync::mpsc;

use crate::events::Notification;
use crate::types::{Direction, Position, RiskMetrics, Signal};

/// Drains a bus subscription and writes a human-readable line per event.
#[derive(Clone)]
pub struct Notifier {
    label: String,
}

impl Notifier {
    pub fn new(label: &str) -> Self {
        Notifier { label: label.to_string() }
    }

    fn send(&self, text: &str) {
        log::info!("[{}] {}", self.label, text.replace('\n', " | "));
    }

    /// Runs until every sender is gone.
    pub async fn run(self, mut rx: mpsc::Receiver<Notification>) {
        while let Some(event) = rx.recv().await {
            self.handle(&event);
        }
        log::debug!("[{}] notification stream closed", self.label);
    }

    pub fn handle(&self, event: &Notification) {
        match render(event) {
            Some(text) => self.send(&text),
            None => log::trace!("[{}] {:?}", self.label, event),
        }
    }

    // ── Convenience helpers ──────────────────────────────────────────────────

    pub fn notify_start(&self, symbol: &str, brick_size: f64, capital: f64) {
        self.send(&format!(
            "🤖 Renko trader started\nSymbol: {symbol} | Brick: {brick_size} | Capital: ${capital:.0}"
        ));
    }

    pub fn notify_daily_summary(&self, daily_pnl: f64, trades: u32, win_rate: f64, equity: f64) {
        self.send(&format!(
            "📊 Daily Summary\n\
             PnL: {daily_pnl:+.2}\n\
             Trades: {trades}  WR: {win_rate:.1}%\n\
             Equity: {equity:.2}"
        ));
    }

    pub fn notify_risk_alert(&self, message: &str) {
        self.send(&format!("⚠️ Risk Alert\n{message}"));
    }

    pub fn notify_status(&self, lines: &[String], metrics: &RiskMetrics, trading_enabled: bool) {
        let status_flag = if trading_enabled { "✅ active" } else { "⛔ halted" };
        let pnl_emoji = if metrics.daily_pnl >= 0.0 { "📈" } else { "📉" };
        let header = format!(
            "📡 Status | {status_flag}\n\
             Equity: ${:.2} | {pnl_emoji} PnL today: {:+.2} | Trades: {}",
            metrics.total_equity, metrics.daily_pnl, metrics.daily_trades
        );
        self.send(&format!("{header}\n{}", lines.join("\n")));
    }
}

fn direction_emoji(direction: Direction) -> &'static str {
    match direction {
        Direction::Buy => "🟢",
        Direction::Sell => "🔴",
        Direction::Close => "⚪",
    }
}

pub fn format_signal(signal: &Signal) -> String {
    format!(
        "{} {} {} {}\nRef: {:.2}  SL: {:.2}  TP: {:.2}  Size: {:.4}\n{}",
        direction_emoji(signal.direction),
        signal.setup_kind,
        signal.direction,
        signal.symbol,
        signal.reference_price,
        signal.stop_price(),
        signal.target_price(),
        signal.proposed_size,
        signal.rationale
    )
}

pub fn format_trade_open(p: &Position) -> String {
    format!(
        "{} Trade Opened — {} {}\n\
         Qty:   {:.4}\n\
         Entry: {:.2}\n\
         SL:    {:.2}\n\
         TP:    {:.2}",
        direction_emoji(p.direction),
        p.direction,
        p.symbol,
        p.size,
        p.entry_price,
        p.stop_loss,
        p.take_profit
    )
}

pub fn format_trade_close(p: &Position) -> String {
    let emoji = if p.realized_pnl >= 0.0 { "✅" } else { "❌" };
    format!(
        "{emoji} Trade Closed — {} {}\n\
         Entry: {:.2}  Exit: {:.2}\n\
         PnL:   {:+.2}",
        p.direction, p.symbol, p.entry_price, p.current_price, p.realized_pnl
    )
}

/// Text for events worth surfacing; `None` for high-frequency ones.
pub fn render(event: &Notification) -> Option<String> {
    match event {
        Notification::BrickFormed { .. } | Notification::PositionUpdated(_) => None,
        Notification::RiskMetricsUpdated(_) => None,
        Notification::SignalEmitted(signal) => Some(format_signal(signal)),
        Notification::StrategyStatusChanged(status) => Some(format!("ℹ️ {status}")),
        Notification::EngineError(message) => Some(format!("🛑 Engine error: {message}")),
        Notification::PositionOpened(p) => Some(format_trade_open(p)),
        Notification::PositionClosed(p) => Some(format_trade_close(p)),
        Notification::RiskLimitReached(reason) => Some(format!("⚠️ Risk limit reached: {reason}")),
        Notification::DrawdownWarning(dd) => Some(format!("📉 Drawdown warning: {dd:.2}")),
        Notification::CounterCompleted { counter_number, pnl } => {
            Some(format!("🏁 Counter #{counter_number} completed | PnL {pnl:+.2}"))
        }
        Notification::TradingHalted(reason) => Some(format!("⛔ Trading halted: {reason}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn closed_trade_shows_signed_pnl() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let mut p = Position::new("p1", "BTCUSD", Direction::Sell, 1.0, 100.0, 120.0, 70.0, ts);
        p.current_price = 110.0;
        p.realized_pnl = -10.0;
        let text = format_trade_close(&p);
        assert!(text.starts_with("❌"));
        assert!(text.contains("-10.00"));
    }

    #[test]
    fn noisy_events_are_not_rendered() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let brick = crate::types::Brick::seed(100.0, ts);
        assert!(render(&Notification::BrickFormed { symbol: "X".into(), brick }).is_none());
        assert_eq!(
            render(&Notification::CounterCompleted { counter_number: 2, pnl: 15.0 }).as_deref(),
            Some("🏁 Counter #2 completed | PnL +15.00")
        );
    }
}
