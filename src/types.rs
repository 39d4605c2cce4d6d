use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickColor {
    Green,
    Red,
}

/// One Renko brick. Completed bricks are exactly one brick-width tall; the
/// seed brick that anchors a fresh series is zero-width and has no color.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub timestamp: DateTime<Utc>,
    pub color: Option<BrickColor>,
    pub formation_fraction: f64,
}

impl Brick {
    pub fn seed(price: f64, timestamp: DateTime<Utc>) -> Self {
        Brick {
            open: price,
            close: price,
            high: price,
            low: price,
            timestamp,
            color: None,
            formation_fraction: 0.0,
        }
    }

    pub fn completed(open: f64, close: f64, timestamp: DateTime<Utc>) -> Self {
        let color = if close > open { BrickColor::Green } else { BrickColor::Red };
        Brick {
            open,
            close,
            high: open.max(close),
            low: open.min(close),
            timestamp,
            color: Some(color),
            formation_fraction: 1.0,
        }
    }

    pub fn is_green(&self) -> bool {
        self.color == Some(BrickColor::Green)
    }

    pub fn is_red(&self) -> bool {
        self.color == Some(BrickColor::Red)
    }

    pub fn is_seed(&self) -> bool {
        self.color.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupKind {
    Setup1,
    Setup2,
}

impl fmt::Display for SetupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupKind::Setup1 => write!(f, "Setup1"),
            SetupKind::Setup2 => write!(f, "Setup2"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
    Close,
}

impl Direction {
    /// Sign applied to `(price - entry) * size`. Only Sell flips it.
    pub fn pnl_multiplier(&self) -> f64 {
        match self {
            Direction::Sell => -1.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "Buy"),
            Direction::Sell => write!(f, "Sell"),
            Direction::Close => write!(f, "Close"),
        }
    }
}

/// A proposed trade produced by the pattern engine. Distances are in price
/// units relative to `reference_price`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub setup_kind: SetupKind,
    pub direction: Direction,
    pub symbol: String,
    pub reference_price: f64,
    pub proposed_stop_distance: f64,
    pub proposed_target_distance: f64,
    pub proposed_size: f64,
    pub timestamp: DateTime<Utc>,
    pub valid: bool,
    pub rationale: String,
}

impl Signal {
    pub fn stop_price(&self) -> f64 {
        match self.direction {
            Direction::Sell => self.reference_price + self.proposed_stop_distance,
            _ => self.reference_price - self.proposed_stop_distance,
        }
    }

    pub fn target_price(&self) -> f64 {
        match self.direction {
            Direction::Sell => self.reference_price - self.proposed_target_distance,
            _ => self.reference_price + self.proposed_target_distance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub size: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub open: bool,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        direction: Direction,
        size: f64,
        entry_price: f64,
        stop_loss: f64,
        take_profit: f64,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Position {
            id: id.into(),
            symbol: symbol.into(),
            direction,
            size,
            entry_price,
            current_price: entry_price,
            stop_loss,
            take_profit,
            unrealized_pnl: 0.0,
            realized_pnl: 0.0,
            opened_at,
            closed_at: None,
            open: true,
        }
    }

    /// Protective stop crossed at `price`. A non-positive stop means none was set.
    pub fn stop_hit(&self, price: f64) -> bool {
        if self.stop_loss <= 0.0 {
            return false;
        }
        match self.direction {
            Direction::Sell => price >= self.stop_loss,
            _ => price <= self.stop_loss,
        }
    }

    pub fn target_hit(&self, price: f64) -> bool {
        if self.take_profit <= 0.0 {
            return false;
        }
        match self.direction {
            Direction::Sell => price <= self.take_profit,
            _ => price >= self.take_profit,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub total_equity: f64,
    pub available_margin: f64,
    pub used_margin: f64,
    pub daily_pnl: f64,
    pub weekly_pnl: f64,
    pub monthly_pnl: f64,
    pub max_drawdown: f64,
    pub risk_used: f64,
    pub risk_remaining: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub open_positions: usize,
    pub daily_trades: u32,
    pub total_trades: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Running => write!(f, "running"),
            EngineState::Paused => write!(f, "paused"),
            EngineState::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterPhase {
    Inactive,
    InCounter,
    Complete,
}
