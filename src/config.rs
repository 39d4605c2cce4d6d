use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ─── Trading ──────────────────────────────────────────────────────────────────
pub const DEFAULT_SYMBOL: &str = "BTCUSD";
/// Env var holding the config file path; falls back to `DEFAULT_CONFIG_PATH`.
pub const CONFIG_PATH_ENV: &str = "RENKO_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// ─── Strategy ─────────────────────────────────────────────────────────────────
pub const DEFAULT_BRICK_SIZE: f64 = 10.0;
pub const MIN_BRICK_SIZE: f64 = 0.1;
pub const MAX_BRICK_SIZE: f64 = 1000.0;
pub const DEFAULT_TICK_BUFFER: u32 = 2;
pub const DEFAULT_RISK_PERCENT: f64 = 2.0;
pub const MAX_RISK_PERCENT: f64 = 100.0;
pub const REFERENCE_ACCOUNT_SIZE: f64 = 10_000.0;
pub const MIN_SIGNAL_SIZE: f64 = 0.01;
pub const MAX_BRICK_HISTORY: usize = 100;
/// Larger jumps re-seed the series instead of forming bricks.
pub const MAX_BRICKS_PER_TICK: usize = 1000;
pub const MAX_SIGNAL_HISTORY: usize = 500;
pub const BRICK_FORMATION_THRESHOLD: f64 = 0.75; // 75 %
pub const STOP_BRICKS: f64 = 2.0;   // stop = 2 bricks (Renko reversal)
pub const TARGET_BRICKS: f64 = 3.0; // target = 3 bricks (1:1.5)

// ─── Risk ─────────────────────────────────────────────────────────────────────
pub const DEFAULT_EQUITY: f64 = 10_000.0;
pub const DEFAULT_MAX_RISK_PER_TRADE: f64 = 2.0;   // 2 %
pub const DEFAULT_MAX_DAILY_RISK: f64 = 10.0;      // 10 %
pub const DEFAULT_MAX_OPEN_POSITIONS: usize = 5;
pub const DEFAULT_MAX_DRAWDOWN_PCT: f64 = 20.0;    // 20 %
pub const DEFAULT_MAX_TRADES_PER_DAY: u32 = 20;
pub const DEFAULT_TRADES_PER_COUNTER: u32 = 10;
/// Stop distance assumed by the admission check's per-trade risk rule.
pub const DEFAULT_ADMISSION_STOP_UNITS: f64 = 10.0;
pub const DEFAULT_MIN_LOT_SIZE: f64 = 0.01;
pub const DEFAULT_MAX_LOT_SIZE: f64 = 100.0;
pub const MAX_CLOSED_HISTORY: usize = 1000;
pub const DEFAULT_MARGIN_REQUIREMENT_PCT: f64 = 20.0;

// ─── Scheduler cadence (binaries) ─────────────────────────────────────────────
pub const RISK_SWEEP_INTERVAL_MS: u64 = 1000;
pub const TICK_INTERVAL_MS: u64 = 1000;
pub const STATUS_INTERVAL_SECS: u64 = 300;

// ─── Per-symbol lot limits ────────────────────────────────────────────────────
//
//            Symbol   MaxLot
//            BTCUSD      5.0
//            ETHUSD     50.0
//            EURUSD    100.0
//            XAUUSD     20.0

pub struct SymbolLimits {
    pub max_lot: f64,
}

/// Per-symbol limits, `None` for symbols without an entry (caller falls back
/// to the configured maximum).
pub fn symbol_limits(symbol: &str) -> Option<SymbolLimits> {
    match symbol {
        "BTCUSD" => Some(SymbolLimits { max_lot: 5.0 }),
        "ETHUSD" => Some(SymbolLimits { max_lot: 50.0 }),
        "EURUSD" => Some(SymbolLimits { max_lot: 100.0 }),
        "XAUUSD" => Some(SymbolLimits { max_lot: 20.0 }),
        _ => None,
    }
}

// ─── File layout ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub trading: TradingConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
    pub capital: CapitalConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TradingConfig {
    pub default_symbol: String,
    pub paper_trading_mode: bool,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            default_symbol: DEFAULT_SYMBOL.to_string(),
            paper_trading_mode: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyConfig {
    pub brick_size: f64,
    pub tick_buffer: u32,
    pub setup1_enabled: bool,
    pub setup2_enabled: bool,
    pub risk_percent: f64,
    pub setup2_sell_on_red_run: bool,
    pub reference_account_size: f64,
    pub min_size: f64,
    pub max_brick_history: usize,
    pub max_bricks_per_tick: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            brick_size: DEFAULT_BRICK_SIZE,
            tick_buffer: DEFAULT_TICK_BUFFER,
            setup1_enabled: true,
            setup2_enabled: true,
            risk_percent: DEFAULT_RISK_PERCENT,
            setup2_sell_on_red_run: false,
            reference_account_size: REFERENCE_ACCOUNT_SIZE,
            min_size: MIN_SIGNAL_SIZE,
            max_brick_history: MAX_BRICK_HISTORY,
            max_bricks_per_tick: MAX_BRICKS_PER_TICK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskConfig {
    pub max_risk_per_trade: f64,
    pub max_daily_risk: f64,
    pub max_open_positions: usize,
    #[serde(alias = "maxDrawdownPercent")]
    pub max_drawdown: f64,
    pub max_trades_per_day: u32,
    pub trades_per_counter: u32,
    pub counter_trading_enabled: bool,
    pub admission_stop_units: f64,
    pub min_lot_size: f64,
    pub max_lot_size: f64,
    pub max_closed_history: usize,
    pub margin_requirement_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            max_risk_per_trade: DEFAULT_MAX_RISK_PER_TRADE,
            max_daily_risk: DEFAULT_MAX_DAILY_RISK,
            max_open_positions: DEFAULT_MAX_OPEN_POSITIONS,
            max_drawdown: DEFAULT_MAX_DRAWDOWN_PCT,
            max_trades_per_day: DEFAULT_MAX_TRADES_PER_DAY,
            trades_per_counter: DEFAULT_TRADES_PER_COUNTER,
            counter_trading_enabled: false,
            admission_stop_units: DEFAULT_ADMISSION_STOP_UNITS,
            min_lot_size: DEFAULT_MIN_LOT_SIZE,
            max_lot_size: DEFAULT_MAX_LOT_SIZE,
            max_closed_history: MAX_CLOSED_HISTORY,
            margin_requirement_pct: DEFAULT_MARGIN_REQUIREMENT_PCT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapitalConfig {
    pub total_capital: f64,
}

impl Default for CapitalConfig {
    fn default() -> Self {
        CapitalConfig { total_capital: DEFAULT_EQUITY }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Like `load`, but a missing file yields the defaults. Parse errors are
    /// still reported.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config file at {} — using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let cfg = Self::load(path)?;
        log::info!("Configuration loaded from {}", path.display());
        Ok(cfg)
    }

    /// Path from `RENKO_CONFIG`, or `config.json` in the working directory.
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}
