use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,

    #[error("configuration rejected: {field} = {value}")]
    ConfigurationRejected { field: &'static str, value: String },
}

/// Why an admission check refused a trade. Display is the reason string
/// reported to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RiskRejection {
    #[error("maximum open positions reached ({0})")]
    MaxOpenPositions(usize),

    #[error("maximum daily trades reached ({0})")]
    MaxTradesPerDay(u32),

    #[error("daily risk limit exceeded (daily P&L {daily_pnl:.2}, limit {limit:.2})")]
    DailyRiskExceeded { daily_pnl: f64, limit: f64 },

    #[error("maximum drawdown exceeded ({drawdown:.2} >= {limit:.2})")]
    DrawdownExceeded { drawdown: f64, limit: f64 },

    #[error("counter complete ({trades} of {per_counter} trades)")]
    CounterComplete { trades: u32, per_counter: u32 },

    #[error("trade risk {risk:.2} exceeds max {limit:.2}")]
    TradeRiskTooLarge { risk: f64, limit: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("unknown position: {0}")]
    UnknownPosition(String),

    #[error("position id already in use: {0}")]
    DuplicatePosition(String),

    #[error("risk rejected: {0}")]
    RiskRejected(#[from] RiskRejection),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("order rejected by venue: {0}")]
    Rejected(String),

    #[error("unknown order: {0}")]
    UnknownOrder(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
