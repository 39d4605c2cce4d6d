//! Renko pattern trading core: brick formation and setup detection, a
//! risk/position ledger with counter trading, and a paper execution path.

pub mod config;
pub mod counter;
pub mod error;
pub mod events;
pub mod exchange;
pub mod notifier;
pub mod pattern_detector;
pub mod position_manager;
pub mod renko;
pub mod risk_ledger;
pub mod strategy_engine;
pub mod trader;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, EngineError, GatewayError, LedgerError, RiskRejection};
pub use events::{EventBus, Notification};
pub use exchange::{ExchangeGateway, OrderRouter, PaperExchange};
pub use risk_ledger::RiskLedger;
pub use strategy_engine::{PatternEngine, SignalValidator, TickOutcome};
pub use trader::{TickReport, Trader};
pub use types::{Brick, BrickColor, Direction, EngineState, Position, RiskMetrics, SetupKind, Signal};
