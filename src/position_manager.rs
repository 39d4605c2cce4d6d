use crate::types::{Direction, Position, Signal};

/// Flat-risk sizing: `(account × risk%) / stop`, never below `min_size`.
/// A non-positive stop distance yields `min_size`.
pub fn calculate_position_size(account_size: f64, risk_percent: f64, stop_distance: f64, min_size: f64) -> f64 {
    if stop_distance <= 0.0 {
        return min_size;
    }
    let risk_amount = account_size * (risk_percent / 100.0);
    (risk_amount / stop_distance).max(min_size)
}

/// Ledger sizing: flat-risk size clamped to `[min_lot, max_lot]`.
pub fn calculate_lot_size(equity: f64, risk_percent: f64, stop_distance: f64, min_lot: f64, max_lot: f64) -> f64 {
    if stop_distance <= 0.0 {
        return min_lot;
    }
    calculate_position_size(equity, risk_percent, stop_distance, min_lot).min(max_lot)
}

/// `(price − entry) × size`, sign flipped for Sell.
pub fn pnl_at(position: &Position, price: f64) -> f64 {
    (price - position.entry_price) * position.size * position.direction.pnl_multiplier()
}

pub fn update_position_pnl(position: &mut Position, current_price: f64) {
    position.current_price = current_price;
    position.unrealized_pnl = pnl_at(position, current_price);
}

/// Money at risk between entry and the protective stop.
pub fn position_risk(position: &Position) -> f64 {
    if position.stop_loss <= 0.0 {
        return 0.0;
    }
    (position.entry_price - position.stop_loss).abs() * position.size
}

/// Absolute stop and target around a fill price for a trade in `direction`.
pub fn protective_levels(direction: Direction, entry: f64, stop_distance: f64, target_distance: f64) -> (f64, f64) {
    match direction {
        Direction::Sell => (entry + stop_distance, entry - target_distance),
        _ => (entry - stop_distance, entry + target_distance),
    }
}

pub fn validate_trade(signal: &Signal, min_size: f64, min_notional: f64) -> Result<(), String> {
    if signal.proposed_size < min_size {
        return Err(format!(
            "Size {:.4} below minimum {:.4}",
            signal.proposed_size, min_size
        ));
    }

    let notional = signal.proposed_size * signal.reference_price;
    if notional < min_notional {
        return Err(format!(
            "Notional {:.2} below minimum {:.2} (size={:.4} @ {:.2})",
            notional, min_notional, signal.proposed_size, signal.reference_price
        ));
    }

    if signal.proposed_stop_distance <= 0.0 || signal.proposed_target_distance <= 0.0 {
        return Err("Stop and target distances must be positive".to_string());
    }

    // Catch inverted levels before they reach the order layer.
    let (stop, target) = (signal.stop_price(), signal.target_price());
    match signal.direction {
        Direction::Buy => {
            if stop >= signal.reference_price || target <= signal.reference_price {
                return Err(format!(
                    "Levels SL {:.4} / TP {:.4} inconsistent with Buy @ {:.4}",
                    stop, target, signal.reference_price
                ));
            }
        }
        Direction::Sell => {
            if stop <= signal.reference_price || target >= signal.reference_price {
                return Err(format!(
                    "Levels SL {:.4} / TP {:.4} inconsistent with Sell @ {:.4}",
                    stop, target, signal.reference_price
                ));
            }
        }
        Direction::Close => return Err("Close signals are not tradeable entries".to_string()),
    }

    Ok(())
}
