use crate::types::CounterPhase;

/// A group of consecutive trades whose combined P&L decides whether trading
/// continues. Owned by the ledger and mutated only under its lock.
#[derive(Clone, Debug)]
pub struct CounterState {
    counter_number: u32,
    trades: u32,
    start_equity: f64,
    results: Vec<f64>,
    phase: CounterPhase,
}

impl Default for CounterState {
    fn default() -> Self {
        CounterState {
            counter_number: 0,
            trades: 0,
            start_equity: 0.0,
            results: Vec::new(),
            phase: CounterPhase::Inactive,
        }
    }
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the next counter at `equity`. Returns its number.
    pub fn start(&mut self, equity: f64) -> u32 {
        self.counter_number += 1;
        self.trades = 0;
        self.start_equity = equity;
        self.phase = CounterPhase::InCounter;
        self.counter_number
    }

    /// Counts a closed trade against the active counter. Returns true when
    /// this close completed it.
    pub fn record_close(&mut self, trades_per_counter: u32) -> bool {
        if self.phase == CounterPhase::Inactive {
            return false;
        }
        self.trades += 1;
        if self.phase == CounterPhase::InCounter && self.trades >= trades_per_counter {
            self.phase = CounterPhase::Complete;
            return true;
        }
        false
    }

    pub fn is_complete(&self, trades_per_counter: u32) -> bool {
        self.trades >= trades_per_counter
    }

    pub fn pnl(&self, equity: f64) -> f64 {
        equity - self.start_equity
    }

    /// Closes the active counter and records its P&L. `None` if no counter
    /// was running.
    pub fn end(&mut self, equity: f64) -> Option<(u32, f64)> {
        if self.phase == CounterPhase::Inactive {
            return None;
        }
        let pnl = self.pnl(equity);
        self.results.push(pnl);
        self.phase = CounterPhase::Inactive;
        Some((self.counter_number, pnl))
    }

    pub fn counter_number(&self) -> u32 {
        self.counter_number
    }

    pub fn trades(&self) -> u32 {
        self.trades
    }

    pub fn start_equity(&self) -> f64 {
        self.start_equity
    }

    pub fn results(&self) -> &[f64] {
        &self.results
    }

    pub fn phase(&self) -> CounterPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_lifecycle() {
        let mut c = CounterState::new();
        assert_eq!(c.phase(), CounterPhase::Inactive);
        assert!(!c.record_close(2));
        assert_eq!(c.trades(), 0);

        assert_eq!(c.start(10_000.0), 1);
        assert!(!c.record_close(2));
        assert!(c.record_close(2));
        assert_eq!(c.phase(), CounterPhase::Complete);
        assert!(c.is_complete(2));

        // Further closes still count but do not re-complete.
        assert!(!c.record_close(2));
        assert_eq!(c.trades(), 3);

        assert_eq!(c.end(10_150.0), Some((1, 150.0)));
        assert_eq!(c.phase(), CounterPhase::Inactive);
        assert_eq!(c.end(10_150.0), None);
        assert_eq!(c.results(), &[150.0]);
    }

    #[test]
    fn restart_resets_trade_count() {
        let mut c = CounterState::new();
        c.start(100.0);
        c.record_close(1);
        c.end(90.0);
        assert_eq!(c.start(90.0), 2);
        assert_eq!(c.trades(), 0);
        assert_eq!(c.start_equity(), 90.0);
        assert_eq!(c.results(), &[-10.0]);
    }
}
