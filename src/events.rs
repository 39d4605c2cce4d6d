//! Notification fan-out.
//!
//! Components queue notifications while they hold their own lock and hand
//! them to the bus once the lock is released. Publishing never blocks: a
//! subscriber whose queue is full misses the event, a dropped subscriber is
//! pruned on the next publish.

use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::types::{Brick, Position, RiskMetrics, Signal};

pub const SUBSCRIBER_QUEUE: usize = 256;

#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    BrickFormed { symbol: String, brick: Brick },
    SignalEmitted(Signal),
    StrategyStatusChanged(String),
    EngineError(String),
    PositionOpened(Position),
    PositionUpdated(Position),
    PositionClosed(Position),
    RiskLimitReached(String),
    DrawdownWarning(f64),
    CounterCompleted { counter_number: u32, pnl: f64 },
    TradingHalted(String),
    RiskMetricsUpdated(RiskMetrics),
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::Sender<Notification>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::Receiver<Notification> {
        self.subscribe_with_capacity(SUBSCRIBER_QUEUE)
    }

    pub fn subscribe_with_capacity(&self, capacity: usize) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn publish(&self, event: Notification) {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subs.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::debug!("Subscriber queue full — notification dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = Notification>) {
        for event in events {
            self.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fans_out_to_every_subscriber() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(Notification::TradingHalted("test".into()));

        assert_eq!(a.try_recv().unwrap(), Notification::TradingHalted("test".into()));
        assert_eq!(b.try_recv().unwrap(), Notification::TradingHalted("test".into()));
    }

    #[test]
    fn full_queue_does_not_block_publisher() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe_with_capacity(1);

        bus.publish(Notification::DrawdownWarning(1.0));
        bus.publish(Notification::DrawdownWarning(2.0));

        assert_eq!(rx.try_recv().unwrap(), Notification::DrawdownWarning(1.0));
        assert!(rx.try_recv().is_err());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn closed_subscribers_are_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);

        bus.publish(Notification::StrategyStatusChanged("x".into()));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
