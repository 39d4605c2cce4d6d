use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::types::{Brick, BrickColor};

/// Absorbs float noise in `|diff| / brick_size` (0.3 / 0.1 = 2.9999…).
const QUOTIENT_EPSILON: f64 = 1e-9;
const MIN_CAPACITY: usize = 3;

/// Append-only Renko series with a bounded retention window.
///
/// Every brick after the seed closes exactly one `brick_size` away from the
/// previous close; a tick that jumps several widths is split into that many
/// bricks by the caller via `push_step`.
#[derive(Clone, Debug)]
pub struct BrickSeries {
    bricks: VecDeque<Brick>,
    brick_size: f64,
    capacity: usize,
}

impl BrickSeries {
    pub fn new(brick_size: f64, capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        BrickSeries {
            bricks: VecDeque::with_capacity(capacity + 1),
            brick_size,
            capacity,
        }
    }

    pub fn brick_size(&self) -> f64 {
        self.brick_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changing the width invalidates the existing bricks, so the series is
    /// cleared and re-seeded by the next tick.
    pub fn set_brick_size(&mut self, brick_size: f64) {
        if brick_size != self.brick_size {
            self.brick_size = brick_size;
            self.bricks.clear();
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(MIN_CAPACITY);
        self.evict();
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn last(&self) -> Option<&Brick> {
        self.bricks.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter()
    }

    pub fn to_vec(&self) -> Vec<Brick> {
        self.bricks.iter().cloned().collect()
    }

    /// Oldest-first view of the retained bricks.
    pub fn contiguous(&mut self) -> &[Brick] {
        self.bricks.make_contiguous()
    }

    pub fn clear(&mut self) {
        self.bricks.clear();
    }

    /// Number of whole bricks `price` completes beyond the last close, with
    /// the direction of travel. `None` when the series is empty. Counts too
    /// large for `usize` come back as `usize::MAX`.
    pub fn bricks_for(&self, price: f64) -> Option<(usize, BrickColor)> {
        let last = self.bricks.back()?;
        let diff = price - last.close;
        let quotient = (diff.abs() / self.brick_size + QUOTIENT_EPSILON).floor();
        let count = if quotient.is_finite() && quotient < usize::MAX as f64 {
            quotient as usize
        } else {
            usize::MAX
        };
        let color = if diff > 0.0 { BrickColor::Green } else { BrickColor::Red };
        Some((count, color))
    }

    pub fn push_seed(&mut self, price: f64, timestamp: DateTime<Utc>) -> Brick {
        let seed = Brick::seed(price, timestamp);
        self.bricks.push_back(seed.clone());
        self.evict();
        seed
    }

    /// Append one brick moving a single width in `color`'s direction.
    /// The series must already be seeded.
    pub fn push_step(&mut self, color: BrickColor, timestamp: DateTime<Utc>) -> Option<Brick> {
        let open = self.bricks.back()?.close;
        let close = match color {
            BrickColor::Green => open + self.brick_size,
            BrickColor::Red => open - self.brick_size,
        };
        let brick = Brick::completed(open, close, timestamp);
        self.bricks.push_back(brick.clone());
        self.evict();
        Some(brick)
    }

    /// The brick currently forming at `price`, if price has moved off the
    /// last close without completing a width.
    pub fn partial(&self, price: f64, timestamp: DateTime<Utc>) -> Option<Brick> {
        let last = self.bricks.back()?;
        let diff = price - last.close;
        if diff == 0.0 {
            return None;
        }
        let fraction = (diff.abs() / self.brick_size).min(1.0);
        let mut brick = Brick::completed(last.close, price, timestamp);
        brick.formation_fraction = fraction;
        Some(brick)
    }

    fn evict(&mut self) {
        while self.bricks.len() > self.capacity {
            self.bricks.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn counts_whole_bricks_only() {
        let mut s = BrickSeries::new(10.0, 100);
        assert_eq!(s.bricks_for(100.0), None);
        s.push_seed(100.0, ts());
        assert_eq!(s.bricks_for(109.99), Some((0, BrickColor::Green)));
        assert_eq!(s.bricks_for(130.0), Some((3, BrickColor::Green)));
        assert_eq!(s.bricks_for(79.0), Some((2, BrickColor::Red)));
    }

    #[test]
    fn float_quotient_noise_is_absorbed() {
        let mut s = BrickSeries::new(0.1, 100);
        s.push_seed(0.0, ts());
        assert_eq!(s.bricks_for(0.3).map(|(n, _)| n), Some(3));
    }

    #[test]
    fn oversized_jump_saturates_count() {
        let mut s = BrickSeries::new(0.1, 100);
        s.push_seed(100.0, ts());
        assert_eq!(s.bricks_for(1e300), Some((usize::MAX, BrickColor::Green)));
        assert_eq!(s.bricks_for(-1e300), Some((usize::MAX, BrickColor::Red)));
    }

    #[test]
    fn steps_are_exactly_one_width() {
        let mut s = BrickSeries::new(10.0, 100);
        s.push_seed(100.0, ts());
        let up = s.push_step(BrickColor::Green, ts()).unwrap();
        assert_eq!((up.open, up.close, up.high, up.low), (100.0, 110.0, 110.0, 100.0));
        assert!(up.is_green());
        let down = s.push_step(BrickColor::Red, ts()).unwrap();
        assert_eq!((down.open, down.close), (110.0, 100.0));
        assert!(down.is_red());
        assert_eq!(down.formation_fraction, 1.0);
    }

    #[test]
    fn oldest_bricks_are_evicted() {
        let mut s = BrickSeries::new(1.0, 5);
        s.push_seed(0.0, ts());
        for _ in 0..10 {
            s.push_step(BrickColor::Green, ts());
        }
        assert_eq!(s.len(), 5);
        assert_eq!(s.contiguous()[0].close, 6.0);
        assert_eq!(s.last().unwrap().close, 10.0);
    }

    #[test]
    fn partial_brick_reports_fraction() {
        let mut s = BrickSeries::new(10.0, 100);
        s.push_seed(100.0, ts());
        assert!(s.partial(100.0, ts()).is_none());
        let p = s.partial(97.5, ts()).unwrap();
        assert!(p.is_red());
        assert_eq!(p.formation_fraction, 0.25);
    }

    #[test]
    fn resizing_clears_the_series() {
        let mut s = BrickSeries::new(10.0, 100);
        s.push_seed(100.0, ts());
        s.set_brick_size(10.0);
        assert_eq!(s.len(), 1);
        s.set_brick_size(5.0);
        assert!(s.is_empty());
    }
}
