use crate::types::{Brick, BrickColor, Direction, SetupKind};

/// A setup that fired on the newest brick.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternMatch {
    pub setup: SetupKind,
    pub direction: Direction,
    pub description: &'static str,
}

/// Which setups are checked, and how Setup 2 treats an all-Red run.
#[derive(Clone, Copy, Debug)]
pub struct DetectorParams {
    pub setup1_enabled: bool,
    pub setup2_enabled: bool,
    pub setup2_sell_on_red_run: bool,
}

/// Setup awaiting one more brick.
pub struct PendingSetupInfo {
    pub setup: SetupKind,
    pub missing: String,
}

fn last_three(bricks: &[Brick]) -> Option<[&Brick; 3]> {
    let n = bricks.len();
    if n < 3 {
        return None;
    }
    Some([&bricks[n - 3], &bricks[n - 2], &bricks[n - 1]])
}

/// Setup 1: Red, Red, Green on the three newest bricks.
///
/// The seed brick has no color and therefore never matches.
pub fn detect_two_red_one_green(bricks: &[Brick]) -> bool {
    match last_three(bricks) {
        Some([b1, b2, b3]) => b1.is_red() && b2.is_red() && b3.is_green(),
        None => false,
    }
}

/// Setup 2: three newest bricks share one color. Returns that color.
pub fn detect_three_brick_run(bricks: &[Brick]) -> Option<BrickColor> {
    let [b1, b2, b3] = last_three(bricks)?;
    let color = b1.color?;
    if b2.color == Some(color) && b3.color == Some(color) {
        Some(color)
    } else {
        None
    }
}

/// Runs the enabled setups against the newest brick. Setup 1 is checked
/// first and wins when both would fire.
pub fn scan_patterns(bricks: &[Brick], p: &DetectorParams) -> Option<PatternMatch> {
    if p.setup1_enabled && detect_two_red_one_green(bricks) {
        return Some(PatternMatch {
            setup: SetupKind::Setup1,
            direction: Direction::Buy,
            description: "Setup1: two red, one green pattern detected",
        });
    }

    if p.setup2_enabled {
        match detect_three_brick_run(bricks) {
            Some(BrickColor::Green) => {
                return Some(PatternMatch {
                    setup: SetupKind::Setup2,
                    direction: Direction::Buy,
                    description: "Setup2: three green bricks pattern detected",
                });
            }
            Some(BrickColor::Red) if p.setup2_sell_on_red_run => {
                return Some(PatternMatch {
                    setup: SetupKind::Setup2,
                    direction: Direction::Sell,
                    description: "Setup2: three red bricks pattern detected",
                });
            }
            _ => {}
        }
    }
    None
}

/// Looks for a setup that the next brick would complete and says which
/// brick is missing. Used for status reporting only.
pub fn scan_pending_setup(bricks: &[Brick], p: &DetectorParams) -> Option<PendingSetupInfo> {
    let n = bricks.len();
    if n < 2 {
        return None;
    }
    let (b1, b2) = (&bricks[n - 2], &bricks[n - 1]);

    if p.setup1_enabled && b1.is_red() && b2.is_red() {
        return Some(PendingSetupInfo {
            setup: SetupKind::Setup1,
            missing: format!("Green brick above {:.2}", b2.close),
        });
    }
    if p.setup2_enabled && b1.is_green() && b2.is_green() {
        return Some(PendingSetupInfo {
            setup: SetupKind::Setup2,
            missing: format!("Green brick above {:.2}", b2.close),
        });
    }
    if p.setup2_enabled && p.setup2_sell_on_red_run && b1.is_red() && b2.is_red() {
        return Some(PendingSetupInfo {
            setup: SetupKind::Setup2,
            missing: format!("Red brick below {:.2}", b2.close),
        });
    }
    None
}
