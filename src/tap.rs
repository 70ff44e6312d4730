//! Converts raw tap timestamps into count increments.
//!
//! A tap less than [`FAST_TAP_WINDOW_MS`] after the previous one is "fast".
//! The first fast tap of a burst adds 2, the second adds 5 and starts the
//! burst over. Isolated taps add 1. The first tap of a session is isolated.

pub const FAST_TAP_WINDOW_MS: i64 = 300;
pub const SINGLE_STEP: u32 = 1;
pub const DOUBLE_STEP: u32 = 2;
pub const TRIPLE_STEP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Single,
    Double,
    Triple,
}

#[derive(Debug, Clone, Default)]
pub struct TapClassifier {
    last_tap_ms: Option<i64>,
    fast_taps: u32,
}

impl TapClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tap at `at_ms` and returns the new count.
    pub fn tap(&mut self, at_ms: i64, count: u32, target: u32) -> (TapKind, u32) {
        let fast = self
            .last_tap_ms
            .is_some_and(|last| at_ms.saturating_sub(last) < FAST_TAP_WINDOW_MS);
        self.last_tap_ms = Some(at_ms);

        if fast {
            self.fast_taps += 1;
            if self.fast_taps >= 2 {
                self.fast_taps = 0;
                (TapKind::Triple, count.saturating_add(TRIPLE_STEP).min(target))
            } else {
                (TapKind::Double, count.saturating_add(DOUBLE_STEP).min(target))
            }
        } else {
            self.fast_taps = 0;
            if count < target {
                (TapKind::Single, count + SINGLE_STEP)
            } else {
                (TapKind::Single, count)
            }
        }
    }
}
