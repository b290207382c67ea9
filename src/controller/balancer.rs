//! Input balancing near motion limits.

use bevy_math::prelude::*;

/// Damps raw pointer positions so a gesture can run into a limit without getting stuck on it.
///
/// Clamping the result of a gesture (e.g. the pitch angle) leaves a dead zone: once the pointer
/// has travelled past the clamp, it has to travel all the way back before anything moves again.
/// The balancer works on the input instead. It follows the raw pointer motion while a `latch`
/// predicate accepts the resulting position, and stops following in the blocked direction when
/// it doesn't. The refused motion is kept as overflow; an `invert` predicate decides whether a
/// drag in the opposite direction discards that overflow right away, or first has to pay it back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balancer {
    last_raw: Option<Vec2>,
    balanced: Vec2,
    overflow: Vec2,
}

impl Balancer {
    /// Start balancing from `position`, which is also the first output.
    pub fn seed(&mut self, position: Vec2) {
        self.last_raw = Some(position);
        self.balanced = position;
        self.overflow = Vec2::ZERO;
    }

    /// Forget all state. The next raw input passes through untouched.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The last balanced output.
    pub fn balanced(&self) -> Vec2 {
        self.balanced
    }

    /// Raw motion refused since the balancer was last at a limit.
    pub fn overflow(&self) -> Vec2 {
        self.overflow
    }

    /// Feed a raw position, returning the balanced position.
    ///
    /// - `latch(candidate)` returns true while `candidate` is an acceptable output.
    /// - `invert(delta, overflow)` returns true when the raw `delta` should cancel any pending
    ///   `overflow` immediately, instead of paying it back first.
    pub fn balance(
        &mut self,
        raw: Vec2,
        latch: impl Fn(Vec2) -> bool,
        invert: impl Fn(Vec2, Vec2) -> bool,
    ) -> Vec2 {
        let Some(last_raw) = self.last_raw.replace(raw) else {
            self.balanced = raw;
            return raw;
        };
        let mut delta = raw - last_raw;

        if self.overflow != Vec2::ZERO {
            if invert(delta, self.overflow) {
                self.overflow = Vec2::ZERO;
            } else {
                // Motion against the overflow pays it back first, axis by axis. What's left over
                // moves the output.
                for axis in 0..2 {
                    let overflow = self.overflow[axis];
                    if overflow * delta[axis] >= 0.0 {
                        continue;
                    }
                    let remaining = overflow + delta[axis];
                    if remaining * overflow > 0.0 {
                        self.overflow[axis] = remaining;
                        delta[axis] = 0.0;
                    } else {
                        self.overflow[axis] = 0.0;
                        delta[axis] = remaining;
                    }
                }
            }
        }

        if delta == Vec2::ZERO {
            return self.balanced;
        }

        let candidate = self.balanced + delta;
        if latch(candidate) {
            self.balanced = candidate;
            return self.balanced;
        }

        let along_x = Vec2::new(delta.x, 0.0);
        let along_y = Vec2::new(0.0, delta.y);
        if delta.x != 0.0 && latch(self.balanced + along_x) {
            self.balanced += along_x;
            self.overflow += along_y;
        } else if delta.y != 0.0 && latch(self.balanced + along_y) {
            self.balanced += along_y;
            self.overflow += along_x;
        } else {
            self.overflow += delta;
        }
        self.balanced
    }
}

/// An `invert` predicate for [`Balancer::balance`]: a drag against the overflow cancels it.
pub fn reverses(delta: Vec2, overflow: Vec2) -> bool {
    delta.dot(overflow) < 0.0
}
