//! Errors raised while configuring an [`OrbitCam`](crate::controller::component::OrbitCam).

use thiserror::Error;

/// A rejected [`OrbitSettings`](crate::controller::settings::OrbitSettings).
///
/// Configuration is the only fallible part of the controller. Once constructed, gestures never
/// fail; bad depth data degrades to the far plane sentinel instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitConfigError {
    /// The minimum pitch is not below the maximum pitch.
    #[error("pitch limits are out of order: min {min} rad >= max {max} rad")]
    PitchOrder {
        /// Configured minimum pitch, in radians.
        min: f32,
        /// Configured maximum pitch, in radians.
        max: f32,
    },
    /// A pitch limit reaches straight up or straight down, where yaw is undefined.
    #[error("pitch limit {0} rad must lie strictly between -pi/2 and pi/2")]
    PitchRange(f32),
    /// A sensitivity is zero, negative, or not finite.
    #[error("{name} sensitivity must be positive and finite, got {value}")]
    Sensitivity {
        /// Which sensitivity was rejected.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The zoom height bounds are out of order.
    #[error("zoom height limits are out of order: min {min} > max {max}")]
    ZoomOrder {
        /// Configured lower height bound.
        min: f32,
        /// Configured upper height bound.
        max: f32,
    },
    /// The depth limit is not a normalized depth.
    #[error("depth limit must be in (0, 1], got {0}")]
    DepthLimit(f32),
    /// The pan distance limit is negative or NaN.
    #[error("pan distance limit must be non-negative, got {0}")]
    PanDistance(f32),
}
