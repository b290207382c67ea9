//! Settings for [`OrbitCam`](super::component::OrbitCam).

use std::f32::consts::FRAC_PI_2;

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::zoom::ZoomLimits;
use crate::error::OrbitConfigError;

/// Everything that configures how the controller reacts to input.
///
/// Validated once, by [`OrbitCam::new`](super::component::OrbitCam::new).
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct OrbitSettings {
    /// What gestures are allowed to start?
    pub enabled_motion: EnabledMotion,
    /// Bounds on the camera's downward pitch while rotating.
    pub pitch_limits: PitchLimits,
    /// Input sensitivity of rotation and zoom.
    pub sensitivity: Sensitivity,
    /// Bounds on the camera height while zooming.
    pub zoom_limits: ZoomLimits,
    /// Bounds on how far a pan can carry the view away from [`Self::origin`].
    pub pan_limits: PanLimits,
    /// Reference point of the scene. Its height defines the ground plane used when nothing is
    /// under the pointer.
    pub origin: Vec3,
    /// Normalized depths above this value are treated as background.
    pub depth_limit: f32,
    /// Where to anchor when the pointer is over the background.
    pub anchor_correction: AnchorCorrection,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enabled_motion: Default::default(),
            pitch_limits: Default::default(),
            sensitivity: Default::default(),
            zoom_limits: Default::default(),
            pan_limits: Default::default(),
            origin: Vec3::ZERO,
            depth_limit: 0.96,
            anchor_correction: Default::default(),
        }
    }
}

impl OrbitSettings {
    /// Check the settings for values that would make interaction undefined.
    pub fn validate(&self) -> Result<(), OrbitConfigError> {
        self.pitch_limits.validate()?;
        self.sensitivity.validate()?;
        self.zoom_limits.validate()?;
        if !(self.depth_limit > 0.0 && self.depth_limit <= 1.0) {
            return Err(OrbitConfigError::DepthLimit(self.depth_limit));
        }
        if !(self.pan_limits.max_distance >= 0.0) {
            return Err(OrbitConfigError::PanDistance(self.pan_limits.max_distance));
        }
        Ok(())
    }
}

/// Range of the camera's downward pitch, in radians.
///
/// A pitch of zero looks at the horizon, positive values look down.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PitchLimits {
    /// Shallowest allowed pitch.
    pub min: f32,
    /// Steepest allowed pitch.
    pub max: f32,
}

impl Default for PitchLimits {
    fn default() -> Self {
        Self::from_degrees(20.0, 80.0)
    }
}

impl PitchLimits {
    /// Build limits from angles in degrees.
    pub fn from_degrees(min: f32, max: f32) -> Self {
        Self {
            min: min.to_radians(),
            max: max.to_radians(),
        }
    }

    /// How far `pitch` lies outside of the limits. Zero when inside.
    pub fn excess(&self, pitch: f32) -> f32 {
        (pitch - pitch.clamp(self.min, self.max)).abs()
    }

    /// Does moving from `current` to `candidate` keep the pitch in range, or at least bring it
    /// no further out of range?
    pub fn admits(&self, current: f32, candidate: f32) -> bool {
        self.excess(candidate) <= self.excess(current)
    }

    fn validate(&self) -> Result<(), OrbitConfigError> {
        for limit in [self.min, self.max] {
            if !(limit.abs() < FRAC_PI_2) {
                return Err(OrbitConfigError::PitchRange(limit));
            }
        }
        if self.min >= self.max {
            return Err(OrbitConfigError::PitchOrder {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// The sensitivity of the camera controller to inputs.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Sensitivity {
    /// Radians of rotation per pixel of drag.
    pub rotate: f32,
    /// World units of dolly per pixel of wheel delta.
    pub zoom: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            rotate: 0.1_f32.to_radians(),
            zoom: 0.1,
        }
    }
}

impl Sensitivity {
    fn validate(&self) -> Result<(), OrbitConfigError> {
        for (name, value) in [("rotate", self.rotate), ("zoom", self.zoom)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OrbitConfigError::Sensitivity { name, value });
            }
        }
        Ok(())
    }
}

/// Bound the reach of pan gestures, keeping the scene around [`OrbitSettings::origin`] in view.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PanLimits {
    /// Largest distance between [`OrbitSettings::origin`] and the ground point at the center of
    /// the view that a pan may reach. Defaults to `4.0`; use `f32::INFINITY` for unbounded pans.
    pub max_distance: f32,
}

impl Default for PanLimits {
    fn default() -> Self {
        Self { max_distance: 4.0 }
    }
}

/// How the anchor is chosen when the pointer is over the background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum AnchorCorrection {
    /// Anchor on [`OrbitSettings::origin`], and treat the gesture as if it started at the
    /// origin's position on screen.
    #[default]
    Origin,
    /// Anchor where the camera's view direction meets the ground plane, and treat the gesture as
    /// if it started at the center of the viewport.
    Center,
}

/// Controls what kinds of gestures are allowed to start.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct EnabledMotion {
    /// Should rotation be enabled?
    pub rotate: bool,
    /// Should pan be enabled?
    pub pan: bool,
    /// Should zoom be enabled?
    pub zoom: bool,
}

impl Default for EnabledMotion {
    fn default() -> Self {
        Self {
            rotate: true,
            pan: true,
            zoom: true,
        }
    }
}
