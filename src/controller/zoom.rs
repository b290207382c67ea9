//! Provides [`ZoomLimits`] settings.

use bevy_math::prelude::*;
use bevy_reflect::Reflect;

use crate::error::OrbitConfigError;

/// Bound the camera height while zooming, so the camera can neither dive through the ground nor
/// fly off to infinity.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ZoomLimits {
    /// Zooming never takes the camera below this height.
    pub min_height: f32,
    /// Zooming never takes the camera above this height.
    pub max_height: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_height: 5.0,
            max_height: 20.0,
        }
    }
}

impl ZoomLimits {
    pub(crate) fn validate(&self) -> Result<(), OrbitConfigError> {
        if self.min_height > self.max_height || self.min_height.is_nan() || self.max_height.is_nan()
        {
            return Err(OrbitConfigError::ZoomOrder {
                min: self.min_height,
                max: self.max_height,
            });
        }
        Ok(())
    }

    /// Bound a zoom translation `step` of a camera at `position`.
    ///
    /// Returns `None` when the camera already sits on or past the bound the step heads toward.
    /// A step that would cross a bound is shortened so the camera lands exactly on it.
    pub fn bound_step(&self, position: Vec3, step: Vec3) -> Option<Vec3> {
        let height = position.y;
        let bound = if step.y > 0.0 {
            self.max_height
        } else if step.y < 0.0 {
            self.min_height
        } else {
            return Some(step);
        };

        let available = bound - height;
        if available * step.y <= 0.0 {
            // Already at the bound, or beyond it and heading further out.
            return None;
        }
        if step.y.abs() > available.abs() {
            Some(step * (available / step.y))
        } else {
            Some(step)
        }
    }
}
