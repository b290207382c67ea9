//! Recovering the depth under the pointer.

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

/// Normalized depth of the far plane. Returned whenever no depth is known for a pixel.
pub const FAR_DEPTH: f32 = 1.0;

/// A CPU side copy of a camera's depth buffer, stored row-major, one value per pixel.
///
/// Values are normalized device depth: `0.0` on the near plane, `1.0` on the far plane. Keep this
/// component on the camera entity up to date, e.g. from a depth prepass readback, to let gestures
/// anchor on the geometry under the pointer.
#[derive(Debug, Clone, Default, PartialEq, Component, Reflect)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthBuffer {
    /// Wrap `values` laid out as `height` rows of `width` pixels.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Self {
        Self {
            width,
            height,
            values,
        }
    }

    /// A buffer with every pixel at `depth`.
    pub fn filled(width: u32, height: u32, depth: f32) -> Self {
        Self::new(width, height, vec![depth; width as usize * height as usize])
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw depth values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Replace the contents, e.g. after the viewport was resized.
    pub fn update(&mut self, width: u32, height: u32, values: Vec<f32>) {
        self.width = width;
        self.height = height;
        self.values = values;
    }

    /// Set the depth of a single pixel. Out of bounds writes are ignored.
    pub fn set(&mut self, column: u32, row: u32, depth: f32) {
        if column >= self.width || row >= self.height {
            return;
        }
        let index = row as usize * self.width as usize + column as usize;
        if let Some(value) = self.values.get_mut(index) {
            *value = depth;
        }
    }

    /// The stored depth of a pixel, if there is one.
    ///
    /// A stored zero is the buffer's "cleared" value and reads as unknown, the same as NaN.
    pub fn get(&self, column: i64, row: i64) -> Option<f32> {
        if column < 0 || row < 0 || column >= self.width as i64 || row >= self.height as i64 {
            return None;
        }
        self.values
            .get(row as usize * self.width as usize + column as usize)
            .copied()
            .filter(|depth| *depth != 0.0 && !depth.is_nan())
    }
}

/// Sample the depth under the `screen` position inside `viewport`.
///
/// Falls back to [`FAR_DEPTH`] when there is no buffer, the buffer is empty, or the pixel has no
/// depth.
pub fn sample_depth(buffer: Option<&DepthBuffer>, screen: Vec2, viewport: Rect) -> f32 {
    let Some(buffer) = buffer.filter(|buffer| !buffer.values.is_empty()) else {
        warn_once!("Camera depth buffer is empty or missing, anchoring to the far plane");
        return FAR_DEPTH;
    };
    let pixel = (screen - viewport.min).round();
    buffer
        .get(pixel.x as i64, pixel.y as i64)
        .unwrap_or(FAR_DEPTH)
}
