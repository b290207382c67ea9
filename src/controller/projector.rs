//! Conversions between viewport coordinates and world space.

use bevy_math::{prelude::*, DMat4, DVec2, DVec3};

use super::rig::CameraRig;

/// Converts between viewport positions and world space points.
///
/// Unprojection goes through a snapshot of the inverse view-projection transform taken by
/// [`Projector::refresh_snapshot`]. The snapshot is taken once per gesture, so that the mapping
/// between the screen and the world stays fixed while the gesture moves the camera.
///
/// Transforms are evaluated in double precision; a single precision inverse of a perspective
/// matrix loses about a thousandth of a pixel on a round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projector {
    world_from_clip: DMat4,
}

impl Projector {
    /// Snapshot the inverse of the rig's current view-projection.
    pub fn refresh_snapshot(&mut self, rig: &CameraRig) {
        self.world_from_clip = clip_from_world(rig).inverse();
    }

    /// The snapshot taken by the last [`Projector::refresh_snapshot`].
    pub fn world_from_clip(&self) -> DMat4 {
        self.world_from_clip
    }

    /// The world space point at normalized `depth` under the `screen` position.
    ///
    /// A `w` of zero after the transform yields non-finite components.
    pub fn unproject(&self, screen: Vec2, depth: f32, viewport: Rect) -> Vec3 {
        let ndc = viewport_to_ndc(screen, viewport);
        let world = self.world_from_clip * ndc.extend(depth as f64).extend(1.0);
        (world.truncate() * world.w.recip()).as_vec3()
    }

    /// The viewport position of a world space point, using the rig's live view-projection.
    pub fn project(rig: &CameraRig, world: Vec3, viewport: Rect) -> Vec2 {
        let clip = clip_from_world(rig) * world.as_dvec3().extend(1.0);
        let ndc = DVec2::new(clip.x, clip.y) / clip.w;
        ndc_to_viewport(ndc, viewport)
    }
}

/// The rig's live view-projection, in double precision.
fn clip_from_world(rig: &CameraRig) -> DMat4 {
    let view_from_world = DMat4::look_at_rh(
        rig.position.as_dvec3(),
        rig.target.as_dvec3(),
        DVec3::Y,
    );
    rig.clip_from_view.as_dmat4() * view_from_world
}

/// Map a viewport position to normalized device coordinates, flipping y to point up.
pub fn viewport_to_ndc(screen: Vec2, viewport: Rect) -> DVec2 {
    let relative = (screen.as_dvec2() - viewport.min.as_dvec2()) / viewport.size().as_dvec2();
    DVec2::new(2.0 * (relative.x - 0.5), -2.0 * (relative.y - 0.5))
}

/// Map normalized device coordinates back to a viewport position.
pub fn ndc_to_viewport(ndc: DVec2, viewport: Rect) -> Vec2 {
    let min = viewport.min.as_dvec2();
    let max = viewport.max.as_dvec2();
    DVec2::new(
        min.x + (ndc.x + 1.0) * 0.5 * (max.x - min.x),
        max.y - (ndc.y + 1.0) * 0.5 * (max.y - min.y),
    )
    .as_vec2()
}
