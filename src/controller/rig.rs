//! The camera pose the controller reads and writes.

use bevy_math::{prelude::*, primitives::InfinitePlane3d, Dir3, Ray3d};
use bevy_reflect::prelude::*;
use bevy_render::camera::PerspectiveProjection;

/// A look-at camera: where it is, what it looks at, and how it projects.
///
/// The up direction is always world `+Y`. `position` must never equal `target`.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraRig {
    /// Eye position in world space.
    pub position: Vec3,
    /// Look-at point in world space.
    pub target: Vec3,
    /// Projection matrix, mapping view space to clip space with a `[0, 1]` depth range.
    pub clip_from_view: Mat4,
}

impl CameraRig {
    /// Create a rig from its parts.
    pub fn new(position: Vec3, target: Vec3, clip_from_view: Mat4) -> Self {
        Self {
            position,
            target,
            clip_from_view,
        }
    }

    /// Create a rig with a finite perspective projection using the parameters of a bevy
    /// [`PerspectiveProjection`].
    ///
    /// Bevy renders with an infinite reversed-z projection. Depth buffers handed to the controller
    /// are expected in the conventional orientation instead, with the far plane at `1.0`.
    pub fn from_perspective(
        position: Vec3,
        target: Vec3,
        perspective: &PerspectiveProjection,
    ) -> Self {
        let clip_from_view = Mat4::perspective_rh(
            perspective.fov,
            perspective.aspect_ratio,
            perspective.near,
            perspective.far,
        );
        Self::new(position, target, clip_from_view)
    }

    /// Normalized view direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// World to view space transform.
    pub fn view_from_world(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// The live view-projection transform.
    pub fn clip_from_world(&self) -> Mat4 {
        self.clip_from_view * self.view_from_world()
    }

    /// Move both the eye and the look-at point.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.target += offset;
    }
}

/// Where a ray starting at `origin` heading along `direction` meets the horizontal plane at
/// `height`. `None` if the ray is degenerate, parallel to the plane, or points away from it.
pub fn intersect_horizontal(origin: Vec3, direction: Vec3, height: f32) -> Option<Vec3> {
    let direction = Dir3::new(direction).ok()?;
    let ray = Ray3d::new(origin, direction);
    let plane = InfinitePlane3d { normal: Dir3::Y };
    ray.intersect_plane(Vec3::Y * height, plane)
        .map(|distance| ray.get_point(distance))
}
