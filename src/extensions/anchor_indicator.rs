//! An extension that draws an indicator at the anchor while the camera rotates, showing users
//! what point the camera is orbiting.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use crate::controller::component::{GestureKind, OrbitCam};

/// See the [module](self) docs.
pub struct AnchorIndicatorPlugin;

impl Plugin for AnchorIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            draw_anchor.after(TransformSystem::TransformPropagate),
        )
        .register_type::<AnchorIndicator>();
    }
}

/// Optional. Configures the anchor indicator of an [`OrbitCam`]. The indicator is drawn in white
/// if this component is not present.
#[derive(Debug, Clone, Component, Reflect)]
pub struct AnchorIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
    /// Gizmo color.
    pub color: Color,
}

impl Default for AnchorIndicator {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Color::WHITE,
        }
    }
}

/// Use gizmos to draw the anchor of rotate gestures in world space.
pub fn draw_anchor(
    cameras: Query<(&OrbitCam, &GlobalTransform, Option<&AnchorIndicator>)>,
    mut gizmos: Gizmos,
) {
    for (orbit_cam, cam_transform, indicator) in &cameras {
        let indicator = indicator.cloned().unwrap_or_default();
        if !indicator.enabled || orbit_cam.gesture() != Some(GestureKind::Rotate) {
            continue;
        }
        let Some(anchor) = orbit_cam.anchor() else {
            continue;
        };

        let eye = cam_transform.translation();
        let scale = eye.distance(anchor.world) * 0.01;
        // Pull the indicator toward the camera so it doesn't clip into the surface it sits on.
        let center = anchor.world + (eye - anchor.world).normalize_or_zero() * scale;
        let offset = 1.5 * scale;
        let arm_length = 0.4 * offset;

        for direction in [
            cam_transform.left(),
            cam_transform.right(),
            cam_transform.up(),
            cam_transform.down(),
        ] {
            gizmos.ray(
                center + direction * offset,
                direction * arm_length,
                indicator.color,
            );
        }
    }
}
