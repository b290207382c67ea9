//! Default mouse input handling. Left button rotates, right button pans, the wheel zooms.
//!
//! Replace [`DefaultInputPlugin`] with your own system sending [`OrbitInput`] events to use other
//! bindings or input devices.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{
    mouse::{MouseButton, MouseScrollUnit, MouseWheel},
    ButtonInput, InputSystem,
};
use bevy_math::prelude::*;
use bevy_render::camera::Camera;
use bevy_window::{PrimaryWindow, Window};

use crate::controller::{
    component::{GestureKind, OrbitCam},
    OrbitAction, OrbitInput,
};

/// Wheel deltas reported in lines are scaled to pixels by this factor.
pub const PIXELS_PER_LINE: f32 = 20.0;

/// See the [module](self) docs.
pub struct DefaultInputPlugin;

impl Plugin for DefaultInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            default_orbit_inputs
                .after(InputSystem)
                .before(OrbitCam::apply_inputs),
        );
    }
}

/// The mouse button that drives a gesture.
pub fn button_for(kind: GestureKind) -> MouseButton {
    match kind {
        GestureKind::Rotate => MouseButton::Left,
        GestureKind::Pan => MouseButton::Right,
    }
}

/// Translate mouse input over the primary window into [`OrbitInput`]s for every active camera
/// with an [`OrbitCam`].
pub fn default_orbit_inputs(
    buttons: Res<ButtonInput<MouseButton>>,
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(Entity, &Camera, &OrbitCam)>,
    mut inputs: EventWriter<OrbitInput>,
) {
    let Ok(window) = windows.single() else {
        wheel.clear();
        return;
    };
    let scroll: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y * PIXELS_PER_LINE,
            MouseScrollUnit::Pixel => event.y,
        })
        .sum();
    let cursor = window.cursor_position();

    for (camera, camera_settings, controller) in &cameras {
        if !camera_settings.is_active {
            continue;
        }
        let viewport = camera_settings
            .logical_viewport_rect()
            .unwrap_or_else(|| Rect::from_corners(Vec2::ZERO, window.size()));
        let mut send = |action| {
            inputs.write(OrbitInput {
                camera,
                viewport,
                action,
            });
        };

        let Some(position) = cursor else {
            // Pointer left the window.
            if controller.is_active() {
                send(OrbitAction::End);
            }
            continue;
        };

        match controller.gesture() {
            Some(kind) if buttons.just_released(button_for(kind)) => send(OrbitAction::End),
            Some(_) => send(OrbitAction::Drag { position }),
            None if viewport.contains(position) => {
                let pressed = [GestureKind::Rotate, GestureKind::Pan]
                    .into_iter()
                    .find(|kind| buttons.just_pressed(button_for(*kind)));
                if let Some(kind) = pressed {
                    send(OrbitAction::Start { position, kind });
                }
            }
            None => {}
        }

        // Wheel up moves toward the scene.
        if scroll != 0.0 && viewport.contains(position) {
            send(OrbitAction::Zoom {
                delta_y: -scroll,
                position,
            });
        }
    }
}
