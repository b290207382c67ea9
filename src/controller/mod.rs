//! The camera controller: depth sampling, projection, and the gesture state machine.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_math::prelude::*;
use bevy_window::RequestRedraw;

pub mod balancer;
pub mod component;
pub mod depth;
pub mod projector;
pub mod rig;
pub mod settings;
pub mod zoom;

use component::{GestureKind, OrbitCam};

/// Adds the camera controller without any input handling. Send [`OrbitInput`] events to move
/// cameras with an [`OrbitCam`].
pub struct MinimalOrbitCamPlugin;

impl Plugin for MinimalOrbitCamPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<OrbitInput>()
            .add_event::<RequestRedraw>()
            .add_systems(PreUpdate, OrbitCam::apply_inputs)
            .register_type::<OrbitCam>()
            .register_type::<depth::DepthBuffer>()
            .register_type::<settings::OrbitSettings>();
    }
}

/// A pointer input for the [`OrbitCam`] on `camera`.
#[derive(Debug, Clone, Copy, PartialEq, Event)]
pub struct OrbitInput {
    /// The camera entity this input is meant for.
    pub camera: Entity,
    /// The camera's viewport in logical pixels, in the same space as the pointer positions.
    pub viewport: Rect,
    /// What happened.
    pub action: OrbitAction,
}

/// Pointer actions understood by [`OrbitCam`]. Positions are logical pixels, with the origin at
/// the top left corner of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitAction {
    /// A button was pressed, starting a gesture.
    Start {
        /// Pointer position.
        position: Vec2,
        /// The motion the gesture drives.
        kind: GestureKind,
    },
    /// The pointer moved during a gesture.
    Drag {
        /// Pointer position.
        position: Vec2,
    },
    /// The wheel turned. Positive values zoom out.
    Zoom {
        /// Wheel delta in pixels.
        delta_y: f32,
        /// Pointer position.
        position: Vec2,
    },
    /// The gesture's button was released, or the pointer was lost.
    End,
    /// The controller is being torn down, discard all state.
    Dispose,
}
