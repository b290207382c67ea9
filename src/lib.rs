//! A camera controller that orbits, pans, and zooms around the 3D point under the pointer.
//!
//! Instead of pivoting about an abstract focus point, every gesture samples the depth under the
//! cursor, unprojects it into the world, and uses that point as the gesture's anchor. Rotation
//! happens around the anchor, panning drags the ground plane under the cursor, and zooming dollies
//! toward whatever the cursor points at.
//!
//! # Getting started
//!
//! 1. Add [`DefaultOrbitCamPlugins`] to your app.
//! 2. Add an [`OrbitCam`](crate::controller::component::OrbitCam) to a 3d camera with a
//!    perspective projection.
//! 3. Optionally keep a [`DepthBuffer`](crate::controller::depth::DepthBuffer) on the same entity
//!    up to date. Without one, every gesture anchors with the configured fallback strategy.

pub mod controller;
pub mod error;
pub mod extensions;
pub mod input;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::*,
            depth::DepthBuffer,
            rig::CameraRig,
            settings::*,
            zoom::ZoomLimits,
            MinimalOrbitCamPlugin, OrbitAction, OrbitInput,
        },
        error::OrbitConfigError,
        input::DefaultInputPlugin,
        DefaultOrbitCamPlugins,
    };
}

use bevy_app::{PluginGroup, PluginGroupBuilder};

/// Adds [`MinimalOrbitCamPlugin`](controller::MinimalOrbitCamPlugin), mouse input handling, and
/// the enabled extensions.
pub struct DefaultOrbitCamPlugins;

impl PluginGroup for DefaultOrbitCamPlugins {
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(input::DefaultInputPlugin)
            .add(controller::MinimalOrbitCamPlugin);

        #[cfg(feature = "extension_anchor_indicator")]
        let group = group.add(extensions::anchor_indicator::AnchorIndicatorPlugin);

        group
    }
}
