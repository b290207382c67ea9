//! The primary [`Component`] of the controller, [`OrbitCam`].

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{
    balancer::{self, Balancer},
    depth::{self, DepthBuffer},
    projector::Projector,
    rig::{self, CameraRig},
    settings::{AnchorCorrection, OrbitSettings},
    OrbitAction, OrbitInput,
};
use crate::error::OrbitConfigError;

/// Wheel re-anchoring only happens once the pointer moved further than this, in pixels.
const REANCHOR_EPSILON: f32 = 0.01;

/// The kind of motion a pointer gesture drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GestureKind {
    /// Orbit the camera around the anchor.
    Rotate,
    /// Drag the ground plane at the anchor's height under the pointer.
    Pan,
}

/// Where a gesture is anchored. Captured once, when the gesture (or a wheel re-anchor) starts,
/// and left untouched until the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// The world space point the gesture pivots around.
    pub world: Vec3,
    /// The pointer position the gesture is measured from, after any correction.
    pub screen: Vec2,
    /// Offset added to every raw pointer position of this gesture. Non-zero when the anchor was
    /// moved off the pointer because there was nothing under it.
    pub screen_shift: Vec2,
    /// The depth sampled under the pointer.
    pub depth: f32,
    /// Was the sampled point replaced by the fallback strategy?
    pub corrected: bool,
    /// Height of the ground plane pans slide along.
    pub plane_height: f32,
    /// Camera position when anchored. Pan rays are cast from here.
    pub ray_origin: Vec3,
    /// Normalized direction from [`Self::ray_origin`] to [`Self::world`]. Zoom moves along it.
    pub ray_direction: Vec3,
    /// Where the camera's view direction met the ground plane through the reference origin.
    pub look_point: Vec3,
    /// Camera position relative to the anchor.
    pub camera_offset: Vec3,
    /// Camera target relative to the anchor.
    pub target_offset: Vec3,
    /// Elevation of the view direction, in radians. Negative when looking down.
    pub elevation: f32,
    /// Rotation from `-Z` to the camera's view direction projected on the ground. Rotations are
    /// composed in this frame so they stay relative to the camera.
    pub yaw_reference: Quat,
}

/// Tracks all state of a camera's controller: its settings, the active gesture, and where that
/// gesture is anchored.
///
/// # Moving the Camera
///
/// With [`DefaultOrbitCamPlugins`](crate::DefaultOrbitCamPlugins), mouse input is translated into
/// [`OrbitInput`] events automatically. Any other input source can send those events, or drive
/// the controller directly against a [`CameraRig`]:
///
/// 1. Start a gesture with [`OrbitCam::start_gesture`].
/// 2. While the gesture is active, send pointer positions with [`OrbitCam::drag`]. Wheel input
///    goes to [`OrbitCam::zoom`], with or without an active gesture.
/// 3. When the gesture should end, call [`OrbitCam::end_gesture`].
///
/// Angles and pan travel are measured from the start of the current gesture. Whatever pose a
/// gesture leaves the camera in becomes the baseline of the next one.
#[derive(Debug, Clone, Reflect, Component)]
pub struct OrbitCam {
    settings: OrbitSettings,
    /// The point the camera looks at. Managed by the controller, though you will want to set
    /// this when spawning or manually moving the camera.
    pub target: Vec3,
    gesture: Option<GestureKind>,
    theta: f32,
    phi: f32,
    travel: Vec3,
    #[reflect(ignore)]
    anchor: Option<Anchor>,
    #[reflect(ignore)]
    zoom_position: Option<Vec2>,
    #[reflect(ignore)]
    projector: Projector,
    #[reflect(ignore)]
    balancer: Balancer,
}

impl Default for OrbitCam {
    fn default() -> Self {
        Self {
            settings: Default::default(),
            target: Vec3::ZERO,
            gesture: None,
            theta: 0.0,
            phi: 0.0,
            travel: Vec3::ZERO,
            anchor: None,
            zoom_position: None,
            projector: Default::default(),
            balancer: Default::default(),
        }
    }
}

impl OrbitCam {
    /// Create a controller, rejecting settings that would make interaction undefined.
    pub fn new(settings: OrbitSettings) -> Result<Self, OrbitConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Default::default()
        })
    }

    /// Set the point the camera initially looks at.
    #[must_use = "with_target returns a modified OrbitCam"]
    pub fn with_target(self, target: Vec3) -> Self {
        Self { target, ..self }
    }

    /// The validated settings.
    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// The active gesture, if any.
    pub fn gesture(&self) -> Option<GestureKind> {
        self.gesture
    }

    /// Is a pointer gesture in progress?
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// The most recent anchor, if it is still in use.
    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Yaw of the current gesture around world up, in radians.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Pitch of the current gesture around the camera's right axis, in radians.
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Pan translation of the current gesture.
    pub fn travel(&self) -> Vec3 {
        self.travel
    }

    /// Downward pitch of the camera implied by the current gesture, in radians.
    pub fn pitch(&self) -> Option<f32> {
        self.anchor.map(|anchor| pitch_from(anchor.elevation, self.phi))
    }

    /// Call this to start a gesture at the pointer `position`. Returns false if this kind of
    /// gesture is disabled. See [`OrbitCam`] for usage.
    pub fn start_gesture(
        &mut self,
        rig: &CameraRig,
        viewport: Rect,
        depth: Option<&DepthBuffer>,
        position: Vec2,
        kind: GestureKind,
    ) -> bool {
        let enabled = match kind {
            GestureKind::Rotate => self.settings.enabled_motion.rotate,
            GestureKind::Pan => self.settings.enabled_motion.pan,
        };
        if !enabled {
            return false;
        }
        self.gesture = Some(kind);
        let anchor = self.anchor_at(rig, viewport, depth, position);
        self.balancer.seed(anchor.screen);
        true
    }

    /// Send a pointer position of the active gesture. Returns true if the rig was moved.
    pub fn drag(&mut self, rig: &mut CameraRig, viewport: Rect, position: Vec2) -> bool {
        let (Some(kind), Some(anchor)) = (self.gesture, self.anchor) else {
            return false;
        };
        let raw = position + anchor.screen_shift;

        match kind {
            GestureKind::Rotate => {
                let limits = self.settings.pitch_limits;
                let sensitivity = self.settings.sensitivity.rotate;
                let pitch_at = |balanced: Vec2| {
                    let phi = -(balanced.y - anchor.screen.y) * sensitivity;
                    pitch_from(anchor.elevation, phi)
                };
                let current = pitch_at(self.balancer.balanced());
                let balanced = self.balancer.balance(
                    raw,
                    |candidate| limits.admits(current, pitch_at(candidate)),
                    balancer::reverses,
                );

                let travel = balanced - anchor.screen;
                self.theta = -travel.x * sensitivity;
                self.phi = -travel.y * sensitivity;
            }
            GestureKind::Pan => {
                let max_distance = self.settings.pan_limits.max_distance;
                let origin = self.settings.origin;
                let projector = &self.projector;
                let reach = |travel: Vec3| (anchor.look_point + travel - origin).length();
                let current = reach(self.travel);
                let balanced = self.balancer.balance(
                    raw,
                    |candidate| {
                        pan_travel(projector, &anchor, candidate, viewport).is_none_or(|travel| {
                            let candidate_reach = reach(travel);
                            candidate_reach <= max_distance || candidate_reach <= current
                        })
                    },
                    balancer::reverses,
                );

                // Pointer above the horizon, keep the last travel.
                if let Some(travel) = pan_travel(&self.projector, &anchor, balanced, viewport) {
                    self.travel = travel;
                }
            }
        }

        self.apply_transformations(rig, &anchor);
        true
    }

    /// Send a wheel input. Positive `delta_y` zooms out, negative zooms in. Returns true if the
    /// rig was moved.
    ///
    /// The camera and its target slide along the ray toward the point under the pointer. Moving
    /// the pointer between wheel inputs re-anchors on the new point under it, and so does zooming
    /// once the active gesture has rotated or panned the camera.
    pub fn zoom(
        &mut self,
        rig: &mut CameraRig,
        viewport: Rect,
        depth: Option<&DepthBuffer>,
        delta_y: f32,
        position: Vec2,
    ) -> bool {
        if !self.settings.enabled_motion.zoom {
            return false;
        }

        // Offsets and the ray are only valid for the pose the anchor was taken in.
        let posed = self.theta != 0.0 || self.phi != 0.0 || self.travel != Vec3::ZERO;
        let moved = self
            .zoom_position
            .is_none_or(|last| last.distance(position) > REANCHOR_EPSILON);
        let anchor = match self.anchor.filter(|_| !moved && !posed) {
            Some(anchor) => anchor,
            None => {
                let anchor = self.anchor_at(rig, viewport, depth, position);
                self.zoom_position = Some(position);
                if self.gesture.is_some() {
                    self.balancer.seed(anchor.screen);
                }
                anchor
            }
        };

        let step = anchor.ray_direction * (-delta_y * self.settings.sensitivity.zoom);
        let Some(step) = self.settings.zoom_limits.bound_step(rig.position, step) else {
            return false;
        };
        rig.translate(step);

        // The camera slid along the ray through the anchor, so the anchor keeps its place on
        // screen. Carry the pose over so later drags of this gesture keep the zoom.
        let origin = self.settings.origin;
        if let Some(anchor) = &mut self.anchor {
            anchor.ray_origin += step;
            anchor.camera_offset += step;
            anchor.target_offset += step;
            anchor.look_point = rig::intersect_horizontal(rig.position, rig.forward(), origin.y)
                .unwrap_or(origin);
        }
        self.projector.refresh_snapshot(rig);
        step != Vec3::ZERO
    }

    /// End the current gesture. See [`OrbitCam`] for usage.
    pub fn end_gesture(&mut self) {
        self.gesture = None;
        self.theta = 0.0;
        self.phi = 0.0;
        self.travel = Vec3::ZERO;
        self.anchor = None;
        self.zoom_position = None;
        self.balancer.reset();
    }

    /// Discard all gesture state.
    pub fn dispose(&mut self) {
        self.end_gesture();
        self.projector = Projector::default();
    }

    /// Route an [`OrbitAction`] to the matching operation. Returns true if the rig was moved.
    pub fn handle(
        &mut self,
        rig: &mut CameraRig,
        viewport: Rect,
        depth: Option<&DepthBuffer>,
        action: OrbitAction,
    ) -> bool {
        match action {
            OrbitAction::Start { position, kind } => {
                self.start_gesture(rig, viewport, depth, position, kind);
                false
            }
            OrbitAction::Drag { position } => self.drag(rig, viewport, position),
            OrbitAction::Zoom { delta_y, position } => {
                self.zoom(rig, viewport, depth, delta_y, position)
            }
            OrbitAction::End => {
                self.end_gesture();
                false
            }
            OrbitAction::Dispose => {
                self.dispose();
                false
            }
        }
    }

    /// Resolve the anchor under `position` and make it the current one. Resets the gesture's
    /// angles and travel, since they are measured from the anchor.
    fn anchor_at(
        &mut self,
        rig: &CameraRig,
        viewport: Rect,
        depth: Option<&DepthBuffer>,
        position: Vec2,
    ) -> Anchor {
        self.theta = 0.0;
        self.phi = 0.0;
        self.travel = Vec3::ZERO;
        self.zoom_position = None;

        let origin = self.settings.origin;
        let forward = rig.forward();
        let look_point =
            rig::intersect_horizontal(rig.position, forward, origin.y).unwrap_or(origin);

        let sampled = depth::sample_depth(depth, position, viewport);
        self.projector.refresh_snapshot(rig);
        let mut world = self.projector.unproject(position, sampled, viewport);
        let mut screen = position;
        let mut plane_height = world.y;

        let corrected = sampled > self.settings.depth_limit;
        if corrected {
            // Nothing under the pointer, don't orbit around a point on the far plane.
            plane_height = origin.y;
            (world, screen) = match self.settings.anchor_correction {
                AnchorCorrection::Origin => (origin, Projector::project(rig, origin, viewport)),
                AnchorCorrection::Center => (look_point, viewport.center()),
            };
        }

        let ground = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let yaw_reference = if ground == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_rotation_arc(Vec3::NEG_Z, ground)
        };

        let anchor = Anchor {
            world,
            screen,
            screen_shift: screen - position,
            depth: sampled,
            corrected,
            plane_height,
            ray_origin: rig.position,
            ray_direction: (world - rig.position).normalize_or_zero(),
            look_point,
            camera_offset: rig.position - world,
            target_offset: rig.target - world,
            elevation: forward.y.clamp(-1.0, 1.0).asin(),
            yaw_reference,
        };
        debug!(
            "Anchored at {} (depth {sampled}, corrected: {corrected})",
            anchor.world
        );
        self.anchor = Some(anchor);
        anchor
    }

    /// Rebuild the camera pose from the anchor, the gesture angles, and the pan travel.
    fn apply_transformations(&self, rig: &mut CameraRig, anchor: &Anchor) {
        let rotation = anchor.yaw_reference
            * Quat::from_rotation_y(self.theta)
            * Quat::from_rotation_x(self.phi)
            * anchor.yaw_reference.conjugate();
        let pivot = anchor.world + self.travel;
        rig.position = pivot + rotation * anchor.camera_offset;
        rig.target = pivot + rotation * anchor.target_offset;
    }

    /// Apply [`OrbitInput`] events to their cameras. Runs once per frame.
    pub fn apply_inputs(
        mut inputs: EventReader<OrbitInput>,
        mut cameras: Query<(
            &mut OrbitCam,
            &mut Transform,
            &Projection,
            Option<&DepthBuffer>,
        )>,
        mut redraw: EventWriter<RequestRedraw>,
    ) {
        for input in inputs.read() {
            let Ok((mut controller, mut transform, projection, depth)) =
                cameras.get_mut(input.camera)
            else {
                continue;
            };
            let Projection::Perspective(perspective) = projection else {
                error_once!("Only perspective projections are supported.");
                continue;
            };

            let mut rig =
                CameraRig::from_perspective(transform.translation, controller.target, perspective);
            if controller.handle(&mut rig, input.viewport, depth, input.action) {
                transform.translation = rig.position;
                transform.look_at(rig.target, Vec3::Y);
                controller.target = rig.target;
                redraw.write(RequestRedraw);
            }
        }
    }
}

/// Downward pitch given the view elevation at the start of a gesture and the gesture's `phi`.
fn pitch_from(elevation: f32, phi: f32) -> f32 {
    -(elevation + phi)
}

/// The pan travel that keeps the anchor's ground plane under `screen`. `None` if the pointer
/// ray does not meet the plane.
fn pan_travel(
    projector: &Projector,
    anchor: &Anchor,
    screen: Vec2,
    viewport: Rect,
) -> Option<Vec3> {
    let near = projector.unproject(screen, 0.0, viewport);
    let hit = rig::intersect_horizontal(
        anchor.ray_origin,
        near - anchor.ray_origin,
        anchor.plane_height,
    )?;
    Some(anchor.world - hit)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::controller::settings::{EnabledMotion, PanLimits, PitchLimits};

    fn rig() -> CameraRig {
        CameraRig::new(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::ZERO,
            Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 1.0, 100.0),
        )
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn center_depth() -> DepthBuffer {
        let mut buffer = DepthBuffer::filled(800, 600, 0.0);
        buffer.set(400, 300, 0.5);
        buffer
    }

    fn camera_pitch(rig: &CameraRig) -> f32 {
        -rig.forward().y.asin()
    }

    #[test]
    fn rotate_scenario() {
        let mut rig = rig();
        let depth = center_depth();
        let mut cam = OrbitCam::default();

        assert!(cam.start_gesture(
            &rig,
            viewport(),
            Some(&depth),
            Vec2::new(400.0, 300.0),
            GestureKind::Rotate
        ));
        let anchor = *cam.anchor().unwrap();
        assert!(!anchor.corrected);
        assert_eq!(anchor.depth, 0.5);

        assert!(cam.drag(&mut rig, viewport(), Vec2::new(450.0, 300.0)));
        assert!((cam.theta().to_degrees() + 5.0).abs() < 1e-4);
        assert_eq!(cam.phi(), 0.0);

        let radius = (rig.position - anchor.world).length();
        assert!((radius - anchor.camera_offset.length()).abs() < 1e-5);
    }

    #[test]
    fn pan_scenario() {
        let mut rig = rig();
        let start = rig;
        let depth = center_depth();
        let mut cam = OrbitCam::default();

        cam.start_gesture(
            &rig,
            viewport(),
            Some(&depth),
            Vec2::new(400.0, 300.0),
            GestureKind::Pan,
        );
        assert!(cam.drag(&mut rig, viewport(), Vec2::new(400.0, 350.0)));

        let moved_position = rig.position - start.position;
        let moved_target = rig.target - start.target;
        assert!(moved_position.length() > 1e-4);
        assert!(moved_position.distance(moved_target) < 1e-4);
        assert!(cam.travel().y.abs() < 1e-5);
    }

    #[test]
    fn anchor_stays_under_pointer_while_rotating() {
        let mut rig = rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();
        let start = Vec2::new(520.0, 260.0);

        cam.start_gesture(&rig, viewport(), Some(&depth), start, GestureKind::Rotate);
        let anchor = *cam.anchor().unwrap();
        let on_screen = Projector::project(&rig, anchor.world, viewport());
        assert!(on_screen.distance(start) < 1e-2);

        for (dx, dy) in [(10.0, 0.0), (40.0, 15.0), (-30.0, 30.0), (-80.0, -20.0), (5.0, 60.0)] {
            cam.drag(&mut rig, viewport(), start + Vec2::new(dx, dy));
            let pitch = cam.pitch().unwrap();
            let limits = cam.settings().pitch_limits;
            assert!(pitch >= limits.min && pitch <= limits.max);
            let on_screen = Projector::project(&rig, anchor.world, viewport());
            assert!(
                on_screen.distance(start) < 1e-2,
                "anchor drifted to {on_screen}"
            );
        }
    }

    #[test]
    fn pitch_stays_clamped_on_dense_drag_paths() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut rig = rig();
        let mut cam = OrbitCam::default();
        let limits = cam.settings().pitch_limits;
        let sensitivity = cam.settings().sensitivity.rotate;
        let tolerance = 1e-3;

        let mut pointer = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), None, pointer, GestureKind::Rotate);
        let mut last_pitch = camera_pitch(&rig);

        // Sweep well past the steep limit, then back past the shallow one, then wander.
        let mut steps: Vec<Vec2> = Vec::new();
        steps.extend(std::iter::repeat(Vec2::new(0.0, 7.0)).take(150));
        steps.extend(std::iter::repeat(Vec2::new(1.0, -9.0)).take(200));
        steps.extend((0..600).map(|_| {
            Vec2::new(rng.gen_range(-12.0..12.0), rng.gen_range(-15.0..15.0))
        }));

        for (index, step) in steps.into_iter().enumerate() {
            pointer += step;
            cam.drag(&mut rig, viewport(), pointer);
            let pitch = camera_pitch(&rig);

            assert!(
                pitch >= limits.min - tolerance && pitch <= limits.max + tolerance,
                "pitch {} out of range at step {index}",
                pitch.to_degrees()
            );
            assert!(
                (pitch - last_pitch).abs() <= step.y.abs() * sensitivity + tolerance,
                "pitch jumped at step {index}"
            );
            // On the way back up, pitch never increases.
            if (150..350).contains(&index) {
                assert!(pitch <= last_pitch + tolerance);
            }
            last_pitch = pitch;
        }
    }

    #[test]
    fn leaves_the_limit_as_soon_as_the_drag_reverses() {
        let mut rig = rig();
        let mut cam = OrbitCam::default();
        let limits = cam.settings().pitch_limits;
        let mut pointer = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), None, pointer, GestureKind::Rotate);

        for _ in 0..200 {
            pointer.y += 10.0;
            cam.drag(&mut rig, viewport(), pointer);
        }
        let pinned = cam.pitch().unwrap();
        assert!((pinned - limits.max).abs() < 0.1f32.to_radians() * 10.0);

        pointer.y -= 10.0;
        cam.drag(&mut rig, viewport(), pointer);
        assert!(cam.pitch().unwrap() < pinned);
    }

    #[test]
    fn background_anchors_on_origin() {
        let rig = rig();
        let mut cam = OrbitCam::default();
        let start = Vec2::new(100.0, 120.0);

        cam.start_gesture(&rig, viewport(), None, start, GestureKind::Rotate);
        let anchor = cam.anchor().unwrap();
        assert!(anchor.corrected);
        assert_eq!(anchor.depth, 1.0);
        assert_eq!(anchor.world, Vec3::ZERO);
        assert!(anchor.screen.distance(Vec2::new(400.0, 300.0)) < 1e-2);
        assert!((start + anchor.screen_shift).distance(anchor.screen) < 1e-4);
    }

    #[test]
    fn background_anchors_on_view_center() {
        let rig = CameraRig::new(
            Vec3::new(1.0, 6.0, 4.0),
            Vec3::new(2.0, 0.0, -3.0),
            Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 0.1, 100.0),
        );
        let mut cam = OrbitCam::new(OrbitSettings {
            anchor_correction: AnchorCorrection::Center,
            ..Default::default()
        })
        .unwrap();

        let start = Vec2::new(700.0, 50.0);
        cam.start_gesture(&rig, viewport(), None, start, GestureKind::Pan);
        let anchor = cam.anchor().unwrap();
        assert!(anchor.world.distance(Vec3::new(2.0, 0.0, -3.0)) < 1e-4);
        assert_eq!(anchor.screen, Vec2::new(400.0, 300.0));
        assert_eq!(anchor.plane_height, 0.0);
    }

    #[test]
    fn pan_reach_is_bounded() {
        let mut rig = rig();
        let mut cam = OrbitCam::new(OrbitSettings {
            pan_limits: PanLimits { max_distance: 1.0 },
            ..Default::default()
        })
        .unwrap();

        let mut pointer = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), None, pointer, GestureKind::Pan);
        for _ in 0..60 {
            pointer += Vec2::new(3.0, 5.0);
            cam.drag(&mut rig, viewport(), pointer);
            let look = rig::intersect_horizontal(rig.position, rig.forward(), 0.0).unwrap();
            assert!(look.length() <= 1.0 + 1e-3);
        }
        assert!(cam.travel().length() > 0.5);
    }

    #[test]
    fn zoom_moves_toward_the_point_under_the_pointer() {
        let mut rig = rig();
        let start = rig;
        let mut cam = OrbitCam::default();

        let pointer = Vec2::new(400.0, 300.0);
        assert!(cam.zoom(&mut rig, viewport(), None, 20.0, pointer));
        let anchor = *cam.anchor().unwrap();
        let moved = rig.position - start.position;
        // Zooming out moves away from the origin anchor, along the view ray.
        assert!(moved.normalize().distance(-anchor.ray_direction) < 1e-4);
        assert!((moved.length() - 2.0).abs() < 1e-4);
        assert!(moved.distance(rig.target - start.target) < 1e-5);

        // Same pointer position, same anchor. The ray origin follows the camera.
        cam.zoom(&mut rig, viewport(), None, 10.0, pointer);
        let reused = cam.anchor().unwrap();
        assert_eq!(reused.world, anchor.world);
        assert_eq!(reused.ray_direction, anchor.ray_direction);
        assert!(reused.ray_origin.distance(rig.position) < 1e-5);
    }

    fn raised_rig() -> CameraRig {
        CameraRig::new(
            Vec3::new(0.0, 10.0, 12.0),
            Vec3::ZERO,
            Mat4::perspective_rh(45f32.to_radians(), 800.0 / 600.0, 1.0, 100.0),
        )
    }

    /// Direction of the view ray under `pointer` for the rig's current pose.
    fn ray_under(rig: &CameraRig, pointer: Vec2) -> Vec3 {
        let mut projector = Projector::default();
        projector.refresh_snapshot(rig);
        (projector.unproject(pointer, 0.5, viewport()) - rig.position).normalize()
    }

    #[test]
    fn zoom_while_rotating_follows_the_current_pose() {
        let mut rig = raised_rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();
        let pointer = Vec2::new(400.0, 300.0);

        // An earlier wheel input at the same spot must not leak into the gesture.
        cam.zoom(&mut rig, viewport(), Some(&depth), -10.0, pointer);
        let start = Vec2::new(600.0, 300.0);
        cam.start_gesture(&rig, viewport(), Some(&depth), start, GestureKind::Rotate);
        cam.drag(&mut rig, viewport(), pointer);
        assert!(cam.theta().abs() > 0.1);

        let before = rig;
        assert!(cam.zoom(&mut rig, viewport(), Some(&depth), -5.0, pointer));
        let direction = (rig.position - before.position).normalize();
        assert!(direction.distance(ray_under(&before, pointer)) < 1e-3);
        assert_eq!(cam.theta(), 0.0);

        // Holding still after the zoom keeps the pose.
        let zoomed = rig;
        cam.drag(&mut rig, viewport(), pointer);
        assert!(rig.position.distance(zoomed.position) < 1e-4);
        assert!(rig.target.distance(zoomed.target) < 1e-4);

        // Rotating on pivots around the new anchor.
        let anchor = *cam.anchor().unwrap();
        cam.drag(&mut rig, viewport(), pointer + Vec2::new(40.0, 25.0));
        let on_screen = Projector::project(&rig, anchor.world, viewport());
        assert!(
            on_screen.distance(anchor.screen) < 1e-2,
            "anchor drifted to {on_screen}"
        );
    }

    #[test]
    fn zoom_after_overflowing_a_pitch_limit_reanchors() {
        let mut rig = raised_rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();
        let pointer = Vec2::new(400.0, 300.0);

        cam.start_gesture(&rig, viewport(), Some(&depth), pointer, GestureKind::Rotate);
        cam.drag(&mut rig, viewport(), pointer + Vec2::new(0.0, -400.0));
        cam.drag(&mut rig, viewport(), pointer);
        assert!(cam.phi() != 0.0);

        let before = rig;
        assert!(cam.zoom(&mut rig, viewport(), Some(&depth), -5.0, pointer));
        let direction = (rig.position - before.position).normalize();
        assert!(direction.distance(ray_under(&before, pointer)) < 1e-3);

        let zoomed = rig;
        cam.drag(&mut rig, viewport(), pointer);
        assert!(rig.position.distance(zoomed.position) < 1e-4);
    }

    #[test]
    fn zoom_while_panning_keeps_the_ground_under_the_pointer() {
        let mut rig = raised_rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();
        let pointer = Vec2::new(380.0, 320.0);

        cam.start_gesture(&rig, viewport(), Some(&depth), pointer, GestureKind::Pan);
        let anchor = *cam.anchor().unwrap();
        // The first wheel input anchors, the second one reuses that anchor.
        for _ in 0..2 {
            let before = rig;
            assert!(cam.zoom(&mut rig, viewport(), Some(&depth), -3.0, pointer));
            let direction = (rig.position - before.position).normalize();
            assert!(direction.distance(ray_under(&before, pointer)) < 1e-3);
            assert_eq!(cam.anchor().unwrap().world, anchor.world);
        }

        let zoomed = rig;
        cam.drag(&mut rig, viewport(), pointer);
        assert!(rig.position.distance(zoomed.position) < 1e-4);
        assert!(rig.target.distance(zoomed.target) < 1e-4);

        let grabbed = Vec2::new(420.0, 350.0);
        cam.drag(&mut rig, viewport(), grabbed);
        let on_screen = Projector::project(&rig, anchor.world, viewport());
        assert!(
            on_screen.distance(grabbed) < 1e-2,
            "ground slipped to {on_screen}"
        );
    }

    #[test]
    fn zoom_keeps_height_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut rig = rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();
        let limits = cam.settings().zoom_limits.clone();

        for _ in 0..400 {
            let delta = if rng.gen_bool(0.5) { 40.0 } else { -40.0 };
            let position = Vec2::new(rng.gen_range(300.0..500.0), rng.gen_range(250.0..350.0));
            let buffer = rng.gen_bool(0.5).then_some(&depth);
            cam.zoom(&mut rig, viewport(), buffer, delta, position);
            assert!(rig.position.y >= limits.min_height - 1e-4);
            assert!(rig.position.y <= limits.max_height + 1e-4);
        }
    }

    #[test]
    fn drag_without_gesture_is_ignored() {
        let mut rig = rig();
        let start = rig;
        let mut cam = OrbitCam::default();
        assert!(!cam.drag(&mut rig, viewport(), Vec2::new(10.0, 10.0)));

        let pointer = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), None, pointer, GestureKind::Rotate);
        cam.end_gesture();
        assert!(!cam.is_active());
        assert!(!cam.drag(&mut rig, viewport(), Vec2::new(10.0, 10.0)));
        assert_eq!(rig, start);
    }

    #[test]
    fn gestures_start_from_the_last_pose() {
        let mut rig = rig();
        let depth = DepthBuffer::filled(800, 600, 0.5);
        let mut cam = OrbitCam::default();

        let first = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), Some(&depth), first, GestureKind::Rotate);
        cam.drag(&mut rig, viewport(), Vec2::new(500.0, 320.0));
        cam.end_gesture();
        let after_first = rig;

        let second = Vec2::new(380.0, 310.0);
        cam.start_gesture(&rig, viewport(), Some(&depth), second, GestureKind::Rotate);
        assert_eq!(cam.theta(), 0.0);
        cam.drag(&mut rig, viewport(), second);
        assert!(rig.position.distance(after_first.position) < 1e-4);
        assert!(rig.target.distance(after_first.target) < 1e-4);
    }

    #[test]
    fn disabled_motion_does_not_start() {
        let mut rig = rig();
        let start = rig;
        let mut cam = OrbitCam::new(OrbitSettings {
            enabled_motion: EnabledMotion {
                rotate: false,
                pan: true,
                zoom: false,
            },
            ..Default::default()
        })
        .unwrap();

        let rotate = cam.start_gesture(&rig, viewport(), None, Vec2::ZERO, GestureKind::Rotate);
        assert!(!rotate);
        assert!(!cam.is_active());
        assert!(!cam.zoom(&mut rig, viewport(), None, 10.0, Vec2::ZERO));
        assert_eq!(rig, start);
        let pan = cam.start_gesture(&rig, viewport(), None, Vec2::ZERO, GestureKind::Pan);
        assert!(pan);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let result = OrbitCam::new(OrbitSettings {
            pitch_limits: PitchLimits::from_degrees(70.0, 10.0),
            ..Default::default()
        });
        assert!(matches!(result, Err(OrbitConfigError::PitchOrder { .. })));
    }

    #[test]
    fn dispose_discards_gesture_state() {
        let mut rig = rig();
        let mut cam = OrbitCam::default();
        let pointer = Vec2::new(400.0, 300.0);
        cam.start_gesture(&rig, viewport(), None, pointer, GestureKind::Pan);
        cam.drag(&mut rig, viewport(), Vec2::new(420.0, 330.0));
        cam.handle(&mut rig, viewport(), None, OrbitAction::Dispose);
        assert!(!cam.is_active());
        assert!(cam.anchor().is_none());
        assert_eq!(cam.travel(), Vec3::ZERO);
    }
}
