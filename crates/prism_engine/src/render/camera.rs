//! First-person camera with derived view/projection matrices
//!
//! The camera is a continuous-update object: input processing mutates
//! position and yaw/pitch every frame, and the front/right/up basis is
//! recomputed whenever yaw or pitch change, so it is never stale. The only
//! discrete state is the "first cursor sample after lock" flag, which
//! swallows the initial delta so engaging mouse look never causes a spurious
//! view jump.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec2, Vec3};
use crate::input::{CameraBindings, InputState, MouseButton};

/// Pitch is clamped short of straight up/down to avoid the gimbal
/// singularity where front becomes collinear with world up.
const PITCH_LIMIT_DEGREES: f32 = 89.0;

const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Which projection the camera produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    /// Perspective projection from fov/near/far and viewport aspect ratio
    Perspective,
    /// Orthographic projection in scaled viewport units.
    ///
    /// The origin sits at the viewport corner rather than centered; this is
    /// the fixed contract for 2D/UI camera usage, not an oversight.
    Orthographic {
        /// World units per viewport pixel
        scale: f32,
    },
}

/// 3D camera driven by keyboard movement and mouse look
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    /// Vertical field of view in degrees (perspective mode)
    pub fov_degrees: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
    /// Movement speed in units per second
    pub movement_speed: f32,
    /// Mouse look sensitivity in degrees per cursor pixel
    pub mouse_sensitivity: f32,
    /// Active projection mode
    pub projection_mode: ProjectionMode,
    /// Rebindable movement keys
    pub bindings: CameraBindings,
    last_cursor: Vec2,
    awaiting_first_sample: bool,
}

impl Default for Camera {
    fn default() -> Self {
        // Yaw of -90 looks down -Z with the yaw convention below.
        Self::new(Vec3::zeros(), -90.0, 0.0)
    }
}

impl Camera {
    /// Create a camera at a position with the given yaw/pitch in degrees
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch: utils::clamp(pitch, -PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES),
            front: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: WORLD_UP,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            movement_speed: 5.0,
            mouse_sensitivity: 0.1,
            projection_mode: ProjectionMode::Perspective,
            bindings: CameraBindings::default(),
            last_cursor: Vec2::zeros(),
            awaiting_first_sample: true,
        };
        camera.update_basis();
        camera
    }

    /// Current yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current pitch in degrees, always inside the clamp range
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Derived front vector (unit length)
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Derived right vector (unit length)
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Derived up vector (unit length)
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Set yaw/pitch directly (degrees); pitch is clamped and the basis is
    /// recomputed
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = utils::clamp(pitch, -PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.update_basis();
    }

    /// View matrix: look-at from position toward position + front
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// Projection matrix for the current mode and viewport size
    pub fn projection_matrix(&self, viewport: (u32, u32)) -> Mat4 {
        let (width, height) = viewport;
        debug_assert!(width > 0 && height > 0, "degenerate viewport {width}x{height}");
        match self.projection_mode {
            ProjectionMode::Perspective => {
                let aspect = width as f32 / height as f32;
                Mat4::perspective(utils::deg_to_rad(self.fov_degrees), aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic { scale } => Mat4::orthographic_corner(
                width as f32 * scale,
                height as f32 * scale,
                self.near,
                self.far,
            ),
        }
    }

    /// Advance position and orientation from this frame's input.
    ///
    /// Movement follows the four rebindable direction keys along front/right
    /// scaled by speed and timestep. Mouse look is active while the cursor is
    /// locked, or while the editor override is on and the right button held;
    /// the first cursor sample after look engages only resynchronizes the
    /// previous position.
    pub fn process_input(&mut self, input: &InputState, delta_time: f32) {
        let step = self.movement_speed * delta_time;
        if input.is_key_held(self.bindings.forward) {
            self.position += self.front * step;
        }
        if input.is_key_held(self.bindings.back) {
            self.position -= self.front * step;
        }
        if input.is_key_held(self.bindings.left) {
            self.position -= self.right * step;
        }
        if input.is_key_held(self.bindings.right) {
            self.position += self.right * step;
        }

        let look_active = input.is_cursor_locked()
            || (input.editor_look_override() && input.is_button_held(MouseButton::Right));
        if !look_active {
            self.awaiting_first_sample = true;
            return;
        }

        let cursor = input.cursor_position();
        if self.awaiting_first_sample {
            self.last_cursor = cursor;
            self.awaiting_first_sample = false;
            return;
        }

        let delta = cursor - self.last_cursor;
        self.last_cursor = cursor;
        if delta == Vec2::zeros() {
            return;
        }

        self.yaw += delta.x * self.mouse_sensitivity;
        // Cursor up (negative window-space delta) raises the view.
        self.pitch -= delta.y * self.mouse_sensitivity;
        self.pitch = utils::clamp(self.pitch, -PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.update_basis();
    }

    /// Dolly along the front vector (scroll-to-zoom)
    pub fn zoom(&mut self, delta: f32) {
        self.position += self.front * delta;
    }

    fn update_basis(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(&WORLD_UP).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use approx::assert_relative_eq;

    fn locked_input_at(x: f32, y: f32) -> InputState {
        let mut input = InputState::new();
        input.set_cursor_locked(true);
        input.set_cursor_position(Vec2::new(x, y));
        input
    }

    #[test]
    fn pitch_never_leaves_clamp_range() {
        let mut camera = Camera::default();
        camera.mouse_sensitivity = 1.0;

        // Prime the first-sample resync.
        camera.process_input(&locked_input_at(0.0, 0.0), 0.016);

        // Drag the cursor absurdly far down then up.
        camera.process_input(&locked_input_at(0.0, 100_000.0), 0.016);
        assert_relative_eq!(camera.pitch(), -89.0);
        assert!(camera.front().y >= -(89.0f32.to_radians().sin()) - 1e-5);

        camera.process_input(&locked_input_at(0.0, -100_000.0), 0.016);
        assert_relative_eq!(camera.pitch(), 89.0);
        assert!(camera.front().y <= 89.0f32.to_radians().sin() + 1e-5);
    }

    #[test]
    fn first_sample_after_lock_is_discarded() {
        let mut camera = Camera::default();
        let yaw_before = camera.yaw();

        // Cursor sits far from the origin when the lock engages; without the
        // resync this would read as a huge delta.
        camera.process_input(&locked_input_at(5000.0, 3000.0), 0.016);
        assert_relative_eq!(camera.yaw(), yaw_before);
        assert_relative_eq!(camera.pitch(), 0.0);

        // The next sample tracks normally.
        camera.process_input(&locked_input_at(5010.0, 3000.0), 0.016);
        assert_relative_eq!(camera.yaw(), yaw_before + 10.0 * camera.mouse_sensitivity);
    }

    #[test]
    fn unlock_rearms_the_first_sample_resync() {
        let mut camera = Camera::default();
        camera.process_input(&locked_input_at(0.0, 0.0), 0.016);
        camera.process_input(&locked_input_at(10.0, 0.0), 0.016);
        let yaw_after_drag = camera.yaw();

        // Unlock, teleport cursor, relock: no jump.
        let mut unlocked = InputState::new();
        unlocked.set_cursor_position(Vec2::new(900.0, 900.0));
        camera.process_input(&unlocked, 0.016);
        camera.process_input(&locked_input_at(900.0, 900.0), 0.016);
        assert_relative_eq!(camera.yaw(), yaw_after_drag);
    }

    #[test]
    fn view_matrix_is_deterministic() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), -35.0, 20.0);
        assert_eq!(camera.view_matrix(), camera.view_matrix());
    }

    #[test]
    fn movement_follows_bindings_and_timestep() {
        let mut camera = Camera::default();
        camera.movement_speed = 2.0;
        let mut input = InputState::new();
        input.press_key(KeyCode::W);

        let start = camera.position;
        camera.process_input(&input, 0.5);
        let moved = camera.position - start;
        assert_relative_eq!(moved.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.dot(&camera.front()), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn rebound_keys_are_honored() {
        let mut camera = Camera::default();
        camera.bindings.forward = KeyCode::Up;
        let mut input = InputState::new();
        input.press_key(KeyCode::W);

        let start = camera.position;
        camera.process_input(&input, 1.0);
        assert_eq!(camera.position, start);

        input.press_key(KeyCode::Up);
        camera.process_input(&input, 1.0);
        assert!(camera.position != start);
    }

    #[test]
    fn zoom_dollies_along_front() {
        let mut camera = Camera::default();
        let start = camera.position;
        camera.zoom(3.0);
        assert_relative_eq!((camera.position - start).dot(&camera.front()), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_projection_uses_corner_origin() {
        let mut camera = Camera::default();
        camera.projection_mode = ProjectionMode::Orthographic { scale: 1.0 };
        camera.near = 0.0;
        camera.far = 1.0;
        let proj = camera.projection_matrix((800, 600));
        let corner = proj * crate::foundation::math::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(corner.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, -1.0, epsilon = 1e-5);
    }
}
