//! First-person fly camera
//!
//! The rig accumulates mouse displacement into two unbounded angles and held
//! movement keys into a position, then rebuilds the view and projection
//! matrices once per frame.

use glam::{Mat4, UVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Default field of view in degrees
pub const DEFAULT_FIELD_OF_VIEW: f32 = 45.0;
/// World units per second
pub const DEFAULT_MOVE_SPEED: f32 = 3.0;
/// Radians per pixel of cursor displacement
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.00005;
/// Projection aspect ratio, independent of the window shape
pub const DEFAULT_ASPECT_RATIO: f32 = 4.0 / 3.0;
pub const DEFAULT_NEAR_PLANE: f32 = 0.1;
pub const DEFAULT_FAR_PLANE: f32 = 500.0;

/// Tunables for the rig, loaded from the `[camera]` config section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Start position in world space
    pub position: Vec3,
    /// Start yaw in radians
    pub horizontal_angle: f32,
    /// Start pitch in radians
    pub vertical_angle: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, -14.0),
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            move_speed: DEFAULT_MOVE_SPEED,
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            near: DEFAULT_NEAR_PLANE,
            far: DEFAULT_FAR_PLANE,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
        }
    }
}

/// Mutable camera pose
///
/// Angles are plain accumulators: they are never wrapped, and pitch is not
/// clamped, so looking past vertical keeps rotating over the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub horizontal_angle: f32,
    pub vertical_angle: f32,
    /// Degrees
    pub field_of_view: f32,
}

/// Movement keys held during this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

/// Per-frame input read by [`CameraRig::advance`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub movement: MovementKeys,
    /// Window size in physical pixels
    pub window_size: UVec2,
}

impl InputSnapshot {
    /// Cursor rest position, using integer halving of the window size
    pub fn window_center(&self) -> Vec2 {
        Vec2::new((self.window_size.x / 2) as f32, (self.window_size.y / 2) as f32)
    }
}

/// Pointer device the rig reads and re-centres every frame
pub trait CursorSource {
    /// Current cursor position in window pixels
    fn cursor_position(&self) -> Vec2;

    /// Move the cursor to `position`.
    fn warp_cursor(&mut self, position: Vec2);
}

/// FPS-style camera driven by mouse-look and held keys
#[derive(Debug, Clone)]
pub struct CameraRig {
    state: CameraState,
    settings: CameraSettings,
    view: Mat4,
    projection: Mat4,
}

impl CameraRig {
    pub fn new(settings: CameraSettings) -> Self {
        let state = CameraState {
            position: settings.position,
            horizontal_angle: settings.horizontal_angle,
            vertical_angle: settings.vertical_angle,
            field_of_view: settings.field_of_view,
        };
        let mut rig = Self {
            state,
            settings,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        rig.update_matrices();
        rig
    }

    /// Integrate one frame of input.
    ///
    /// The cursor is warped back to the window centre on every call, even
    /// when the window is unfocused, so a refocus does not produce a jump.
    pub fn advance(
        &mut self,
        input: &InputSnapshot,
        cursor: &mut impl CursorSource,
        elapsed: f32,
    ) {
        let center = input.window_center();
        let pointer = cursor.cursor_position();
        cursor.warp_cursor(center);

        let sensitivity = self.settings.mouse_sensitivity;
        self.state.horizontal_angle += sensitivity * (center.x - pointer.x);
        self.state.vertical_angle += sensitivity * (center.y - pointer.y);

        let direction = self.direction();
        let right = self.right();
        let step = elapsed * self.settings.move_speed;
        let keys = input.movement;

        // Directions add up unnormalized: diagonals move faster
        if keys.forward {
            self.state.position += direction * step;
        }
        if keys.back {
            self.state.position -= direction * step;
        }
        if keys.strafe_right {
            self.state.position += right * step;
        }
        if keys.strafe_left {
            self.state.position -= right * step;
        }

        self.update_matrices();
    }

    /// Unit view direction from the spherical angles
    pub fn direction(&self) -> Vec3 {
        let h = self.state.horizontal_angle;
        let v = self.state.vertical_angle;
        Vec3::new(v.cos() * h.sin(), v.sin(), v.cos() * h.cos())
    }

    /// Horizontal right vector (no roll)
    pub fn right(&self) -> Vec3 {
        let h = self.state.horizontal_angle - FRAC_PI_2;
        Vec3::new(h.sin(), 0.0, h.cos())
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// World-to-camera transform from the last update
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Perspective projection from the last update (0..1 depth range)
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    fn update_matrices(&mut self) {
        let position = self.state.position;
        self.view = Mat4::look_at_rh(position, position + self.direction(), self.up());
        self.projection = Mat4::perspective_rh(
            self.state.field_of_view.to_radians(),
            self.settings.aspect_ratio,
            self.settings.near,
            self.settings.far,
        );
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}
