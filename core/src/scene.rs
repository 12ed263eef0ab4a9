//! Run-time scene parameters
//!
//! Everything here is changed by discrete key presses and read once per frame
//! when the uniform block is assembled.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// World up, the yaw axis for light rotation
pub const WORLD_UP: Vec3 = Vec3::Y;
/// World right, the pitch axis for light rotation
pub const WORLD_RIGHT: Vec3 = Vec3::X;

/// Tunables for the store, loaded from the `[scene]` config section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub height_scale: f32,
    pub height_scale_step: f32,
    pub min_height_scale: f32,
    pub max_height_scale: f32,
    pub light_direction: Vec3,
    pub light_step_degrees: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            height_scale: 1.75e-6,
            height_scale_step: 5e-8,
            min_height_scale: 0.0,
            max_height_scale: 3e-6,
            light_direction: Vec3::new(0.0, -0.5, -0.5),
            light_step_degrees: 5.0,
        }
    }
}

impl SceneSettings {
    /// Repair an inverted height scale range by swapping the bounds.
    pub fn sanitized(mut self) -> Self {
        if self.min_height_scale.is_nan() || self.max_height_scale.is_nan() {
            let defaults = Self::default();
            warn!("Height scale bounds are NaN, using defaults");
            self.min_height_scale = defaults.min_height_scale;
            self.max_height_scale = defaults.max_height_scale;
        }
        if self.min_height_scale > self.max_height_scale {
            warn!(
                min = self.min_height_scale,
                max = self.max_height_scale,
                "Height scale bounds inverted, swapping"
            );
            std::mem::swap(&mut self.min_height_scale, &mut self.max_height_scale);
        }
        self
    }
}

/// Discrete scene edits bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAction {
    RaiseHeight,
    LowerHeight,
    /// Rotate the light positively about [`WORLD_UP`]
    YawLightPositive,
    YawLightNegative,
    /// Rotate the light positively about [`WORLD_RIGHT`]
    PitchLightPositive,
    PitchLightNegative,
    ToggleWireframe,
    ToggleNormalMode,
}

/// Mutable scene state owned by the application
#[derive(Debug, Clone, PartialEq)]
pub struct SceneParameterStore {
    height_scale: f32,
    min_height_scale: f32,
    max_height_scale: f32,
    height_scale_step: f32,
    light_direction: Vec3,
    light_step: f32,
    wireframe: bool,
    normal_mode: bool,
}

impl SceneParameterStore {
    pub fn new(settings: SceneSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            height_scale: settings
                .height_scale
                .clamp(settings.min_height_scale, settings.max_height_scale),
            min_height_scale: settings.min_height_scale,
            max_height_scale: settings.max_height_scale,
            height_scale_step: settings.height_scale_step,
            light_direction: settings.light_direction,
            light_step: settings.light_step_degrees.to_radians(),
            wireframe: false,
            normal_mode: false,
        }
    }

    /// Add `delta` to the height scale, clamped to the configured range.
    pub fn set_height_scale(&mut self, delta: f32) {
        let next = self.height_scale + delta;
        // NaN would poison every later frame
        if next.is_nan() {
            return;
        }
        self.height_scale = next.clamp(self.min_height_scale, self.max_height_scale);
    }

    /// Rotate the light direction by `angle` radians about `axis`.
    ///
    /// The axis is normalized first; a zero axis leaves the light unchanged.
    pub fn rotate_light(&mut self, angle: f32, axis: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.light_direction = Quat::from_axis_angle(axis, angle) * self.light_direction;
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    pub fn toggle_normal_visualization(&mut self) {
        self.normal_mode = !self.normal_mode;
    }

    /// Apply a bound action using the configured step sizes
    pub fn apply(&mut self, action: SceneAction) {
        match action {
            SceneAction::RaiseHeight => self.set_height_scale(self.height_scale_step),
            SceneAction::LowerHeight => self.set_height_scale(-self.height_scale_step),
            SceneAction::YawLightPositive => self.rotate_light(self.light_step, WORLD_UP),
            SceneAction::YawLightNegative => self.rotate_light(-self.light_step, WORLD_UP),
            SceneAction::PitchLightPositive => self.rotate_light(self.light_step, WORLD_RIGHT),
            SceneAction::PitchLightNegative => self.rotate_light(-self.light_step, WORLD_RIGHT),
            SceneAction::ToggleWireframe => self.toggle_wireframe(),
            SceneAction::ToggleNormalMode => self.toggle_normal_visualization(),
        }
        debug!(
            ?action,
            height_scale = self.height_scale,
            light = ?self.light_direction,
            wireframe = self.wireframe,
            normal_mode = self.normal_mode,
            "Scene updated"
        );
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn height_scale_range(&self) -> (f32, f32) {
        (self.min_height_scale, self.max_height_scale)
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn normal_visualization(&self) -> bool {
        self.normal_mode
    }
}

impl Default for SceneParameterStore {
    fn default() -> Self {
        Self::new(SceneSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_defaults() {
        let store = SceneParameterStore::default();
        assert_eq!(store.height_scale(), 1.75e-6);
        assert_eq!(store.height_scale_range(), (0.0, 3e-6));
        assert_eq!(store.light_direction(), Vec3::new(0.0, -0.5, -0.5));
        assert!(!store.wireframe());
        assert!(!store.normal_visualization());
    }

    #[test]
    fn test_height_scale_clamps_at_bounds() {
        let mut store = SceneParameterStore::default();
        store.set_height_scale(1.0);
        assert_eq!(store.height_scale(), 3e-6);
        store.set_height_scale(-1.0);
        assert_eq!(store.height_scale(), 0.0);
        store.set_height_scale(f32::INFINITY);
        assert_eq!(store.height_scale(), 3e-6);
        store.set_height_scale(f32::NEG_INFINITY);
        assert_eq!(store.height_scale(), 0.0);
    }

    #[test]
    fn test_height_scale_stays_in_range_for_any_sequence() {
        let mut store = SceneParameterStore::default();
        let deltas = [
            5e-8, -1e-3, 7e-7, 2e-6, 2e-6, -4e-7, f32::NAN, -1e-9, 1e9, -3e-6, 1.5e-6,
        ];
        for _ in 0..50 {
            for delta in deltas {
                store.set_height_scale(delta);
                let scale = store.height_scale();
                assert!((0.0..=3e-6).contains(&scale), "scale {scale} out of range");
            }
        }
    }

    #[test]
    fn test_raise_and_lower_use_step() {
        let mut store = SceneParameterStore::default();
        store.apply(SceneAction::RaiseHeight);
        assert!((store.height_scale() - 1.8e-6).abs() < 1e-12);
        store.apply(SceneAction::LowerHeight);
        store.apply(SceneAction::LowerHeight);
        assert!((store.height_scale() - 1.7e-6).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let store = SceneParameterStore::new(SceneSettings {
            min_height_scale: 3e-6,
            max_height_scale: 1e-6,
            height_scale: 5e-6,
            ..Default::default()
        });
        assert_eq!(store.height_scale_range(), (1e-6, 3e-6));
        assert_eq!(store.height_scale(), 3e-6);
    }

    #[test]
    fn test_rotate_light_about_up() {
        let mut store = SceneParameterStore::new(SceneSettings {
            light_direction: Vec3::Z,
            ..Default::default()
        });
        store.rotate_light(FRAC_PI_2, WORLD_UP);
        assert!(approx(store.light_direction(), Vec3::X));
    }

    #[test]
    fn test_rotate_light_about_right() {
        let mut store = SceneParameterStore::new(SceneSettings {
            light_direction: Vec3::Y,
            ..Default::default()
        });
        store.rotate_light(FRAC_PI_2, WORLD_RIGHT);
        assert!(approx(store.light_direction(), Vec3::Z));
    }

    #[test]
    fn test_rotation_preserves_length() {
        let mut store = SceneParameterStore::default();
        let length = store.light_direction().length();
        for _ in 0..72 {
            store.apply(SceneAction::YawLightPositive);
            store.apply(SceneAction::PitchLightNegative);
        }
        assert!((store.light_direction().length() - length).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_rotations_cancel() {
        let mut store = SceneParameterStore::default();
        let start = store.light_direction();
        store.apply(SceneAction::PitchLightPositive);
        store.apply(SceneAction::PitchLightNegative);
        assert!(approx(store.light_direction(), start));
    }

    #[test]
    fn test_full_turn_returns_to_start() {
        let mut store = SceneParameterStore::default();
        let start = store.light_direction();
        // 72 steps of 5 degrees
        for _ in 0..72 {
            store.apply(SceneAction::YawLightPositive);
        }
        assert!(approx(store.light_direction(), start));
    }

    #[test]
    fn test_zero_axis_is_ignored() {
        let mut store = SceneParameterStore::default();
        let start = store.light_direction();
        store.rotate_light(1.0, Vec3::ZERO);
        assert_eq!(store.light_direction(), start);
    }

    #[test]
    fn test_toggles_flip_back() {
        let mut store = SceneParameterStore::default();
        store.apply(SceneAction::ToggleWireframe);
        store.apply(SceneAction::ToggleNormalMode);
        assert!(store.wireframe());
        assert!(store.normal_visualization());
        store.toggle_wireframe();
        store.toggle_normal_visualization();
        assert!(!store.wireframe());
        assert!(!store.normal_visualization());
    }
}
