//! Follow camera

use glam::{Mat4, Vec2, Vec3};

/// Units ahead of the player the camera aims, along the run direction
pub const LOOK_AHEAD: f32 = 4.0;
/// Exponential smoothing rate (1/s)
pub const FOLLOW_RATE: f32 = 5.0;
/// Distance from the level plane
pub const CAMERA_DISTANCE: f32 = 30.0;
/// Vertical field of view (radians)
pub const FIELD_OF_VIEW: f32 = std::f32::consts::FRAC_PI_4;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Point on the level plane the camera looks at
    pub target: Vec2,
    /// Snap instead of easing (reduced motion)
    pub snap: bool,
}

impl Camera {
    pub fn new(target: Vec2, snap: bool) -> Self {
        Self { target, snap }
    }

    /// Where the camera wants to be for a player at `player` moving at `velocity_x`
    pub fn desired_target(player: Vec3, velocity_x: f32) -> Vec2 {
        let ahead = if velocity_x > 0.0 {
            LOOK_AHEAD
        } else if velocity_x < 0.0 {
            -LOOK_AHEAD
        } else {
            0.0
        };
        Vec2::new(player.x + ahead, player.y)
    }

    /// Ease toward the player
    pub fn follow(&mut self, player: Vec3, velocity_x: f32, dt: f32) {
        let desired = Self::desired_target(player, velocity_x);
        if self.snap {
            self.target = desired;
            return;
        }
        let t = 1.0 - (-FOLLOW_RATE * dt.max(0.0)).exp();
        self.target = self.target.lerp(desired, t);
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        self.target.extend(CAMERA_DISTANCE)
    }

    /// Perspective view-projection for a viewport of the given aspect ratio
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target.extend(0.0), Vec3::Y);
        let projection =
            Mat4::perspective_rh(FIELD_OF_VIEW, aspect.max(0.01), NEAR_PLANE, FAR_PLANE);
        projection * view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, false)
    }
}
