//! Damped orbit camera.

use glam::{Mat4, Vec3};

/// Orbit camera looking at a fixed target.
///
/// Drag and zoom input is queued with [`rotate`](Self::rotate) and
/// [`zoom`](Self::zoom) and applied gradually by [`update`](Self::update), so
/// motion eases out after the pointer stops.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of queued rotation applied per update (1.0 = no easing).
    pub damping: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl Camera {
    const PITCH_LIMIT: f32 = 1.5;

    /// Camera 7.5 units out on +Z, 60 degree FOV.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 7.5,
            target: Vec3::ZERO,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            min_distance: 4.0,
            max_distance: 18.0,
            damping: 0.08,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    /// Queue a rotation in radians.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.pending_yaw += d_yaw;
        self.pending_pitch += d_pitch;
    }

    /// Dolly toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, amount: f32) {
        let factor = 0.95f32.powf(amount);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Apply a share of the queued rotation. Call once per frame.
    pub fn update(&mut self) {
        let k = self.damping.clamp(0.0, 1.0);
        let k = if k == 0.0 { 1.0 } else { k };
        self.yaw += self.pending_yaw * k;
        self.pitch =
            (self.pitch + self.pending_pitch * k).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.pending_yaw *= 1.0 - k;
        self.pending_pitch *= 1.0 - k;
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::new();
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 7.5), 1e-6));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = Camera::new();
        cam.zoom(1000.0);
        assert_eq!(cam.distance, 4.0);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, 18.0);
    }

    #[test]
    fn test_rotation_eases_toward_queued_total() {
        let mut cam = Camera::new();
        cam.rotate(1.0, 0.0);
        cam.update();
        assert!((cam.yaw - 0.08).abs() < 1e-6);
        for _ in 0..500 {
            cam.update();
        }
        assert!((cam.yaw - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = Camera::new();
        cam.damping = 1.0;
        cam.rotate(0.0, 10.0);
        cam.update();
        assert_eq!(cam.pitch, 1.5);
    }
}
