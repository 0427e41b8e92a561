// src/camera.rs
use crate::mode::Mode;
use crate::pointer::Pointer;
use nalgebra::{Point3, Vector3};

/// Camera position and look-at target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3<f64>,
    pub look_at: Point3<f64>,
}

impl CameraPose {
    pub fn origin_facing(position: Point3<f64>) -> Self {
        Self {
            position,
            look_at: Point3::origin(),
        }
    }
}

/// Converts smoothed pointer + mode into a target camera pose (spherical
/// orbit + zoom), then eases the live pose toward it. Grounded in
/// `tracking.rs::calculate_arm_rotation_enhanced`'s forearm-vector geometry
/// style, which uses the same dot/cross/clamp(-1,1).acos() idiom this
/// module reuses for spherical coordinates.
pub struct CameraController {
    pose: CameraPose,
    camera_z: f64,
}

impl CameraController {
    pub fn new(camera_z: f64) -> Self {
        Self {
            pose: CameraPose::origin_facing(Point3::new(0.0, 0.0, camera_z)),
            camera_z,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    fn target_for(&self, mode: Mode, pointer: Pointer) -> Point3<f64> {
        match mode {
            Mode::Tree => Point3::new(0.0, 0.0, self.camera_z),
            Mode::Scattered | Mode::PhotoView => {
                let theta = pointer.x * 0.15 * std::f64::consts::PI;
                let phi = (std::f64::consts::FRAC_PI_2 - pointer.y * std::f64::consts::PI / 12.0)
                    .clamp(1e-4, std::f64::consts::PI - 1e-4);
                let r = self.camera_z - pointer.z * 5.0;
                Point3::new(r * phi.sin() * theta.sin(), r * phi.cos(), r * phi.sin() * theta.cos())
            }
        }
    }

    fn easing_k(mode: Mode) -> f64 {
        match mode {
            Mode::Tree | Mode::PhotoView => 2.0,
            Mode::Scattered => 0.8,
        }
    }

    /// Advance the live pose toward the mode/pointer-derived target by `dt`
    /// seconds.
    pub fn advance(&mut self, mode: Mode, pointer: Pointer, dt: f64) -> CameraPose {
        let target = self.target_for(mode, pointer);
        let k = Self::easing_k(mode);
        let step = (dt * k).clamp(0.0, 1.0);
        let delta: Vector3<f64> = target - self.pose.position;
        self.pose.position += delta * step;
        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_target_is_on_axis_at_camera_z() {
        let mut cc = CameraController::new(15.0);
        for _ in 0..200 {
            cc.advance(Mode::Tree, Pointer::new(0.4, 0.2, 0.5), 1.0 / 60.0);
        }
        let p = cc.pose().position;
        assert!((p.x).abs() < 1e-3);
        assert!((p.y).abs() < 1e-3);
        assert!((p.z - 15.0).abs() < 1e-3);
    }

    #[test]
    fn scattered_orbit_radius_matches_zoom() {
        let mut cc = CameraController::new(15.0);
        let pointer = Pointer::new(0.0, 0.0, 1.0);
        for _ in 0..400 {
            cc.advance(Mode::Scattered, pointer, 1.0 / 60.0);
        }
        let p = cc.pose().position;
        let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
        assert!((r - 10.0).abs() < 1e-2, "expected radius ~= camera_z - z*5 = 10, got {r}");
    }

    #[test]
    fn photo_view_inherits_scattered_target() {
        let pointer = Pointer::new(0.3, -0.2, 0.4);
        let scattered = CameraController::new(15.0).target_for(Mode::Scattered, pointer);
        let photo_view = CameraController::new(15.0).target_for(Mode::PhotoView, pointer);
        assert_eq!(scattered, photo_view);
    }
}
