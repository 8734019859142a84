use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use crate::gfx::FrameContext;

const MIN_RADIUS: f32 = 1.0;
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// Orbit camera: spherical coordinates around a fixed target.
pub struct Camera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 20.0,
            yaw: -FRAC_PI_2,
            pitch: 0.3,
            fovy: 60f32.to_radians(),
            znear: 0.1,
            zfar: 400.0,
        }
    }
}

impl Camera {
    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + self.radius * Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw += dx;
        self.pitch = (self.pitch + dy).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius - delta).max(MIN_RADIUS);
    }

    pub fn frame(&self, aspect: f32) -> FrameContext {
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fovy, aspect, self.znear, self.zfar);
        FrameContext {
            view,
            proj,
            view_proj: proj * view,
            camera_pos: eye,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn eye_stays_on_the_orbit_sphere() {
        let mut camera = Camera::default();
        for _ in 0..10 {
            camera.orbit(0.37, 0.21);
            let dist = (camera.eye() - camera.target).length();
            assert!((dist - camera.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn pitch_never_reaches_the_poles() {
        let mut camera = Camera::default();
        camera.orbit(0.0, 100.0);
        assert!(camera.pitch < FRAC_PI_2);
        camera.orbit(0.0, -200.0);
        assert!(camera.pitch > -FRAC_PI_2);
    }

    #[test]
    fn zoom_clamps_at_minimum_radius() {
        let mut camera = Camera::default();
        camera.zoom(1000.0);
        assert_eq!(camera.radius, MIN_RADIUS);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::default();
        let frame = camera.frame(16.0 / 9.0);
        let clip = frame.view_proj * camera.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.abs_diff_eq(Vec4::new(0.0, 0.0, ndc.z, 1.0), 1e-4));
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
