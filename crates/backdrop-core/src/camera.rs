//! Camera, view frustum and world-space viewport extent.
//!
//! These types avoid platform APIs so the web and native hosts can share them.

use crate::constants::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, CAMERA_Z};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Right-handed perspective camera.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(self.projection_matrix() * self.view_matrix())
    }

    /// Update the aspect ratio from a pixel size; zero heights are ignored.
    pub fn set_viewport_px(&mut self, width_px: u32, height_px: u32) {
        if width_px > 0 && height_px > 0 {
            self.aspect = width_px as f32 / height_px as f32;
        }
    }

    /// Rotate the eye around the target's vertical axis.
    pub fn orbit_azimuth(&mut self, radians: f32) {
        let offset = self.eye - self.target;
        self.eye = self.target + Quat::from_rotation_y(radians) * offset;
    }

    /// Visible world extent on the plane through `target` facing the camera.
    pub fn viewport(&self) -> Viewport {
        let distance = (self.eye - self.target).length();
        let height = 2.0 * distance * (self.fovy_radians * 0.5).tan();
        Viewport {
            width: height * self.aspect,
            height,
        }
    }
}

/// World-space size of the visible area at the focus plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Six clip planes, normals pointing inward.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a combined projection * view matrix (depth range 0..1).
    pub fn from_view_projection(m: Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        for p in &mut planes {
            let len = p.truncate().length();
            if len > f32::EPSILON {
                *p /= len;
            }
        }
        Self { planes }
    }

    /// True if the sphere touches or lies inside every plane.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }
}
