use glam::{Mat4, Vec3};

/// Orbit camera parameters: azimuth/elevation in degrees around a lookat
/// point, plus distance from it. Mutated only by the camera controller; the
/// renderer derives a view-projection matrix from it each frame.
pub struct CameraRig {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub lookat: Vec3,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraRig {
    /// Distance from the lookat point never reaches zero; zoom clamps here.
    pub const MIN_DISTANCE: f32 = 0.01;
    pub const MAX_DISTANCE: f32 = 1.0e4;

    /// Elevation stays short of the poles to keep the view basis well defined.
    pub const MAX_ELEVATION: f32 = 89.0;

    pub fn new() -> Self {
        Self {
            azimuth: 90.0,
            elevation: -25.0,
            distance: 5.0,
            lookat: Vec3::new(0.0, 0.5, 0.0),
            fov_y: 45f32.to_radians(),
            z_near: 0.05,
            z_far: 500.0,
        }
    }

    /// Unit vector from the camera toward the lookat point.
    pub fn forward(&self) -> Vec3 {
        let az = self.azimuth.to_radians();
        let el = self.elevation.to_radians();
        Vec3::new(el.cos() * az.cos(), el.sin(), el.cos() * az.sin()).normalize()
    }

    /// Rightward screen direction in world space.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn eye(&self) -> Vec3 {
        self.lookat - self.forward() * self.distance
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.lookat, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, aspect.max(0.0001), self.z_near, self.z_far);
        proj * view
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_distance_from_lookat() {
        let rig = CameraRig::new();
        let eye = rig.eye();
        assert!((eye.distance(rig.lookat) - rig.distance).abs() < 1e-4);
    }

    #[test]
    fn view_proj_is_finite() {
        let rig = CameraRig::new();
        let vp = rig.view_proj(1200.0 / 900.0);
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
    }
}
