//! Scene transforms and their std140 mirror.
//!
//! Both matrices are recomputed from absolute animation state every frame
//! rather than mutated in place, so long runs accumulate no floating-point
//! drift and the functions stay unit-testable without a device.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Where the pyramid sits before the oscillating offset is applied.
const BASE_POSITION: Vec3 = Vec3::new(0.0, 0.0, -4.0);

/// Vertical field of view of the perspective projection, in degrees.
const FOV_Y_DEGREES: f32 = 45.0;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 300.0;

/// Builds the model transform for the current spin angle and offset.
///
/// The mesh is rotated about the normalized (1,1,1) axis, then placed at the
/// base position shifted by a fifth of the oscillation offset along x.
pub fn model_matrix(angle_deg: f32, offset: f32) -> Mat4 {
    let translation = BASE_POSITION + Vec3::new(offset / 5.0, 0.0, 0.0);
    Mat4::from_translation(translation)
        * Mat4::from_axis_angle(Vec3::ONE.normalize(), angle_deg.to_radians())
}

/// Builds the perspective projection for the current framebuffer size.
///
/// Uses wgpu's 0..1 depth convention; recomputed on resize and otherwise
/// immutable.
pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// CPU-side mirror of the shader's `Scene` uniform block.
///
/// Two column-major mat4s, which is already std140-compatible, written
/// through the queue each frame.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct SceneUniforms {
    pub model: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl SceneUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            model: model_matrix(0.0, 0.0).to_cols_array_2d(),
            projection: projection_matrix(width, height).to_cols_array_2d(),
        }
    }

    pub fn set_model(&mut self, model: Mat4) {
        self.model = model.to_cols_array_2d();
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection.to_cols_array_2d();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn model_translates_origin_by_base_and_offset() {
        let transformed = model_matrix(0.0, 0.5) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((transformed.x - 0.1).abs() < 1e-6);
        assert!(transformed.y.abs() < 1e-6);
        assert!((transformed.z - BASE_POSITION.z).abs() < 1e-6);
    }

    #[test]
    fn rotation_leaves_translation_untouched() {
        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let still = model_matrix(0.0, 0.0) * origin;
        let spun = model_matrix(137.0, 0.0) * origin;
        assert!((still - spun).length() < 1e-5);
    }

    #[test]
    fn rotation_moves_off_axis_points() {
        let point = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let still = model_matrix(0.0, 0.0) * point;
        let spun = model_matrix(90.0, 0.0) * point;
        assert!((still - spun).length() > 0.1);
    }

    #[test]
    fn projection_scales_x_by_aspect() {
        let projection = projection_matrix(640, 480);
        let aspect = 640.0 / 480.0;
        assert!((projection.x_axis.x * aspect - projection.y_axis.y).abs() < 1e-5);
        // Perspective divide comes from w = -z.
        assert!((projection.z_axis.w + 1.0).abs() < 1e-6);
    }

    #[test]
    fn projection_tolerates_degenerate_sizes() {
        let projection = projection_matrix(640, 0);
        assert!(projection.is_finite());
    }

    #[test]
    fn uniform_block_is_two_mat4s() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 128);
    }
}
