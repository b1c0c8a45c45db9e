// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3() / transform_vector3()
// and inverse(); only the normal transform needs a helper.

use glam::{Mat3, Mat4};

/// Normal transform for an affine model matrix: the inverse-transpose of
/// its 3x3 linear part. Transforming shading normals with the forward
/// matrix would skew them under non-uniform scale.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    Mat3::from_mat4(*m).inverse().transpose()
}
