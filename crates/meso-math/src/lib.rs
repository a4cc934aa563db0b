//! Math primitives shared by the mesodyn crates.
//!
//! Thin aliases over nalgebra plus the projector used by the transverse
//! pair coupling.

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;

/// Projector onto the plane orthogonal to the unit vector `u`: P = I − u uᵀ.
///
/// `u` must be normalized. Applied to a vector, P removes the component
/// along `u` and leaves the transverse part untouched.
#[inline]
pub fn orthogonal_projector(u: &Vec3) -> Mat3 {
    Mat3::identity() - u * u.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projector_annihilates_axis() {
        let u = Vec3::new(1.0, 2.0, -2.0).normalize();
        let p = orthogonal_projector(&u);
        assert_relative_eq!((p * u).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn projector_is_idempotent() {
        let u = Vec3::new(0.3, -0.4, 0.866).normalize();
        let p = orthogonal_projector(&u);
        let v = Vec3::new(1.5, -0.7, 2.2);
        assert_relative_eq!(p * (p * v), p * v, epsilon = 1e-12);
    }

    #[test]
    fn projector_preserves_transverse_part() {
        let p = orthogonal_projector(&Vec3::x());
        let v = Vec3::new(5.0, 1.0, -2.0);
        assert_relative_eq!(p * v, Vec3::new(0.0, 1.0, -2.0), epsilon = 1e-12);
    }
}
