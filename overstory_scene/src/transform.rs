// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decomposed local transforms and their matrix form.

use glam::{Mat4, Quat, Vec2, Vec3};

/// Authored spatial components of a node, relative to its parent.
///
/// The matrix form composes as `perspective * translation * rotation * skew *
/// scale`, so the components behave like the familiar decomposed-transform
/// stack: scale and skew act in the node's local frame, then the node is
/// rotated and positioned in the parent's frame, and an optional projective
/// term foreshortens by depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position of the node's origin in parent space.
    pub translation: Vec3,
    /// Orientation in parent space.
    pub rotation: Quat,
    /// Per-axis scale factors.
    pub scale: Vec3,
    /// Shear factors: `x += skew.x * y` and `y += skew.y * x`, applied after
    /// scale. Stored as shear coefficients, not angles.
    pub skew: Vec2,
    /// Perspective distance along the view axis; points at `z = distance`
    /// project to infinity. `0.0` disables the projective term.
    pub perspective: f32,
}

impl Transform {
    /// The do-nothing transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
        skew: Vec2::ZERO,
        perspective: 0.0,
    };

    /// A transform that only translates.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// A transform that only rotates.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// A transform that only scales.
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Build the matrix form of this transform.
    pub fn to_matrix(&self) -> Mat4 {
        let mut m = Mat4::from_translation(self.translation) * Mat4::from_quat(self.rotation);
        if self.skew != Vec2::ZERO {
            let mut shear = Mat4::IDENTITY;
            shear.y_axis.x = self.skew.x;
            shear.x_axis.y = self.skew.y;
            m *= shear;
        }
        m *= Mat4::from_scale(self.scale);
        if self.perspective != 0.0 {
            let mut projection = Mat4::IDENTITY;
            projection.z_axis.w = -1.0 / self.perspective;
            m = projection * m;
        }
        m
    }

    /// Recover components from a matrix.
    ///
    /// Translation, rotation, and scale are recovered; skew and perspective
    /// cannot be recovered uniquely from a general matrix and reset to their
    /// identity values. A matrix built by [`Transform::to_matrix`] from a
    /// skew-free, perspective-free transform round-trips exactly up to
    /// floating-point error.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
            skew: Vec2::ZERO,
            perspective: 0.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn mat_approx_eq(a: Mat4, b: Mat4, eps: f32) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() <= eps)
    }

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn trs_matches_glam_composition() {
        let t = Transform {
            translation: Vec3::new(1.0, -2.0, 3.0),
            rotation: Quat::from_rotation_z(0.7),
            scale: Vec3::new(2.0, 0.5, 1.0),
            ..Transform::IDENTITY
        };
        let expected =
            Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.translation);
        assert!(mat_approx_eq(t.to_matrix(), expected, 1e-6));
    }

    #[test]
    fn skew_shears_points() {
        let t = Transform {
            skew: Vec2::new(0.5, 0.0),
            ..Transform::IDENTITY
        };
        let p = t.to_matrix().transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!((p.x - 0.5).abs() < 1e-6, "x should pick up 0.5 per unit y");
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perspective_divides_by_depth() {
        let t = Transform {
            perspective: 10.0,
            ..Transform::IDENTITY
        };
        // A point halfway to the perspective distance has w = 0.5 and
        // projects to double its lateral offset.
        let h = t.to_matrix() * Vec4::new(2.0, 0.0, 5.0, 1.0);
        assert!((h.w - 0.5).abs() < 1e-6);
        let projected = t.to_matrix().project_point3(Vec3::new(2.0, 0.0, 5.0));
        assert!((projected.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn from_matrix_round_trips_trs() {
        let t = Transform {
            translation: Vec3::new(4.0, 5.0, -6.0),
            rotation: Quat::from_rotation_y(1.2),
            scale: Vec3::new(3.0, 3.0, 3.0),
            ..Transform::IDENTITY
        };
        let back = Transform::from_matrix(&t.to_matrix());
        assert!((back.translation - t.translation).length() < 1e-5);
        assert!((back.scale - t.scale).length() < 1e-5);
        assert!(back.rotation.dot(t.rotation).abs() > 1.0 - 1e-5);
    }
}
