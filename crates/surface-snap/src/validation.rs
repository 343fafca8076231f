//! Placement transform validation.
//!
//! `TransformValidator` checks that a 16-value transform is what the tool
//! produces: finite values, mutually orthogonal axis rows, a homogeneous
//! `(0,0,0,1)` column and, optionally, expected per-axis scales.

use glam::{Mat4, Vec3};

use crate::align::ComposedTransform;

const ORTHO_EPSILON: f32 = 1e-3;

/// Validator for `ComposedTransform` integrity checks.
pub struct TransformValidator {
    transform: ComposedTransform,
    expected_scale: Option<(Vec3, f32)>,
}

impl TransformValidator {
    pub fn new(transform: &ComposedTransform) -> Self {
        Self {
            transform: *transform,
            expected_scale: None,
        }
    }

    pub fn from_mat4(matrix: &Mat4) -> Self {
        Self::new(&ComposedTransform::from(*matrix))
    }

    /// Also require the axis lengths to match `scale` within `tolerance`.
    pub fn with_expected_scale(mut self, scale: Vec3, tolerance: f32) -> Self {
        self.expected_scale = Some((scale, tolerance));
        self
    }

    pub fn is_finite(&self) -> bool {
        self.transform.0.iter().all(|v| v.is_finite())
    }

    /// Lengths of the tangent, normal and bitangent rows
    pub fn axis_lengths(&self) -> Vec3 {
        Vec3::new(
            self.transform.tangent().length(),
            self.transform.normal().length(),
            self.transform.bitangent().length(),
        )
    }

    /// Check that the three axis rows are pairwise perpendicular
    /// (cosine of the angle between them below `epsilon`).
    pub fn are_axes_orthogonal(&self, epsilon: f32) -> bool {
        let t = self.transform.tangent().normalize_or_zero();
        let n = self.transform.normal().normalize_or_zero();
        let b = self.transform.bitangent().normalize_or_zero();
        t.dot(n).abs() < epsilon && t.dot(b).abs() < epsilon && n.dot(b).abs() < epsilon
    }

    /// Check that the bitangent follows `tangent x normal`
    pub fn is_right_handed(&self) -> bool {
        let t = self.transform.tangent();
        let n = self.transform.normal();
        t.cross(n).dot(self.transform.bitangent()) > 0.0
    }

    pub fn is_homogeneous_column_valid(&self) -> bool {
        let a = &self.transform.0;
        a[3] == 0.0 && a[7] == 0.0 && a[11] == 0.0 && a[15] == 1.0
    }

    pub fn assert_scale_approx(&self, expected: Vec3, tolerance: f32) -> bool {
        self.axis_lengths().abs_diff_eq(expected, tolerance)
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the transform is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_finite() {
            errors.push(format!("Transform has non-finite values: {:?}", self.transform.0));
            return errors;
        }

        if !self.is_homogeneous_column_valid() {
            let a = &self.transform.0;
            errors.push(format!(
                "Homogeneous column is ({}, {}, {}, {}), expected (0, 0, 0, 1)",
                a[3], a[7], a[11], a[15]
            ));
        }

        let lengths = self.axis_lengths();
        if lengths.min_element() <= f32::EPSILON {
            errors.push(format!("Degenerate axis, lengths {lengths:?}"));
        } else {
            if !self.are_axes_orthogonal(ORTHO_EPSILON) {
                errors.push("Axis rows are not orthogonal".to_string());
            }
            if !self.is_right_handed() {
                errors.push("Bitangent does not follow tangent x normal".to_string());
            }
        }

        if let Some((scale, tolerance)) = self.expected_scale {
            if !self.assert_scale_approx(scale, tolerance) {
                errors.push(format!("Axis lengths {lengths:?}, expected {scale:?}"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_identity_is_valid() {
        assert!(TransformValidator::new(&ComposedTransform::IDENTITY).validate_all().is_empty());
    }

    #[test]
    fn test_scaled_rotation_is_valid() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 3.0, 4.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, -2.0, 5.0),
        );
        let v = TransformValidator::from_mat4(&m).with_expected_scale(Vec3::new(2.0, 3.0, 4.0), 1e-4);
        assert!(v.validate_all().is_empty(), "{:?}", v.validate_all());
    }

    #[test]
    fn test_wrong_scale_reported() {
        let v = TransformValidator::new(&ComposedTransform::IDENTITY)
            .with_expected_scale(Vec3::splat(2.0), 1e-4);
        assert_eq!(v.validate_all().len(), 1);
    }

    #[test]
    fn test_sheared_axes_reported() {
        let t = ComposedTransform::from_axes(Vec3::X, Vec3::new(0.5, 1.0, 0.0), Vec3::Z, Vec3::ZERO);
        let v = TransformValidator::new(&t);
        assert!(!v.are_axes_orthogonal(ORTHO_EPSILON));
        assert!(!v.validate_all().is_empty());
    }

    #[test]
    fn test_left_handed_reported() {
        let t = ComposedTransform::from_axes(Vec3::X, Vec3::Y, Vec3::NEG_Z, Vec3::ZERO);
        let errors = TransformValidator::new(&t).validate_all();
        assert_eq!(errors, vec!["Bitangent does not follow tangent x normal".to_string()]);
    }

    #[test]
    fn test_non_finite_short_circuits() {
        let mut t = ComposedTransform::IDENTITY;
        t.0[5] = f32::NAN;
        let errors = TransformValidator::new(&t).validate_all();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("non-finite"));
    }

    #[test]
    fn test_bad_homogeneous_column() {
        let mut t = ComposedTransform::IDENTITY;
        t.0[3] = 1.0;
        assert!(!TransformValidator::new(&t).is_homogeneous_column_valid());
    }
}
