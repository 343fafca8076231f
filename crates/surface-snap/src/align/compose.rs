use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::frame::Frame;
use crate::error::AlignError;

/// 16 transform values laid out as
/// `[Tx,Ty,Tz,0, Nx,Ny,Nz,0, Bx,By,Bz,0, Px,Py,Pz,1]`:
/// tangent (local X), normal (local Y), bitangent (local Z), translation.
///
/// Column-major in glam terms, so `Mat4::from_cols_array` reads it directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComposedTransform(pub [f32; 16]);

impl ComposedTransform {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn from_axes(tangent: Vec3, normal: Vec3, bitangent: Vec3, translation: Vec3) -> Self {
        Self([
            tangent.x, tangent.y, tangent.z, 0.0, //
            normal.x, normal.y, normal.z, 0.0, //
            bitangent.x, bitangent.y, bitangent.z, 0.0, //
            translation.x, translation.y, translation.z, 1.0,
        ])
    }

    fn row(&self, i: usize) -> Vec3 {
        Vec3::new(self.0[i * 4], self.0[i * 4 + 1], self.0[i * 4 + 2])
    }

    pub fn tangent(&self) -> Vec3 {
        self.row(0)
    }

    pub fn normal(&self) -> Vec3 {
        self.row(1)
    }

    pub fn bitangent(&self) -> Vec3 {
        self.row(2)
    }

    pub fn translation(&self) -> Vec3 {
        self.row(3)
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array(&self.0)
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }
}

impl From<ComposedTransform> for Mat4 {
    fn from(t: ComposedTransform) -> Self {
        t.to_mat4()
    }
}

impl From<Mat4> for ComposedTransform {
    fn from(m: Mat4) -> Self {
        Self(m.to_cols_array())
    }
}

/// Per-axis multiplier for a scale delta given in percent.
pub fn scale_factor(delta_percent: f32) -> Result<f32, AlignError> {
    let factor = delta_percent / 100.0 + 1.0;
    if factor.is_finite() {
        Ok(factor)
    } else {
        Err(AlignError::NumericFault("scale delta"))
    }
}

/// Assemble the transform for `frame` placed at `position`.
///
/// Each axis is scaled by the matching component of `source_scale` times
/// `scale_factor(scale_delta_percent)`. A non-finite delta or source scale
/// leaves the axes at unit length.
pub fn compose(
    frame: &Frame,
    position: Vec3,
    source_scale: Vec3,
    scale_delta_percent: f32,
) -> ComposedTransform {
    let mut tangent = frame.tangent;
    let mut normal = frame.normal;
    let mut bitangent = frame.bitangent();

    match axis_scales(source_scale, scale_delta_percent) {
        Ok(s) => {
            tangent *= s.x;
            normal *= s.y;
            bitangent *= s.z;
        }
        Err(e) => tracing::debug!("Scaling skipped: {e}"),
    }

    ComposedTransform::from_axes(tangent, normal, bitangent, position)
}

fn axis_scales(source_scale: Vec3, scale_delta_percent: f32) -> Result<Vec3, AlignError> {
    let scales = source_scale * scale_factor(scale_delta_percent)?;
    if scales.is_finite() {
        Ok(scales)
    } else {
        Err(AlignError::NumericFault("source scale"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn unit_frame() -> Frame {
        Frame {
            tangent: Vec3::X,
            normal: Vec3::Y,
        }
    }

    #[test]
    fn test_layout() {
        let t = compose(&unit_frame(), Vec3::new(4.0, 5.0, 6.0), Vec3::ONE, 0.0);
        assert_eq!(
            t.0,
            [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                4.0, 5.0, 6.0, 1.0,
            ]
        );
        assert_eq!(t.to_mat4(), Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)));
    }

    #[test]
    fn test_zero_delta_keeps_source_scale() {
        let scale = Vec3::new(2.0, 0.5, 3.0);
        let t = compose(&unit_frame(), Vec3::ZERO, scale, 0.0);
        assert!(t.tangent().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS));
        assert!(t.normal().abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), EPS));
        assert!(t.bitangent().abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPS));
    }

    #[test]
    fn test_delta_percent() {
        let t = compose(&unit_frame(), Vec3::ZERO, Vec3::splat(2.0), 50.0);
        // 2 * (50/100 + 1) = 3
        assert!((t.tangent().length() - 3.0).abs() < EPS);
        assert!((t.normal().length() - 3.0).abs() < EPS);
        assert!((t.bitangent().length() - 3.0).abs() < EPS);
    }

    #[test]
    fn test_non_finite_delta_falls_back_to_unit_axes() {
        let t = compose(&unit_frame(), Vec3::ONE, Vec3::splat(4.0), f32::NAN);
        assert!(t.tangent().abs_diff_eq(Vec3::X, EPS));
        assert!(t.normal().abs_diff_eq(Vec3::Y, EPS));
        assert!(t.bitangent().abs_diff_eq(Vec3::Z, EPS));
        assert_eq!(t.translation(), Vec3::ONE);
    }

    #[test]
    fn test_non_finite_source_scale_falls_back() {
        let t = compose(&unit_frame(), Vec3::ZERO, Vec3::new(1.0, f32::INFINITY, 1.0), 0.0);
        assert!(t.normal().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(0.0), Ok(1.0));
        assert_eq!(scale_factor(-100.0), Ok(0.0));
        assert!((scale_factor(25.0).unwrap() - 1.25).abs() < EPS);
        assert!(scale_factor(f32::NAN).is_err());
    }

    #[test]
    fn test_bitangent_is_right_handed() {
        let frame = Frame {
            tangent: Vec3::Z,
            normal: Vec3::X,
        };
        let t = compose(&frame, Vec3::ZERO, Vec3::ONE, 0.0);
        // Z x X = Y
        assert!(t.bitangent().abs_diff_eq(Vec3::Y, EPS));
    }
}
