use glam::{Mat4, Vec3};

use super::modifiers::DragMode;
use super::surface::SurfaceHit;
use crate::error::AlignError;

/// Orientation of the duplicate before scaling: tangent is local X,
/// normal is local Y. Both unit length and perpendicular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Local Z axis, `normalize(tangent x normal)`
    pub fn bitangent(&self) -> Vec3 {
        self.tangent.cross(self.normal).normalize_or_zero()
    }
}

/// Build the orientation frame for a hit.
///
/// With `rotation_enabled` the frame follows the surface; otherwise it is
/// read from the X and Y axes of the source's original matrix. In
/// `RotateOnly` mode the tangent is then spun about the normal by
/// `extra_rotation_degrees`; a non-finite angle leaves it unrotated.
pub fn build_frame(
    hit: &SurfaceHit,
    rotation_enabled: bool,
    source_matrix: &Mat4,
    extra_rotation_degrees: f32,
    mode: DragMode,
) -> Frame {
    let (tangent, normal) = if rotation_enabled {
        (hit.tangent, hit.normal)
    } else {
        (source_matrix.x_axis.truncate(), source_matrix.y_axis.truncate())
    };

    let normal = normal.try_normalize().unwrap_or(Vec3::Y);
    let mut tangent = orthogonalize(tangent, normal);

    if mode == DragMode::RotateOnly {
        match rotate_about_axis(tangent, normal, extra_rotation_degrees) {
            Ok(rotated) => tangent = orthogonalize(rotated, normal),
            Err(e) => tracing::debug!("Tangent left unrotated: {e}"),
        }
    }

    Frame { tangent, normal }
}

/// Rotate `v` about the unit `axis` by `degrees` (Rodrigues' formula).
///
/// Same result as applying the quaternion `(axis * sin(θ/2), cos(θ/2))`.
pub fn rotate_about_axis(v: Vec3, axis: Vec3, degrees: f32) -> Result<Vec3, AlignError> {
    if !degrees.is_finite() {
        return Err(AlignError::NumericFault("rotation angle"));
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    Ok(v * cos + axis.cross(v) * sin + axis * axis.dot(v) * (1.0 - cos))
}

/// Normalized mean of per-vertex tangents, `None` if they cancel out or the
/// list is empty.
pub fn average_tangent(tangents: &[Vec3]) -> Option<Vec3> {
    if tangents.is_empty() {
        return None;
    }
    let sum: Vec3 = tangents.iter().copied().sum();
    (sum / tangents.len() as f32).try_normalize()
}

/// Remove the component of `tangent` along `normal`, falling back to an
/// arbitrary perpendicular when the two are parallel.
fn orthogonalize(tangent: Vec3, normal: Vec3) -> Vec3 {
    (tangent - normal * normal.dot(tangent))
        .try_normalize()
        .unwrap_or_else(|| normal.any_orthonormal_vector())
}
