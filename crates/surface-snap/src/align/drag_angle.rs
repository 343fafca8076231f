use egui::Pos2;

use crate::error::AlignError;

/// Screen-space measurement of the pointer against a reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Raw horizontal displacement in pixels; feeds the scale delta (percent)
    pub offset: f32,
    /// Rotation in degrees, in [-180, 180]
    pub angle_degrees: f32,
}

/// Measure the pointer at `current` against `anchor`.
///
/// The angle is `acos(dx / length)`, negated when `dy < 0`. It only tracks
/// the horizontal share of the displacement, so it saturates towards 0° for
/// purely rightward motion and towards 180° for purely leftward motion; it
/// is not a polar angle.
///
/// Zero displacement has no direction and yields `DegenerateDrag`; callers
/// keep their previous values in that case.
pub fn compute(anchor: Pos2, current: Pos2) -> Result<DragSample, AlignError> {
    let delta = current - anchor;
    let length = delta.length();

    if length == 0.0 {
        return Err(AlignError::DegenerateDrag);
    }
    if !length.is_finite() {
        return Err(AlignError::NumericFault("pointer position"));
    }

    let cos = (delta.x / length).clamp(-1.0, 1.0);
    let mut angle_degrees = cos.acos().to_degrees();
    if delta.y < 0.0 {
        angle_degrees = -angle_degrees;
    }

    Ok(DragSample {
        offset: delta.x,
        angle_degrees,
    })
}
