//! Surface alignment engine.
//!
//! Turns a resolved surface hit plus the drag deltas of the current gesture
//! into the 16-value transform applied to the duplicated object.

pub mod compose;
pub mod drag_angle;
pub mod frame;
pub mod modifiers;
pub mod snap;
pub mod surface;

pub use compose::{compose, scale_factor, ComposedTransform};
pub use drag_angle::DragSample;
pub use frame::{build_frame, rotate_about_axis, Frame};
pub use modifiers::{classify, DragMode, ModifierState};
pub use snap::nearest_vertex;
pub use surface::{resolve_hit, SurfaceHit};
