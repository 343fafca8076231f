// Library crate: the surface alignment engine, the drag session and tool
// context, plus a headless host used by integration tests and the script
// runner binary.

pub mod align;
pub mod command;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod host;
pub mod input;
pub mod invocation;
pub mod scene;
pub mod session;
pub mod state;
pub mod tool;
pub mod validation;
pub mod viewport;

pub use error::{AlignError, Result, ToolError};
pub use session::DragSession;
pub use tool::{DuplicateOverSurfaceTool, ToolOutcome, ToolState};
