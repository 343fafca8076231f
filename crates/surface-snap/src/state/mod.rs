pub mod settings;

pub use settings::{QuerySettings, ToolSettings, ViewportSettings};
