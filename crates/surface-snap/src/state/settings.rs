//! Tool settings

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::ToolOptions;

use crate::viewport::camera::{ArcBallCamera, Viewport};

/// Headless viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
    /// Camera orbit angles (radians)
    pub yaw: f32,
    pub pitch: f32,
    /// Distance from camera to target
    pub distance: f32,
    /// Point the camera orbits
    pub target: [f32; 3],
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            yaw: 0.6,
            pitch: 0.9,
            distance: 12.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl ViewportSettings {
    pub fn build(&self) -> Viewport {
        let camera = ArcBallCamera::looking_at(
            Vec3::from_array(self.target),
            self.yaw,
            self.pitch,
            self.distance,
        );
        Viewport::new(camera, self.width, self.height)
    }
}

/// Surface query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Hits further along the pointer ray are ignored
    pub max_ray_distance: f32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            max_ray_distance: 99_999.0,
        }
    }
}

fn default_log_filter() -> String {
    "surface_snap=info".to_string()
}

/// All tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Option values used when an invocation omits a flag
    #[serde(default)]
    pub defaults: ToolOptions,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub query: QuerySettings,
    /// Tracing filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            defaults: ToolOptions::default(),
            viewport: ViewportSettings::default(),
            query: QuerySettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl ToolSettings {
    /// Location of `settings.json` in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "surface-snap", "surface-snap")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config file, or return default if not found.
    /// A file that does not parse is an error.
    pub fn load() -> Result<Self, String> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| format!("Ignoring {}: {e}", path.display())),
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"defaults": {"instance_leaf": true}, "query": {"max_ray_distance": 50.0}}"#;
        let s: ToolSettings = serde_json::from_str(json).unwrap();
        assert!(s.defaults.rotation);
        assert!(s.defaults.instance_leaf);
        assert_eq!(s.query.max_ray_distance, 50.0);
        assert_eq!(s.viewport, ViewportSettings::default());
        assert_eq!(s.log_filter, "surface_snap=info");
    }

    #[test]
    fn test_viewport_build() {
        let vp = ViewportSettings::default().build();
        assert_eq!(vp.rect.width(), 800.0);
        assert_eq!(vp.rect.height(), 600.0);
        assert_eq!(vp.camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("surface-snap-no-such-dir/settings.json");
        assert_eq!(ToolSettings::load_from(&path).unwrap(), ToolSettings::default());
    }

    #[test]
    fn test_load_from_corrupt_file_is_error() {
        let path = std::env::temp_dir().join(format!("surface-snap-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = ToolSettings::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.unwrap_err().starts_with("Ignoring "));
    }
}
