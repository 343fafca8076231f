//! JSON command protocol for scripted sessions.
//!
//! Each command drives the headless harness: load a scene, activate the
//! tool, feed pointer events and inspect the result.

use serde::{Deserialize, Serialize};
use shared::{ObjectDescription, SceneDescription};

use crate::align::ModifierState;
use crate::harness::TestHarness;
use crate::input::{Button, InputEvent};

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ToolCommand {
    /// Replace the scene
    LoadScene { scene: SceneDescription },
    /// Add one object to the scene
    AddObject { object: ObjectDescription },
    /// Activate the tool with command arguments, e.g. `["pCube1", "-r", "false"]`
    Activate { args: Vec<String> },
    /// Pointer press at a screen position
    Press {
        pos: [f32; 2],
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: ModifierState,
    },
    /// Pointer move with the button held
    Drag {
        pos: [f32; 2],
        #[serde(default)]
        modifiers: ModifierState,
    },
    Release,
    /// Middle-button press
    Exit,
    /// Screen position of a world point
    Project { point: [f32; 3] },
    /// Tool state and all scene objects
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn from_result<T: Serialize, E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(data) => Self::ok_with_data(data),
                Err(e) => Self::err(format!("Serialization error: {e}")),
            },
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: ToolCommand) -> CommandResponse {
    match cmd {
        ToolCommand::LoadScene { scene } => match harness.load_scene(&scene) {
            Ok(()) => {
                CommandResponse::ok_with_data(serde_json::json!({ "object_count": harness.object_count() }))
            }
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ToolCommand::AddObject { object } => match harness.add_object(&object) {
            Ok(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        ToolCommand::Activate { args } => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            match harness.activate(&args) {
                Ok(()) => CommandResponse::ok(),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        ToolCommand::Press {
            pos,
            button,
            modifiers,
        } => CommandResponse::from_result(harness.handle(InputEvent::Press {
            pos: pos.into(),
            button: button.into(),
            modifiers,
        })),

        ToolCommand::Drag { pos, modifiers } => {
            CommandResponse::from_result(harness.drag(pos.into(), modifiers))
        }

        ToolCommand::Release => CommandResponse::from_result(harness.release()),

        ToolCommand::Exit => CommandResponse::from_result(harness.cancel()),

        ToolCommand::Project { point } => match harness.screen_pos(point.into()) {
            Some(p) => CommandResponse::ok_with_data(serde_json::json!({ "pos": [p.x, p.y] })),
            None => CommandResponse::err("Point is behind the camera"),
        },

        ToolCommand::Inspect => {
            let objects: Vec<serde_json::Value> = harness
                .host
                .scene
                .objects()
                .iter()
                .map(|obj| {
                    serde_json::json!({
                        "name": obj.name,
                        "instance_of": obj.instance_of,
                        "has_mesh": obj.mesh.is_some(),
                        "translation": obj.translation().to_array(),
                        "scale": obj.scale().to_array(),
                        "shear": obj.shear.to_array(),
                        "matrix": obj.matrix.to_cols_array(),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "tool_state": harness.tool_state(),
                "placed": harness.placed(),
                "object_count": objects.len(),
                "objects": objects,
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: ToolCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ToolCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
