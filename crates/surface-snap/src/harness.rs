//! Headless host and test harness.
//!
//! `HeadlessHost` implements the application services over an in-memory
//! scene and an arc-ball viewport. `TestHarness` wraps it with a tool
//! context for integration tests and the command protocol.

use egui::{Pos2, PointerButton};
use glam::{Mat4, Vec3};
use shared::{ObjectDescription, ObjectId, SceneDescription, ToolOptions};

use crate::align::{ComposedTransform, ModifierState};
use crate::error::Result;
use crate::host::{RayHit, SceneMutation, Space, SurfaceQuery, ViewportProjection};
use crate::input::InputEvent;
use crate::invocation::ToolInvocation;
use crate::scene::{SceneObject, SceneStore};
use crate::state::ToolSettings;
use crate::tool::{DuplicateOverSurfaceTool, ToolOutcome, ToolState};
use crate::validation::TransformValidator;
use crate::viewport::camera::Viewport;
use crate::viewport::picking::Ray;

/// In-memory application: scene, viewport and a redraw counter
pub struct HeadlessHost {
    pub scene: SceneStore,
    pub viewport: Viewport,
    refresh_count: usize,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::with_settings(&ToolSettings::default())
    }

    pub fn with_settings(settings: &ToolSettings) -> Self {
        let mut scene = SceneStore::new();
        scene.max_ray_distance = settings.query.max_ray_distance;
        Self {
            scene,
            viewport: settings.viewport.build(),
            refresh_count: 0,
        }
    }

    /// Number of redraws requested so far
    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }
}

impl ViewportProjection for HeadlessHost {
    fn screen_to_world_ray(&self, pos: Pos2) -> Ray {
        self.viewport.screen_to_world_ray(pos)
    }
}

impl SurfaceQuery for HeadlessHost {
    fn target_under(&self, pos: Pos2) -> Option<ObjectId> {
        self.scene.object_along(&self.screen_to_world_ray(pos))
    }

    fn intersect(&self, target: &str, ray: &Ray, space: Space) -> Option<RayHit> {
        self.scene.intersect(target, ray, space)
    }

    fn closest_normal(&self, target: &str, point: Vec3, space: Space) -> Option<Vec3> {
        self.scene.closest_normal(target, point, space)
    }

    fn face_vertex_tangents(&self, target: &str, face_id: usize, space: Space) -> Vec<Vec3> {
        self.scene.face_vertex_tangents(target, face_id, space)
    }

    fn face_polygon_vertices(&self, target: &str, face_id: usize) -> Vec<usize> {
        self.scene.face_polygon_vertices(target, face_id)
    }

    fn vertex_position(&self, target: &str, index: usize, space: Space) -> Option<Vec3> {
        self.scene.vertex_position(target, index, space)
    }
}

impl SceneMutation for HeadlessHost {
    fn exists(&self, object: &str) -> bool {
        self.scene.get(object).is_some()
    }

    fn duplicate(&mut self, source: &str, as_instance: bool) -> Result<ObjectId> {
        self.scene.duplicate(source, as_instance)
    }

    fn scale(&self, object: &str) -> Option<Vec3> {
        self.scene.get(object).map(SceneObject::scale)
    }

    fn world_matrix(&self, object: &str) -> Option<Mat4> {
        self.scene.get(object).map(|o| o.matrix)
    }

    fn rotate_pivot_world(&self, object: &str) -> Option<Vec3> {
        self.scene.rotate_pivot_world(object)
    }

    fn set_translation(&mut self, object: &str, translation: Vec3) -> Result<()> {
        self.scene.set_translation(object, translation)
    }

    fn set_matrix(&mut self, object: &str, matrix: Mat4) -> Result<()> {
        self.scene.set_matrix(object, matrix)
    }

    fn set_shear(&mut self, object: &str, shear: Vec3) -> Result<()> {
        self.scene.set_shear(object, shear)
    }

    fn freeze_translation(&mut self, object: &str) -> Result<()> {
        self.scene.freeze_translation(object)
    }

    fn delete(&mut self, object: &str) -> Result<()> {
        self.scene.remove(object).map(drop)
    }

    fn refresh(&mut self) {
        self.refresh_count += 1;
    }
}

/// Headless test harness: host plus the active tool
pub struct TestHarness {
    pub host: HeadlessHost,
    pub settings: ToolSettings,
    tool: Option<DuplicateOverSurfaceTool>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Create a new empty harness.
    pub fn new() -> Self {
        Self::with_settings(ToolSettings::default())
    }

    pub fn with_settings(settings: ToolSettings) -> Self {
        Self {
            host: HeadlessHost::with_settings(&settings),
            settings,
            tool: None,
        }
    }

    // ── Scene ─────────────────────────────────────────────────

    /// Load a scene (replaces current). Any active tool is dropped.
    pub fn load_scene(&mut self, scene: &SceneDescription) -> Result<()> {
        self.host.scene.load(scene)?;
        self.tool = None;
        Ok(())
    }

    /// Load a scene from JSON string
    pub fn load_scene_json(&mut self, json: &str) -> std::result::Result<(), String> {
        let scene: SceneDescription =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        self.load_scene(&scene).map_err(|e| e.to_string())
    }

    /// Add one object; returns its final (possibly renamed) id
    pub fn add_object(&mut self, desc: &ObjectDescription) -> Result<ObjectId> {
        Ok(self.host.scene.insert(SceneObject::from_description(desc)?))
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.host.scene.get(name)
    }

    pub fn object_count(&self) -> usize {
        self.host.scene.len()
    }

    /// Screen position of a world point in the harness viewport
    pub fn screen_pos(&self, world: Vec3) -> Option<Pos2> {
        self.host.viewport.project(world)
    }

    // ── Tool ──────────────────────────────────────────────────

    /// Activate from command arguments, replacing any previous activation.
    pub fn activate(&mut self, args: &[&str]) -> Result<()> {
        let invocation = ToolInvocation::parse(args, &self.settings.defaults)?;
        self.activate_with(invocation)
    }

    pub fn activate_with(&mut self, invocation: ToolInvocation) -> Result<()> {
        self.tool = None;
        self.tool = Some(DuplicateOverSurfaceTool::activate(&self.host, invocation)?);
        Ok(())
    }

    /// Activate for `source` with explicit options
    pub fn activate_for(&mut self, source: &str, options: ToolOptions) -> Result<()> {
        self.activate_with(ToolInvocation::new(source, options))
    }

    pub fn tool(&self) -> Option<&DuplicateOverSurfaceTool> {
        self.tool.as_ref()
    }

    /// `None` before the first activation
    pub fn tool_state(&self) -> Option<ToolState> {
        self.tool.as_ref().map(DuplicateOverSurfaceTool::state)
    }

    pub fn placed(&self) -> &[ObjectId] {
        self.tool.as_ref().map(|t| t.placed()).unwrap_or(&[])
    }

    /// Transform applied by the live session, if any
    pub fn current_transform(&self) -> Option<ComposedTransform> {
        self.tool.as_ref()?.session().map(|s| s.last_transform())
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<ToolOutcome> {
        match self.tool.as_mut() {
            Some(tool) => tool.handle_event(&mut self.host, event),
            None => Ok(ToolOutcome::Ignored),
        }
    }

    pub fn press(&mut self, pos: Pos2, modifiers: ModifierState) -> Result<ToolOutcome> {
        self.handle(InputEvent::press(pos, modifiers))
    }

    pub fn press_button(
        &mut self,
        pos: Pos2,
        button: PointerButton,
        modifiers: ModifierState,
    ) -> Result<ToolOutcome> {
        self.handle(InputEvent::Press { pos, button, modifiers })
    }

    /// Press at the screen position of a world point. Points behind the
    /// camera count as a miss.
    pub fn press_at(&mut self, world: Vec3, modifiers: ModifierState) -> Result<ToolOutcome> {
        match self.screen_pos(world) {
            Some(pos) => self.press(pos, modifiers),
            None => Ok(ToolOutcome::NoSurface),
        }
    }

    pub fn drag(&mut self, pos: Pos2, modifiers: ModifierState) -> Result<ToolOutcome> {
        self.handle(InputEvent::drag(pos, modifiers))
    }

    pub fn release(&mut self) -> Result<ToolOutcome> {
        self.handle(InputEvent::Release)
    }

    /// Middle-button press: exit the tool
    pub fn cancel(&mut self) -> Result<ToolOutcome> {
        self.handle(InputEvent::cancel(Pos2::ZERO))
    }

    // ── Validation ────────────────────────────────────────────

    /// Problems with an object's matrix as a placement transform
    pub fn validate_object(&self, name: &str) -> Vec<String> {
        match self.object(name) {
            Some(obj) => {
                let mut errors = TransformValidator::from_mat4(&obj.matrix).validate_all();
                if obj.shear != Vec3::ZERO {
                    errors.push(format!("Shear {:?} is not zero", obj.shear));
                }
                errors
            }
            None => vec![format!("Object {name} not found")],
        }
    }
}
