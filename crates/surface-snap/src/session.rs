//! Press → drag* → release lifecycle of one placed duplicate.

use egui::Pos2;
use glam::{Mat4, Vec3};
use serde::Serialize;
use shared::{ObjectId, ToolOptions};
use uuid::Uuid;

use crate::align::{
    build_frame, classify, compose, drag_angle, resolve_hit, ComposedTransform, DragMode,
    ModifierState,
};
use crate::error::{AlignError, Result, ToolError};
use crate::host::Host;

/// Source object state captured at press time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSnapshot {
    pub original_scale: Vec3,
    pub original_matrix: Mat4,
}

impl SourceSnapshot {
    pub fn capture<H: Host + ?Sized>(host: &H, source: &str) -> Result<Self> {
        let missing = || ToolError::ObjectNotFound(source.to_string());
        Ok(Self {
            original_scale: host.scale(source).ok_or_else(missing)?,
            original_matrix: host.world_matrix(source).ok_or_else(missing)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Duplicate placed, no drag event yet
    Armed,
    Dragging,
}

/// State of one gesture. Created by a successful press, consumed by release.
#[derive(Debug, Clone)]
pub struct DragSession {
    id: Uuid,
    source: ObjectId,
    target: ObjectId,
    duplicate: ObjectId,
    snapshot: SourceSnapshot,
    rotation_enabled: bool,
    instance_mode: bool,
    anchor: Pos2,
    /// Zero reference of the rotate/scale measurement
    reference: Pos2,
    is_first_drag_sample: bool,
    active_mode: DragMode,
    angle_degrees: f32,
    scale_delta: f32,
    last_transform: ComposedTransform,
    phase: SessionPhase,
}

impl DragSession {
    /// Duplicate `source` onto the surface under `pos`.
    ///
    /// Returns `Align(NoIntersection)` without touching the scene when nothing
    /// is under the pointer.
    pub fn press<H: Host + ?Sized>(
        host: &mut H,
        source: &str,
        options: &ToolOptions,
        pos: Pos2,
        modifiers: ModifierState,
    ) -> Result<Self> {
        let mode = classify(modifiers);
        let target = host.target_under(pos).ok_or(AlignError::NoIntersection)?;
        let snapshot = SourceSnapshot::capture(&*host, source)?;

        let ray = host.screen_to_world_ray(pos);
        let hit = resolve_hit(&*host, &target, &ray, mode == DragMode::VertexSnap)?;
        let frame = build_frame(&hit, options.rotation, &snapshot.original_matrix, 0.0, mode);
        let transform = compose(&frame, hit.point, snapshot.original_scale, 0.0);

        let duplicate = host.duplicate(source, options.instance_leaf)?;
        if let Err(e) = settle_duplicate(host, &duplicate, options.instance_leaf, &transform) {
            tracing::warn!("Removing half-placed {duplicate}: {e}");
            if let Err(cleanup) = host.delete(&duplicate) {
                tracing::error!("Failed to remove {duplicate}: {cleanup}");
            }
            return Err(e);
        }
        host.refresh();

        let session = Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            target,
            duplicate,
            snapshot,
            rotation_enabled: options.rotation,
            instance_mode: options.instance_leaf,
            anchor: pos,
            reference: pos,
            is_first_drag_sample: true,
            active_mode: mode,
            angle_degrees: 0.0,
            scale_delta: 0.0,
            last_transform: transform,
            phase: SessionPhase::Armed,
        };
        tracing::info!(
            session = %session.id,
            "Placed {} on {} at {:?}",
            session.duplicate,
            session.target,
            hit.point
        );
        Ok(session)
    }

    /// Recompute and apply the duplicate's transform for a pointer move.
    ///
    /// `Align` errors leave the duplicate and the drag values unchanged.
    pub fn drag<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        pos: Pos2,
        modifiers: ModifierState,
    ) -> Result<ComposedTransform> {
        self.phase = SessionPhase::Dragging;

        let mode = classify(modifiers);
        if mode != self.active_mode {
            self.active_mode = mode;
            self.is_first_drag_sample = true;
        }
        if mode.holds_position() && self.is_first_drag_sample {
            self.reference = pos;
            self.is_first_drag_sample = false;
        }

        let (angle_degrees, scale_delta) = self.measure(pos, mode);

        let query_pos = if mode.holds_position() { self.reference } else { pos };
        let ray = host.screen_to_world_ray(query_pos);
        let hit = resolve_hit(&*host, &self.target, &ray, mode == DragMode::VertexSnap)?;

        let frame = build_frame(
            &hit,
            self.rotation_enabled,
            &self.snapshot.original_matrix,
            angle_degrees,
            mode,
        );
        let transform = compose(&frame, hit.point, self.snapshot.original_scale, scale_delta);

        host.set_matrix(&self.duplicate, transform.to_mat4())?;
        host.set_shear(&self.duplicate, Vec3::ZERO)?;
        host.refresh();

        self.angle_degrees = angle_degrees;
        self.scale_delta = scale_delta;
        self.last_transform = transform;
        tracing::debug!(
            session = %self.id,
            ?mode,
            angle_degrees,
            scale_delta,
            "Moved {}",
            self.duplicate
        );
        Ok(transform)
    }

    /// Angle and scale delta for this step, with the mode's suppression applied.
    fn measure(&self, pos: Pos2, mode: DragMode) -> (f32, f32) {
        let (angle, offset) = match drag_angle::compute(self.reference, pos) {
            Ok(sample) => (sample.angle_degrees, sample.offset),
            Err(e) => {
                tracing::debug!(session = %self.id, "Keeping previous drag values: {e}");
                (self.angle_degrees, self.scale_delta)
            }
        };
        match mode {
            DragMode::RotateOnly => (angle, 0.0),
            DragMode::ScaleOnly => (0.0, offset),
            DragMode::Free | DragMode::VertexSnap => (0.0, 0.0),
        }
    }

    /// End the gesture; the duplicate stays in the scene as placed.
    pub fn release(self) -> ObjectId {
        tracing::info!(session = %self.id, "Released {}", self.duplicate);
        self.duplicate
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Mesh locked in at press time
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn duplicate(&self) -> &str {
        &self.duplicate
    }

    pub fn snapshot(&self) -> &SourceSnapshot {
        &self.snapshot
    }

    pub fn is_instance(&self) -> bool {
        self.instance_mode
    }

    pub fn anchor(&self) -> Pos2 {
        self.anchor
    }

    pub fn reference(&self) -> Pos2 {
        self.reference
    }

    pub fn mode(&self) -> DragMode {
        self.active_mode
    }

    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn scale_delta(&self) -> f32 {
        self.scale_delta
    }

    pub fn last_transform(&self) -> ComposedTransform {
        self.last_transform
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}

/// Move the pivot onto the origin, bake it (copies only) and apply `transform`.
fn settle_duplicate<H: Host + ?Sized>(
    host: &mut H,
    duplicate: &str,
    instance: bool,
    transform: &ComposedTransform,
) -> Result<()> {
    host.set_translation(duplicate, Vec3::ZERO)?;
    if let Some(pivot) = host.rotate_pivot_world(duplicate) {
        host.set_translation(duplicate, -pivot)?;
    }
    if !instance {
        host.freeze_translation(duplicate)?;
    }
    host.set_matrix(duplicate, transform.to_mat4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::harness::HeadlessHost;
    use crate::host::{RayHit, SceneMutation, Space, SurfaceQuery, ViewportProjection};
    use crate::viewport::picking::Ray;

    const EPS: f32 = 1e-3;

    fn host() -> HeadlessHost {
        let mut host = HeadlessHost::new();
        host.scene.load(&fixtures::surface_scene()).unwrap();
        host
    }

    fn screen(host: &HeadlessHost, p: Vec3) -> Pos2 {
        host.viewport.project(p).unwrap()
    }

    #[test]
    fn test_press_places_duplicate_on_surface() {
        let mut h = host();
        let pos = screen(&h, Vec3::new(1.0, 0.0, 1.0));
        let s = DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
            .unwrap();

        assert_eq!(s.target(), "ground");
        assert_eq!(s.phase(), SessionPhase::Armed);
        assert!(s.last_transform().translation().abs_diff_eq(Vec3::new(1.0, 0.0, 1.0), EPS));
        let obj = h.scene.get(s.duplicate()).unwrap();
        assert_eq!(obj.matrix, s.last_transform().to_mat4());
    }

    #[test]
    fn test_press_without_surface_has_no_side_effects() {
        let mut h = host();
        let before = h.scene.len();
        let err = DragSession::press(
            &mut h,
            "pCube1",
            &ToolOptions::default(),
            egui::pos2(1.0, 1.0),
            ModifierState::NONE,
        )
        .unwrap_err();
        assert_eq!(err, ToolError::Align(AlignError::NoIntersection));
        assert_eq!(h.scene.len(), before);
        assert_eq!(h.refresh_count(), 0);
    }

    #[test]
    fn test_press_unknown_source() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let err = DragSession::press(&mut h, "nope", &ToolOptions::default(), pos, ModifierState::NONE)
            .unwrap_err();
        assert_eq!(err, ToolError::ObjectNotFound("nope".into()));
    }

    #[test]
    fn test_rotate_only_reference_is_first_sample() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let mut s =
            DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
                .unwrap();

        let first = pos + egui::vec2(30.0, 5.0);
        s.drag(&mut h, first, ModifierState::CTRL).unwrap();
        assert_eq!(s.reference(), first);
        assert_eq!(s.mode(), DragMode::RotateOnly);
        assert_eq!(s.angle_degrees(), 0.0);

        // straight down from the reference: acos(0) = 90°
        s.drag(&mut h, first + egui::vec2(0.0, 40.0), ModifierState::CTRL).unwrap();
        assert!((s.angle_degrees() - 90.0).abs() < EPS);
        assert_eq!(s.scale_delta(), 0.0);
        assert_eq!(s.reference(), first);
    }

    #[test]
    fn test_scale_only_uses_horizontal_offset() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let mut s =
            DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
                .unwrap();

        s.drag(&mut h, pos, ModifierState::SHIFT).unwrap();
        let t = s.drag(&mut h, pos + egui::vec2(50.0, 20.0), ModifierState::SHIFT).unwrap();
        assert_eq!(s.scale_delta(), 50.0);
        assert_eq!(s.angle_degrees(), 0.0);

        // source scale (2, 3, 4) times 1.5
        let scale = Vec3::new(t.tangent().length(), t.normal().length(), t.bitangent().length());
        assert!(scale.abs_diff_eq(Vec3::new(3.0, 4.5, 6.0), EPS));
        // position held at the reference point
        assert!(t.translation().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn test_drag_off_surface_keeps_last_transform() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let mut s =
            DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
                .unwrap();
        let placed = s.last_transform();

        let err = s.drag(&mut h, egui::pos2(1.0, 1.0), ModifierState::NONE).unwrap_err();
        assert_eq!(err, ToolError::Align(AlignError::NoIntersection));
        assert_eq!(s.last_transform(), placed);
        assert_eq!(h.scene.get(s.duplicate()).unwrap().matrix, placed.to_mat4());
    }

    #[test]
    fn test_release_returns_duplicate() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let s = DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
            .unwrap();
        let dup = s.duplicate().to_string();
        assert_eq!(s.release(), dup);
        assert!(h.scene.get(&dup).is_some());
    }

    #[test]
    fn test_rotate_only_back_at_reference_keeps_angle() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let mut s =
            DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
                .unwrap();

        s.drag(&mut h, pos, ModifierState::CTRL).unwrap();
        let turned = s.drag(&mut h, pos + egui::vec2(0.0, 30.0), ModifierState::CTRL).unwrap();
        assert!((s.angle_degrees() - 90.0).abs() < EPS);

        let back = s.drag(&mut h, pos, ModifierState::CTRL).unwrap();
        assert!((s.angle_degrees() - 90.0).abs() < EPS);
        assert_eq!(s.scale_delta(), 0.0);
        assert!(back.tangent().abs_diff_eq(turned.tangent(), EPS));
    }

    #[test]
    fn test_scale_only_back_at_reference_keeps_offset() {
        let mut h = host();
        let pos = screen(&h, Vec3::ZERO);
        let mut s =
            DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
                .unwrap();

        s.drag(&mut h, pos, ModifierState::SHIFT).unwrap();
        s.drag(&mut h, pos + egui::vec2(50.0, 0.0), ModifierState::SHIFT).unwrap();
        assert_eq!(s.scale_delta(), 50.0);

        let t = s.drag(&mut h, pos, ModifierState::SHIFT).unwrap();
        assert_eq!(s.scale_delta(), 50.0);
        assert_eq!(s.angle_degrees(), 0.0);
        let scale = Vec3::new(t.tangent().length(), t.normal().length(), t.bitangent().length());
        assert!(scale.abs_diff_eq(Vec3::new(3.0, 4.5, 6.0), EPS));
    }

    /// Headless host whose translate freeze always fails
    struct FrozenFails(HeadlessHost);

    impl ViewportProjection for FrozenFails {
        fn screen_to_world_ray(&self, pos: Pos2) -> Ray {
            self.0.screen_to_world_ray(pos)
        }
    }

    impl SurfaceQuery for FrozenFails {
        fn target_under(&self, pos: Pos2) -> Option<ObjectId> {
            self.0.target_under(pos)
        }
        fn intersect(&self, target: &str, ray: &Ray, space: Space) -> Option<RayHit> {
            self.0.intersect(target, ray, space)
        }
        fn closest_normal(&self, target: &str, point: Vec3, space: Space) -> Option<Vec3> {
            self.0.closest_normal(target, point, space)
        }
        fn face_vertex_tangents(&self, target: &str, face_id: usize, space: Space) -> Vec<Vec3> {
            self.0.face_vertex_tangents(target, face_id, space)
        }
        fn face_polygon_vertices(&self, target: &str, face_id: usize) -> Vec<usize> {
            self.0.face_polygon_vertices(target, face_id)
        }
        fn vertex_position(&self, target: &str, index: usize, space: Space) -> Option<Vec3> {
            self.0.vertex_position(target, index, space)
        }
    }

    impl SceneMutation for FrozenFails {
        fn exists(&self, object: &str) -> bool {
            self.0.exists(object)
        }
        fn duplicate(&mut self, source: &str, as_instance: bool) -> Result<ObjectId> {
            self.0.duplicate(source, as_instance)
        }
        fn scale(&self, object: &str) -> Option<Vec3> {
            self.0.scale(object)
        }
        fn world_matrix(&self, object: &str) -> Option<Mat4> {
            self.0.world_matrix(object)
        }
        fn rotate_pivot_world(&self, object: &str) -> Option<Vec3> {
            self.0.rotate_pivot_world(object)
        }
        fn set_translation(&mut self, object: &str, translation: Vec3) -> Result<()> {
            self.0.set_translation(object, translation)
        }
        fn set_matrix(&mut self, object: &str, matrix: Mat4) -> Result<()> {
            self.0.set_matrix(object, matrix)
        }
        fn set_shear(&mut self, object: &str, shear: Vec3) -> Result<()> {
            self.0.set_shear(object, shear)
        }
        fn freeze_translation(&mut self, object: &str) -> Result<()> {
            Err(ToolError::InstanceFreeze(object.to_string()))
        }
        fn delete(&mut self, object: &str) -> Result<()> {
            self.0.delete(object)
        }
        fn refresh(&mut self) {
            self.0.refresh()
        }
    }

    #[test]
    fn test_failed_press_removes_duplicate() {
        let mut h = FrozenFails(host());
        let pos = screen(&h.0, Vec3::ZERO);
        let before = h.0.scene.len();

        let err = DragSession::press(&mut h, "pCube1", &ToolOptions::default(), pos, ModifierState::NONE)
            .unwrap_err();
        assert_eq!(err, ToolError::InstanceFreeze("pCube2".into()));
        assert_eq!(h.0.scene.len(), before);
        assert!(h.0.scene.get("pCube2").is_none());
        assert_eq!(h.0.refresh_count(), 0);
    }
}
