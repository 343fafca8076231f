//! Services the tool consumes from the 3D application.
//!
//! The engine never touches scene data directly: ray casts, normal and
//! tangent lookups, duplication and attribute writes all go through these
//! traits. `crate::harness::HeadlessHost` implements them in memory.

use egui::Pos2;
use glam::{Mat4, Vec3};
use shared::ObjectId;

use crate::error::Result;
use crate::viewport::picking::Ray;

/// Coordinate space of a surface query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Space {
    #[default]
    World,
    Object,
}

/// Raw ray/mesh intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub face_id: usize,
}

/// Screen to world conversion of the active view
pub trait ViewportProjection {
    fn screen_to_world_ray(&self, pos: Pos2) -> Ray;
}

/// Mesh queries against target geometry
pub trait SurfaceQuery {
    /// Mesh object under the given screen position, if any
    fn target_under(&self, pos: Pos2) -> Option<ObjectId>;

    /// Closest intersection of `ray` with the target mesh
    fn intersect(&self, target: &str, ray: &Ray, space: Space) -> Option<RayHit>;

    /// Normal of the surface closest to `point`
    fn closest_normal(&self, target: &str, point: Vec3, space: Space) -> Option<Vec3>;

    /// Tangent reported by each vertex of a face
    fn face_vertex_tangents(&self, target: &str, face_id: usize, space: Space) -> Vec<Vec3>;

    /// Vertex indices of a polygon
    fn face_polygon_vertices(&self, target: &str, face_id: usize) -> Vec<usize>;

    fn vertex_position(&self, target: &str, index: usize, space: Space) -> Option<Vec3>;
}

/// Scene graph reads and writes
pub trait SceneMutation {
    fn exists(&self, object: &str) -> bool;

    /// Duplicate `source`, sharing its geometry when `as_instance` is set
    fn duplicate(&mut self, source: &str, as_instance: bool) -> Result<ObjectId>;

    fn scale(&self, object: &str) -> Option<Vec3>;

    fn world_matrix(&self, object: &str) -> Option<Mat4>;

    fn rotate_pivot_world(&self, object: &str) -> Option<Vec3>;

    fn set_translation(&mut self, object: &str, translation: Vec3) -> Result<()>;

    fn set_matrix(&mut self, object: &str, matrix: Mat4) -> Result<()>;

    fn set_shear(&mut self, object: &str, shear: Vec3) -> Result<()>;

    /// Bake the translate channel. Fails for instances.
    fn freeze_translation(&mut self, object: &str) -> Result<()>;

    fn delete(&mut self, object: &str) -> Result<()>;

    /// Redraw the active view
    fn refresh(&mut self) {}
}

/// Everything a drag session needs from the application
pub trait Host: SurfaceQuery + ViewportProjection + SceneMutation {}

impl<T: SurfaceQuery + ViewportProjection + SceneMutation> Host for T {}
