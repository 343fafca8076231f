//! In-memory scene graph backing the headless host.

use std::sync::Arc;

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};
use shared::{ObjectDescription, ObjectId, Primitive, SceneDescription, Transform};

use crate::error::{Result, ToolError};
use crate::host::{RayHit, Space};
use crate::viewport::mesh::{self, MeshData};
use crate::viewport::picking::{closest_polygon, pick_polygon, ray_aabb, Aabb, Ray};

/// A transform node, optionally carrying a mesh
#[derive(Clone, Debug)]
pub struct SceneObject {
    /// Unique name, doubles as the object id
    pub name: ObjectId,
    /// Geometry in object space; shared between an object and its instances
    pub mesh: Option<Arc<MeshData>>,
    /// Source object when this is an instance
    pub instance_of: Option<ObjectId>,
    /// World matrix (scale, rotation, translation)
    pub matrix: Mat4,
    pub shear: Vec3,
    /// Rotate pivot in object space
    pub pivot: Vec3,
    /// Sum of all translations baked into the geometry
    pub frozen_translation: Vec3,
}

impl SceneObject {
    pub fn new(name: impl Into<ObjectId>, mesh: Option<MeshData>, matrix: Mat4) -> Self {
        Self {
            name: name.into(),
            mesh: mesh.map(Arc::new),
            instance_of: None,
            matrix,
            shear: Vec3::ZERO,
            pivot: Vec3::ZERO,
            frozen_translation: Vec3::ZERO,
        }
    }

    pub fn from_description(desc: &ObjectDescription) -> Result<Self> {
        let mesh = desc
            .primitive
            .as_ref()
            .map(primitive_mesh)
            .transpose()
            .map_err(|reason| ToolError::InvalidPrimitive {
                object: desc.name.clone(),
                reason,
            })?;
        let mut obj = Self::new(desc.name.clone(), mesh, transform_matrix(&desc.transform));
        obj.shear = to_vec3(desc.shear);
        obj.pivot = to_vec3(desc.pivot);
        Ok(obj)
    }

    /// Per-axis scale (lengths of the matrix axes)
    pub fn scale(&self) -> Vec3 {
        Vec3::new(
            self.matrix.x_axis.truncate().length(),
            self.matrix.y_axis.truncate().length(),
            self.matrix.z_axis.truncate().length(),
        )
    }

    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    pub fn is_instance(&self) -> bool {
        self.instance_of.is_some()
    }

    fn world_aabb(&self) -> Option<Aabb> {
        let mesh = self.mesh.as_ref()?;
        Aabb::from_points(mesh.positions.iter().map(|p| self.matrix.transform_point3(*p)))
    }

    /// Object-space to `space` conversion of a point
    fn point_to(&self, p: Vec3, space: Space) -> Vec3 {
        match space {
            Space::World => self.matrix.transform_point3(p),
            Space::Object => p,
        }
    }

    fn point_from(&self, p: Vec3, space: Space) -> Vec3 {
        match space {
            Space::World => self.matrix.inverse().transform_point3(p),
            Space::Object => p,
        }
    }

    fn direction_to(&self, v: Vec3, space: Space) -> Vec3 {
        match space {
            Space::World => self.matrix.transform_vector3(v).normalize_or_zero(),
            Space::Object => v,
        }
    }

    fn normal_to(&self, n: Vec3, space: Space) -> Vec3 {
        match space {
            Space::World => {
                let normal_matrix = Mat3::from_mat4(self.matrix).inverse().transpose();
                (normal_matrix * n).normalize_or_zero()
            }
            Space::Object => n,
        }
    }
}

/// Flat list of scene objects
#[derive(Clone, Debug)]
pub struct SceneStore {
    objects: Vec<SceneObject>,
    /// Hits further along the ray than this are ignored
    pub max_ray_distance: f32,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            max_ray_distance: 99_999.0,
        }
    }

    /// Replace the scene content with `scene`. On error the current
    /// content is left untouched.
    pub fn load(&mut self, scene: &SceneDescription) -> Result<()> {
        self.objects = scene
            .objects
            .iter()
            .map(SceneObject::from_description)
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn remove(&mut self, name: &str) -> Result<SceneObject> {
        let index = self
            .objects
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| ToolError::ObjectNotFound(name.to_string()))?;
        Ok(self.objects.remove(index))
    }

    /// Add an object, renaming it if the name is taken. Returns the final name.
    pub fn insert(&mut self, mut object: SceneObject) -> ObjectId {
        if self.get(&object.name).is_some() {
            object.name = self.next_free_name(&object.name);
        }
        let name = object.name.clone();
        self.objects.push(object);
        name
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn require(&self, name: &str) -> Result<&SceneObject> {
        self.get(name).ok_or_else(|| ToolError::ObjectNotFound(name.to_string()))
    }

    fn require_mut(&mut self, name: &str) -> Result<&mut SceneObject> {
        self.get_mut(name).ok_or_else(|| ToolError::ObjectNotFound(name.to_string()))
    }

    /// `pCube1` -> `pCube2`, `pCube3`, ... first name not in use
    pub fn next_free_name(&self, name: &str) -> ObjectId {
        let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n: u64 = name[stem.len()..].parse().unwrap_or(0);
        loop {
            n += 1;
            let candidate = format!("{stem}{n}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Copy `source`; instances share its mesh, copies get their own.
    pub fn duplicate(&mut self, source: &str, as_instance: bool) -> Result<ObjectId> {
        let src = self.require(source)?;
        let mut copy = src.clone();
        copy.name = self.next_free_name(source);
        if as_instance {
            copy.instance_of = Some(src.instance_of.clone().unwrap_or_else(|| src.name.clone()));
        } else {
            copy.instance_of = None;
            copy.mesh = src.mesh.as_ref().map(|m| Arc::new(MeshData::clone(m)));
        }
        Ok(self.insert(copy))
    }

    pub fn set_translation(&mut self, name: &str, translation: Vec3) -> Result<()> {
        let obj = self.require_mut(name)?;
        obj.matrix.w_axis = translation.extend(1.0);
        Ok(())
    }

    pub fn set_matrix(&mut self, name: &str, matrix: Mat4) -> Result<()> {
        self.require_mut(name)?.matrix = matrix;
        Ok(())
    }

    pub fn set_shear(&mut self, name: &str, shear: Vec3) -> Result<()> {
        self.require_mut(name)?.shear = shear;
        Ok(())
    }

    pub fn rotate_pivot_world(&self, name: &str) -> Option<Vec3> {
        self.get(name).map(|o| o.matrix.transform_point3(o.pivot))
    }

    /// Move the translation into the geometry, keeping world positions.
    pub fn freeze_translation(&mut self, name: &str) -> Result<()> {
        let obj = self.require_mut(name)?;
        if obj.is_instance() {
            return Err(ToolError::InstanceFreeze(name.to_string()));
        }

        let translation = obj.translation();
        let linear = Mat3::from_mat4(obj.matrix);
        if linear.determinant().abs() < f32::EPSILON {
            tracing::warn!("Freeze skipped: {name} has a singular matrix");
            return Ok(());
        }
        let offset = linear.inverse() * translation;

        if let Some(mesh) = obj.mesh.as_mut() {
            for p in &mut Arc::make_mut(mesh).positions {
                *p += offset;
            }
        }
        obj.pivot += offset;
        obj.frozen_translation += translation;
        obj.matrix.w_axis = Vec3::ZERO.extend(1.0);
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Nearest mesh object hit by `ray`
    pub fn object_along(&self, ray: &Ray) -> Option<ObjectId> {
        let mut best: Option<(&SceneObject, f32)> = None;

        for obj in &self.objects {
            let Some(aabb) = obj.world_aabb() else {
                continue;
            };
            if ray_aabb(ray, &aabb).is_none() {
                continue;
            }
            if let Some(hit) = self.intersect(&obj.name, ray, Space::World) {
                let dist = hit.point.distance(ray.origin);
                if best.is_none_or(|(_, d)| dist < d) {
                    best = Some((obj, dist));
                }
            }
        }

        best.map(|(obj, _)| obj.name.clone())
    }

    pub fn intersect(&self, target: &str, ray: &Ray, space: Space) -> Option<RayHit> {
        let obj = self.get(target)?;
        let mesh = obj.mesh.as_ref()?;
        let local_ray = match space {
            Space::World => ray.transformed(&obj.matrix.inverse()),
            Space::Object => *ray,
        };
        let hit = pick_polygon(&local_ray, mesh, self.max_ray_distance)?;
        Some(RayHit {
            point: ray.at(hit.distance),
            face_id: hit.polygon,
        })
    }

    pub fn closest_normal(&self, target: &str, point: Vec3, space: Space) -> Option<Vec3> {
        let obj = self.get(target)?;
        let mesh = obj.mesh.as_ref()?;
        let idx = closest_polygon(obj.point_from(point, space), mesh)?;
        Some(obj.normal_to(mesh.polygons[idx].normal, space))
    }

    pub fn face_vertex_tangents(&self, target: &str, face_id: usize, space: Space) -> Vec<Vec3> {
        let Some(obj) = self.get(target) else {
            return Vec::new();
        };
        obj.mesh
            .as_ref()
            .and_then(|m| m.polygons.get(face_id))
            .map(|p| p.tangents.iter().map(|t| obj.direction_to(*t, space)).collect())
            .unwrap_or_default()
    }

    pub fn face_polygon_vertices(&self, target: &str, face_id: usize) -> Vec<usize> {
        self.get(target)
            .and_then(|o| o.mesh.as_ref())
            .and_then(|m| m.polygons.get(face_id))
            .map(|p| p.vertices.iter().map(|&i| i as usize).collect())
            .unwrap_or_default()
    }

    pub fn vertex_position(&self, target: &str, index: usize, space: Space) -> Option<Vec3> {
        let obj = self.get(target)?;
        let p = *obj.mesh.as_ref()?.positions.get(index)?;
        Some(obj.point_to(p, space))
    }
}

/// Upper bound on plane subdivisions per side
pub const MAX_SUBDIVISIONS: u32 = 1024;

/// Mesh for a scene primitive
pub fn primitive_mesh(primitive: &Primitive) -> std::result::Result<MeshData, String> {
    match *primitive {
        Primitive::Plane { subdivisions, .. } if subdivisions > MAX_SUBDIVISIONS => Err(format!(
            "{subdivisions} plane subdivisions, at most {MAX_SUBDIVISIONS} allowed"
        )),
        Primitive::Plane { width, depth, subdivisions } => {
            Ok(mesh::plane(width as f32, depth as f32, subdivisions))
        }
        Primitive::Cube { width, height, depth } => {
            Ok(mesh::cube(width as f32, height as f32, depth as f32))
        }
    }
}

/// World matrix of a scene transform (XYZ Euler angles in degrees)
pub fn transform_matrix(t: &Transform) -> Mat4 {
    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        (t.rotation[0] as f32).to_radians(),
        (t.rotation[1] as f32).to_radians(),
        (t.rotation[2] as f32).to_radians(),
    );
    Mat4::from_scale_rotation_translation(to_vec3(t.scale), rotation, to_vec3(t.position))
}

fn to_vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}
