use glam::Vec3;

use super::frame::average_tangent;
use super::snap::nearest_vertex;
use crate::error::AlignError;
use crate::host::{Space, SurfaceQuery};
use crate::viewport::picking::Ray;

/// Point and orientation on the target surface under the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub face_id: usize,
    /// Unit surface normal closest to `point`
    pub normal: Vec3,
    /// Unit mean of the hit face's per-vertex tangents
    pub tangent: Vec3,
}

/// Cast `ray` at `target` and gather the hit's normal and tangent.
///
/// With `snap_to_vertex` the hit point is replaced by the nearest vertex of
/// the hit face before the normal is looked up.
pub fn resolve_hit<Q: SurfaceQuery + ?Sized>(
    query: &Q,
    target: &str,
    ray: &Ray,
    snap_to_vertex: bool,
) -> Result<SurfaceHit, AlignError> {
    let space = Space::World;
    let hit = query
        .intersect(target, ray, space)
        .ok_or(AlignError::NoIntersection)?;

    let mut point = hit.point;
    if snap_to_vertex {
        let vertices: Vec<Vec3> = query
            .face_polygon_vertices(target, hit.face_id)
            .into_iter()
            .filter_map(|i| query.vertex_position(target, i, space))
            .collect();
        if let Some(v) = nearest_vertex(point, &vertices) {
            point = v;
        }
    }

    let normal = query
        .closest_normal(target, point, space)
        .and_then(|n| n.try_normalize())
        .ok_or(AlignError::NoIntersection)?;

    let tangents = query.face_vertex_tangents(target, hit.face_id, space);
    let tangent = average_tangent(&tangents).unwrap_or_else(|| normal.any_orthonormal_vector());

    Ok(SurfaceHit {
        point,
        face_id: hit.face_id,
        normal,
        tangent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::HeadlessHost;
    use crate::host::RayHit;
    use crate::scene::SceneObject;
    use crate::viewport::mesh;
    use egui::Pos2;
    use glam::Mat4;
    use shared::ObjectId;

    fn ground_host() -> HeadlessHost {
        let mut host = HeadlessHost::new();
        host.scene.insert(SceneObject::new("ground", Some(mesh::plane(4.0, 4.0, 2)), Mat4::IDENTITY));
        host
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 10.0, z),
            direction: Vec3::NEG_Y,
        }
    }

    #[test]
    fn test_resolve_on_plane() {
        let host = ground_host();
        let hit = resolve_hit(&host, "ground", &down_ray(0.3, -0.4), false).unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::new(0.3, 0.0, -0.4), 1e-5));
        assert!(hit.normal.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(hit.tangent.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_snap_to_face_vertex() {
        let host = ground_host();
        // quads are 2x2; the nearest corner of the hit quad is (0, 0, 0)
        let hit = resolve_hit(&host, "ground", &down_ray(0.3, -0.4), true).unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::ZERO, 1e-6));
        let hit = resolve_hit(&host, "ground", &down_ray(1.6, 1.7), true).unwrap();
        assert!(hit.point.abs_diff_eq(Vec3::new(2.0, 0.0, 2.0), 1e-6));
    }

    #[test]
    fn test_miss_is_no_intersection() {
        let host = ground_host();
        assert_eq!(
            resolve_hit(&host, "ground", &down_ray(9.0, 0.0), false),
            Err(AlignError::NoIntersection)
        );
        assert_eq!(
            resolve_hit(&host, "missing", &down_ray(0.0, 0.0), false),
            Err(AlignError::NoIntersection)
        );
    }

    /// Surface that reports a hit but no usable tangents or normal
    struct Sparse {
        normal: Option<Vec3>,
    }

    impl SurfaceQuery for Sparse {
        fn target_under(&self, _pos: Pos2) -> Option<ObjectId> {
            None
        }
        fn intersect(&self, _target: &str, _ray: &Ray, _space: Space) -> Option<RayHit> {
            Some(RayHit {
                point: Vec3::ONE,
                face_id: 0,
            })
        }
        fn closest_normal(&self, _target: &str, _point: Vec3, _space: Space) -> Option<Vec3> {
            self.normal
        }
        fn face_vertex_tangents(&self, _target: &str, _face_id: usize, _space: Space) -> Vec<Vec3> {
            Vec::new()
        }
        fn face_polygon_vertices(&self, _target: &str, _face_id: usize) -> Vec<usize> {
            Vec::new()
        }
        fn vertex_position(&self, _target: &str, _index: usize, _space: Space) -> Option<Vec3> {
            None
        }
    }

    #[test]
    fn test_missing_tangents_fall_back_to_perpendicular() {
        let q = Sparse {
            normal: Some(Vec3::new(0.0, 0.0, 3.0)),
        };
        let hit = resolve_hit(&q, "t", &down_ray(0.0, 0.0), true).unwrap();
        // no vertices to snap to, point unchanged
        assert_eq!(hit.point, Vec3::ONE);
        assert_eq!(hit.normal, Vec3::Z);
        assert!(hit.tangent.dot(Vec3::Z).abs() < 1e-6);
        assert!((hit.tangent.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_or_zero_normal_is_no_intersection() {
        for normal in [None, Some(Vec3::ZERO)] {
            let q = Sparse { normal };
            assert_eq!(
                resolve_hit(&q, "t", &down_ray(0.0, 0.0), false),
                Err(AlignError::NoIntersection)
            );
        }
    }
}
