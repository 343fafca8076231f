use glam::Vec3;

/// Vertex of `vertices` closest to `point`.
///
/// Ties keep the first vertex encountered. Returns `None` only for an
/// empty list.
pub fn nearest_vertex(point: Vec3, vertices: &[Vec3]) -> Option<Vec3> {
    let mut best: Option<(Vec3, f32)> = None;

    for &v in vertices {
        let dist = v.distance_squared(point);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((v, dist));
        }
    }

    best.map(|(v, _)| v)
}
