use glam::Vec3;

/// One face of a polygon mesh
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// Indices into `MeshData::positions`, counter-clockwise around `normal`
    pub vertices: Vec<u32>,
    /// Flat face normal
    pub normal: Vec3,
    /// Tangent per face-vertex, parallel to `vertices`
    pub tangents: Vec<Vec3>,
}

/// CPU-side polygon mesh in object space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub polygons: Vec<Polygon>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Fan triangulation of a polygon. Empty for out-of-range indices.
    pub fn triangles(&self, polygon: usize) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let verts: &[u32] = self
            .polygons
            .get(polygon)
            .map(|p| p.vertices.as_slice())
            .unwrap_or(&[]);
        let pos = move |i: u32| self.positions[i as usize];
        (1..verts.len().saturating_sub(1))
            .map(move |k| [pos(verts[0]), pos(verts[k]), pos(verts[k + 1])])
    }

    /// Mean of the polygon's vertex positions
    pub fn polygon_center(&self, polygon: usize) -> Vec3 {
        let Some(p) = self.polygons.get(polygon) else {
            return Vec3::ZERO;
        };
        if p.vertices.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = p.vertices.iter().map(|&i| self.positions[i as usize]).sum();
        sum / p.vertices.len() as f32
    }

    fn push_quad(&mut self, quad: [Vec3; 4], normal: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&quad);
        let tangent = (quad[1] - quad[0]).normalize_or_zero();
        self.polygons.push(Polygon {
            vertices: vec![base, base + 1, base + 2, base + 3],
            normal,
            tangents: vec![tangent; 4],
        });
    }
}

/// Plane in XZ facing +Y, centered on the origin, split into
/// `subdivisions x subdivisions` quads sharing vertices.
pub fn plane(width: f32, depth: f32, subdivisions: u32) -> MeshData {
    let n = subdivisions.max(1);
    let row = n + 1;
    let hw = width * 0.5;
    let hd = depth * 0.5;

    let mut positions = Vec::with_capacity(row as usize * row as usize);
    for j in 0..row {
        for i in 0..row {
            let x = -hw + width * i as f32 / n as f32;
            let z = hd - depth * j as f32 / n as f32;
            positions.push(Vec3::new(x, 0.0, z));
        }
    }

    let mut polygons = Vec::with_capacity(n as usize * n as usize);
    for j in 0..n {
        for i in 0..n {
            let v0 = j * row + i;
            polygons.push(Polygon {
                vertices: vec![v0, v0 + 1, v0 + row + 1, v0 + row],
                normal: Vec3::Y,
                tangents: vec![Vec3::X; 4],
            });
        }
    }

    MeshData { positions, polygons }
}

/// Box centered on the origin with one quad (and four own vertices) per side
pub fn cube(w: f32, h: f32, d: f32) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut mesh = MeshData {
        positions: Vec::with_capacity(24),
        polygons: Vec::with_capacity(6),
    };
    for (quad, normal) in faces {
        mesh.push_quad(quad, normal);
    }
    mesh
}
