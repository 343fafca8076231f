//! Factory functions for creating test scenes.
//!
//! The default viewport looks down at the origin, so targets are centered
//! there. Sources sit well below the ground where no pointer ray reaches
//! them before the ground does.

use shared::*;

// ── Object factories ────────────────────────────────────────────

/// Ground plane in XZ, `size` on each side.
pub fn ground_plane(name: &str, size: f64, subdivisions: u32) -> ObjectDescription {
    ObjectDescription::new(
        name,
        Some(Primitive::Plane {
            width: size,
            depth: size,
            subdivisions,
        }),
        Transform::new(),
    )
}

/// Plane rotated by XYZ Euler angles (degrees) and moved to `pos`.
pub fn tilted_plane(name: &str, size: f64, rotation: [f64; 3], pos: [f64; 3]) -> ObjectDescription {
    ObjectDescription::new(
        name,
        Some(Primitive::Plane {
            width: size,
            depth: size,
            subdivisions: 1,
        }),
        Transform {
            position: pos,
            rotation,
            scale: [1.0; 3],
        },
    )
}

/// Cube with edge length `size` at `pos`.
pub fn cube_at(name: &str, size: f64, pos: [f64; 3]) -> ObjectDescription {
    ObjectDescription::new(
        name,
        Some(Primitive::Cube {
            width: size,
            height: size,
            depth: size,
        }),
        Transform::at(pos),
    )
}

/// Unit cube with a non-uniform scale, parked under the ground.
pub fn source_cube(name: &str, scale: [f64; 3]) -> ObjectDescription {
    ObjectDescription::new(
        name,
        Some(Primitive::Cube {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }),
        Transform {
            position: [0.0, -20.0, 0.0],
            rotation: [0.0; 3],
            scale,
        },
    )
}

/// Source cube whose rotate pivot is offset from its origin.
pub fn pivoted_source(name: &str, pivot: [f64; 3]) -> ObjectDescription {
    let mut obj = source_cube(name, [1.0; 3]);
    obj.pivot = pivot;
    obj
}

// ── Scene factories ─────────────────────────────────────────────

/// `ground` (10x10, 4x4 quads) plus source `pCube1` scaled (2, 3, 4).
pub fn surface_scene() -> SceneDescription {
    SceneDescription {
        version: 1,
        objects: vec![ground_plane("ground", 10.0, 4), source_cube("pCube1", [2.0, 3.0, 4.0])],
    }
}

/// A 4-unit `box` as target plus a unit source `pCube1`.
pub fn box_scene() -> SceneDescription {
    SceneDescription {
        version: 1,
        objects: vec![cube_at("box", 4.0, [0.0, 0.0, 0.0]), source_cube("pCube1", [1.0; 3])],
    }
}

/// Ground plane and a source with an off-origin pivot.
pub fn pivot_scene() -> SceneDescription {
    SceneDescription {
        version: 1,
        objects: vec![
            ground_plane("ground", 10.0, 1),
            pivoted_source("pCube1", [0.0, -0.5, 0.0]),
        ],
    }
}

/// Only a source, nothing to place it on.
pub fn empty_scene() -> SceneDescription {
    SceneDescription {
        version: 1,
        objects: vec![source_cube("pCube1", [1.0; 3])],
    }
}
