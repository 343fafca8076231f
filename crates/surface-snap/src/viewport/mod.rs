//! Headless viewport: camera projection, polygon meshes and ray picking

pub mod camera;
pub mod mesh;
pub mod picking;
