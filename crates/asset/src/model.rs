//! CPU-side model produced by the OBJ loader.

use glam::{Vec2, Vec3};

/// Flat, non-indexed triangle list. Entry `i` of `vertices`, `uvs` and
/// `normals` together describe one face-vertex; every three entries form a
/// triangle in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    /// Reserved for an index buffer; the loader leaves it empty.
    pub indices: Vec<u32>,
}

impl Model {
    pub fn new(vertices: Vec<Vec3>, uvs: Vec<Vec2>, normals: Vec<Vec3>) -> Self {
        Self {
            vertices,
            uvs,
            normals,
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns `true` if the three attribute arrays line up and hold whole triangles.
    pub fn is_consistent(&self) -> bool {
        let n = self.vertices.len();
        self.uvs.len() == n && self.normals.len() == n && n % 3 == 0
    }

    /// Axis-aligned bounding box of the vertex positions as `(min, max)`.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{vec2, vec3};

    fn triangle() -> Model {
        Model::new(
            vec![vec3(0.0, 0.0, 0.0), vec3(2.0, -1.0, 0.0), vec3(0.0, 1.0, 3.0)],
            vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)],
            vec![Vec3::Z; 3],
        )
    }

    #[test]
    fn counts_and_consistency() {
        let model = triangle();
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);
        assert!(model.is_consistent());
        assert!(model.indices.is_empty());

        let mut broken = model.clone();
        broken.uvs.pop();
        assert!(!broken.is_consistent());
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let (min, max) = triangle().bounds().expect("non-empty");
        assert_eq!(min, vec3(0.0, -1.0, 0.0));
        assert_eq!(max, vec3(2.0, 1.0, 3.0));
        assert_eq!(Model::default().bounds(), None);
    }
}
