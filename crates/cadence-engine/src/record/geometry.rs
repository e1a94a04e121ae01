use bytemuck::{Pod, Zeroable};

/// Each outline is a closed line strip: three corners plus the first again.
pub const VERTICES_PER_TRIANGLE: u32 = 4;

/// Half-extent of the outermost triangle in clip space.
pub const OUTER_SIZE: f32 = 0.7;

/// Shrink applied to each successive triangle.
pub const SIZE_STEP: f32 = 0.1;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: [x, y, z] }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds `count` nested triangle outlines, outermost first.
pub fn nested_triangles(count: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((count * VERTICES_PER_TRIANGLE) as usize);

    for i in 0..count {
        let s = (OUTER_SIZE - SIZE_STEP * i as f32).max(0.0);
        vertices.extend_from_slice(&[
            Vertex::new(-s, -s, 0.0),
            Vertex::new(s, -s, 0.0),
            Vertex::new(0.0, s, 0.0),
            Vertex::new(-s, -s, 0.0),
        ]);
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn vertex_is_three_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 12);
        assert_eq!(Vertex::layout().array_stride, 12);
    }

    #[test]
    fn four_vertices_per_triangle() {
        assert_eq!(nested_triangles(8).len(), 32);
        assert!(nested_triangles(0).is_empty());
    }

    #[test]
    fn outlines_are_closed() {
        for outline in nested_triangles(8).chunks(VERTICES_PER_TRIANGLE as usize) {
            assert_eq!(outline[0], outline[3]);
        }
    }

    #[test]
    fn outermost_triangle_matches_outer_size() {
        let v = nested_triangles(1);
        assert_eq!(v[0].position, [-0.7, -0.7, 0.0]);
        assert_eq!(v[1].position, [0.7, -0.7, 0.0]);
        assert_eq!(v[2].position, [0.0, 0.7, 0.0]);
    }

    #[test]
    fn each_triangle_shrinks_by_step() {
        let v = nested_triangles(8);
        for (i, outline) in v.chunks(4).enumerate() {
            let expected = (OUTER_SIZE - SIZE_STEP * i as f32).max(0.0);
            assert!(approx(outline[1].position[0], expected), "triangle {i}");
        }
        // The innermost of eight collapses to a point.
        assert!(approx(v[28].position[0], 0.0));
    }
}
