use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use super::RenderBackend;

/// Position-only vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

pub const TRIANGLE_VERTEX_COUNT: u32 = 3;

/// The demo triangle, counter-clockwise in clip space.
pub static TRIANGLE_VERTICES: [Vertex; TRIANGLE_VERTEX_COUNT as usize] = [
    Vertex { position: [-0.5, -0.5, 0.0] }, // bottom-left
    Vertex { position: [0.5, -0.5, 0.0] },  // bottom-right
    Vertex { position: [0.0, 0.5, 0.0] },   // top-center
];

/// One float vertex attribute read from a vertex buffer.
///
/// Components are 32-bit floats and are never normalized.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    /// 1..=4 components.
    pub components: u8,
    /// Byte offset inside one vertex.
    pub offset: u64,
}

/// How the bytes of one vertex buffer map to shader inputs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices.
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// The attribute feeding shader input `location`, if any.
    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }
}

impl Vertex {
    /// Location 0, three floats, tightly packed.
    pub fn layout() -> VertexLayout {
        VertexLayout {
            stride: std::mem::size_of::<Vertex>() as u64,
            attributes: vec![VertexAttribute {
                location: 0,
                components: 3,
                offset: 0,
            }],
        }
    }
}

/// GPU copy of a fixed vertex array plus its attribute binding.
///
/// Created once and never written again.
pub struct GeometryBuffer<B, V> {
    buffer: B,
    vertex_array: V,
    vertex_count: u32,
}

impl<B, V> GeometryBuffer<B, V> {
    pub fn build<G>(gfx: &mut G, vertices: &[Vertex], layout: &VertexLayout) -> Result<Self>
    where
        G: RenderBackend<Buffer = B, VertexArray = V>,
    {
        let buffer = gfx.create_vertex_buffer(vertices)?;
        let vertex_array = match gfx.create_vertex_array(&buffer, layout) {
            Ok(va) => va,
            Err(e) => {
                gfx.release_buffer(buffer);
                return Err(e);
            }
        };

        log::debug!("geometry uploaded: {} vertices", vertices.len());

        Ok(Self {
            buffer,
            vertex_array,
            vertex_count: u32::try_from(vertices.len())?,
        })
    }

    pub fn vertex_array(&self) -> &V {
        &self.vertex_array
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Releases the vertex array, then the buffer it reads from.
    pub fn release<G>(self, gfx: &mut G)
    where
        G: RenderBackend<Buffer = B, VertexArray = V>,
    {
        gfx.release_vertex_array(self.vertex_array);
        gfx.release_buffer(self.buffer);
    }
}
