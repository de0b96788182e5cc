use anyhow::Result;

use super::{ClearColor, LinkedProgram, Vertex, VertexLayout};

/// Result of one frame submission.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Nothing was presented this iteration; try again next frame.
    Skipped,
    /// The presentation surface is unusable; the frame loop should close.
    Lost,
}

/// Graphics operations needed by the triangle scene.
///
/// Resource handles are owned values: each `create_*` call is matched by
/// exactly one `release_*` call that consumes the handle.
pub trait RenderBackend {
    type Program;
    type Buffer;
    type VertexArray;

    /// Turns a linked stage pair into a program. The stage objects are
    /// consumed and must not outlive this call.
    fn create_program(&mut self, linked: LinkedProgram) -> Result<Self::Program>;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Self::Buffer>;

    fn create_vertex_array(
        &mut self,
        buffer: &Self::Buffer,
        layout: &VertexLayout,
    ) -> Result<Self::VertexArray>;

    /// Clears color and depth, draws `vertex_count` vertices as a triangle
    /// list with `program`, and presents.
    fn draw_frame(
        &mut self,
        clear: ClearColor,
        program: &Self::Program,
        vertex_array: &Self::VertexArray,
        vertex_count: u32,
    ) -> FrameOutcome;

    fn release_vertex_array(&mut self, vertex_array: Self::VertexArray);

    fn release_buffer(&mut self, buffer: Self::Buffer);

    fn release_program(&mut self, program: Self::Program);
}
