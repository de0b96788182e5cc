//! Triangle render path.
//!
//! Flow at startup: bundled shader sources ([`assets`]) are compiled and linked
//! by the [`ShaderPipelineBuilder`], the triangle is uploaded as a
//! [`GeometryBuffer`], and both are owned by a [`TriangleScene`] which draws once
//! per frame and releases everything in reverse order at shutdown.
//!
//! GPU work goes through the [`RenderBackend`] trait; [`Gpu`](crate::device::Gpu)
//! implements it with wgpu.

pub mod assets;
mod backend;
mod color;
mod geometry;
mod gpu_backend;
mod scene;
mod shader;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::ShaderAssets;
pub use backend::{FrameOutcome, RenderBackend};
pub use color::ClearColor;
pub use geometry::{
    GeometryBuffer, Vertex, VertexAttribute, VertexLayout, TRIANGLE_VERTEX_COUNT,
    TRIANGLE_VERTICES,
};
pub use gpu_backend::{GpuProgram, GpuScene, GpuVertexArray};
pub use scene::TriangleScene;
pub use shader::{
    compile, link, CompiledShader, LinkedProgram, ShaderPipelineBuilder, ShaderSource,
    ShaderStage, Slot, SlotType, StageInterface,
};
