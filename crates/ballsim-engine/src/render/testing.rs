//! Recording stand-in for the GPU, used by render tests.

use anyhow::{bail, Result};

use super::{ClearColor, FrameOutcome, LinkedProgram, RenderBackend, Vertex, VertexLayout};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct StubId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateProgram { id: u32, vertex: String, fragment: String },
    CreateBuffer { id: u32, floats: Vec<f32> },
    CreateVertexArray { id: u32, buffer: u32, stride: u64 },
    Draw { program: u32, vertex_array: u32, vertex_count: u32 },
    ReleaseVertexArray(u32),
    ReleaseBuffer(u32),
    ReleaseProgram(u32),
}

impl Call {
    pub(crate) fn is_release(&self) -> bool {
        matches!(
            self,
            Call::ReleaseVertexArray(_) | Call::ReleaseBuffer(_) | Call::ReleaseProgram(_)
        )
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    fail_vertex_array: bool,
    /// Outcome returned by `draw_frame`; `None` means `Presented`.
    frame_outcome: Option<FrameOutcome>,
    next_id: u32,
    live: usize,
}

impl RecordingBackend {
    /// A backend whose `create_vertex_array` always fails.
    pub(crate) fn failing_vertex_array() -> Self {
        Self {
            fail_vertex_array: true,
            ..Self::default()
        }
    }

    /// A backend whose `draw_frame` always reports `outcome`.
    pub(crate) fn with_frame_outcome(outcome: FrameOutcome) -> Self {
        Self {
            frame_outcome: Some(outcome),
            ..Self::default()
        }
    }

    /// Number of created resources not yet released.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Floats passed to the most recent buffer upload.
    pub(crate) fn uploaded_floats(&self) -> Vec<f32> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                Call::CreateBuffer { floats, .. } => Some(floats.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.live += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    type Program = StubId;
    type Buffer = StubId;
    type VertexArray = StubId;

    fn create_program(&mut self, linked: LinkedProgram) -> Result<StubId> {
        let id = self.next();
        self.calls.push(Call::CreateProgram {
            id,
            vertex: linked.vertex().path().to_string(),
            fragment: linked.fragment().path().to_string(),
        });
        Ok(StubId(id))
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<StubId> {
        let id = self.next();
        let floats = bytemuck::cast_slice::<Vertex, f32>(vertices).to_vec();
        self.calls.push(Call::CreateBuffer { id, floats });
        Ok(StubId(id))
    }

    fn create_vertex_array(&mut self, buffer: &StubId, layout: &VertexLayout) -> Result<StubId> {
        if self.fail_vertex_array {
            bail!("vertex array creation refused");
        }
        let id = self.next();
        self.calls.push(Call::CreateVertexArray {
            id,
            buffer: buffer.0,
            stride: layout.stride,
        });
        Ok(StubId(id))
    }

    fn draw_frame(
        &mut self,
        _clear: ClearColor,
        program: &StubId,
        vertex_array: &StubId,
        vertex_count: u32,
    ) -> FrameOutcome {
        self.calls.push(Call::Draw {
            program: program.0,
            vertex_array: vertex_array.0,
            vertex_count,
        });
        self.frame_outcome.unwrap_or(FrameOutcome::Presented)
    }

    fn release_vertex_array(&mut self, vertex_array: StubId) {
        self.live -= 1;
        self.calls.push(Call::ReleaseVertexArray(vertex_array.0));
    }

    fn release_buffer(&mut self, buffer: StubId) {
        self.live -= 1;
        self.calls.push(Call::ReleaseBuffer(buffer.0));
    }

    fn release_program(&mut self, program: StubId) {
        self.live -= 1;
        self.calls.push(Call::ReleaseProgram(program.0));
    }
}
