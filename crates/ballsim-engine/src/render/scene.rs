use anyhow::Result;

use super::{
    ClearColor, FrameOutcome, GeometryBuffer, RenderBackend, ShaderAssets, ShaderPipelineBuilder,
    Vertex, TRIANGLE_VERTICES,
};

/// Everything the demo draws: one program and one triangle.
///
/// Built once after the context exists, released once before the window goes away.
pub struct TriangleScene<P, B, V> {
    program: P,
    geometry: GeometryBuffer<B, V>,
}

impl<P, B, V> TriangleScene<P, B, V> {
    /// Builds the shader program first, then uploads the triangle.
    pub fn build<G>(gfx: &mut G, assets: &ShaderAssets) -> Result<Self>
    where
        G: RenderBackend<Program = P, Buffer = B, VertexArray = V>,
    {
        let layout = Vertex::layout();
        let program = ShaderPipelineBuilder::default().build(assets, &layout, gfx)?;

        let geometry = match GeometryBuffer::build(gfx, &TRIANGLE_VERTICES, &layout) {
            Ok(g) => g,
            Err(e) => {
                gfx.release_program(program);
                return Err(e);
            }
        };

        log::info!("triangle scene ready");
        Ok(Self { program, geometry })
    }

    pub fn draw<G>(&self, gfx: &mut G, clear: ClearColor) -> FrameOutcome
    where
        G: RenderBackend<Program = P, Buffer = B, VertexArray = V>,
    {
        gfx.draw_frame(
            clear,
            &self.program,
            self.geometry.vertex_array(),
            self.geometry.vertex_count(),
        )
    }

    /// Releases the vertex array, the vertex buffer, then the program.
    pub fn release<G>(self, gfx: &mut G)
    where
        G: RenderBackend<Program = P, Buffer = B, VertexArray = V>,
    {
        self.geometry.release(gfx);
        gfx.release_program(self.program);
        log::info!("triangle scene released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::assets::VERTEX_SHADER_PATH;
    use crate::render::testing::{Call, RecordingBackend, StubId};

    fn build(gfx: &mut RecordingBackend) -> TriangleScene<StubId, StubId, StubId> {
        TriangleScene::build(gfx, &ShaderAssets::bundled()).unwrap()
    }

    #[test]
    fn build_creates_program_before_geometry() {
        let mut gfx = RecordingBackend::default();
        let _scene = build(&mut gfx);

        assert!(matches!(gfx.calls[0], Call::CreateProgram { .. }));
        assert!(matches!(gfx.calls[1], Call::CreateBuffer { .. }));
        assert!(matches!(gfx.calls[2], Call::CreateVertexArray { .. }));
        assert_eq!(gfx.live(), 3);
    }

    #[test]
    fn uploaded_vertices_equal_triangle_constants() {
        let mut gfx = RecordingBackend::default();
        let _scene = build(&mut gfx);
        assert_eq!(
            gfx.uploaded_floats(),
            vec![-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0]
        );
    }

    #[test]
    fn draw_binds_program_and_vertex_array_for_three_vertices() {
        let mut gfx = RecordingBackend::default();
        let scene = build(&mut gfx);
        assert_eq!(scene.draw(&mut gfx, ClearColor::BLACK), FrameOutcome::Presented);

        let Call::CreateProgram { id: program, .. } = gfx.calls[0] else { panic!() };
        let Call::CreateVertexArray { id: vertex_array, .. } = gfx.calls[2] else { panic!() };
        assert_eq!(
            gfx.calls.last(),
            Some(&Call::Draw { program, vertex_array, vertex_count: 3 })
        );
    }

    #[test]
    fn release_order_is_vertex_array_buffer_program() {
        let mut gfx = RecordingBackend::default();
        let scene = build(&mut gfx);
        scene.draw(&mut gfx, ClearColor::BLACK);
        scene.release(&mut gfx);

        let Call::CreateProgram { id: program, .. } = gfx.calls[0] else { panic!() };
        let Call::CreateBuffer { id: buffer, .. } = gfx.calls[1] else { panic!() };
        let Call::CreateVertexArray { id: vertex_array, .. } = gfx.calls[2] else { panic!() };

        let releases: Vec<_> = gfx.calls.iter().filter(|c| c.is_release()).cloned().collect();
        assert_eq!(
            releases,
            vec![
                Call::ReleaseVertexArray(vertex_array),
                Call::ReleaseBuffer(buffer),
                Call::ReleaseProgram(program),
            ]
        );
        assert_eq!(gfx.live(), 0);
    }

    #[test]
    fn repeated_runs_release_everything() {
        let mut gfx = RecordingBackend::default();
        for _ in 0..2 {
            let scene = build(&mut gfx);
            scene.draw(&mut gfx, ClearColor::BLACK);
            scene.release(&mut gfx);
            assert_eq!(gfx.live(), 0);
        }
    }

    #[test]
    fn shader_failure_creates_nothing() {
        let assets = ShaderAssets::bundled().with_source(VERTEX_SHADER_PATH, "@vertex fn (");
        let mut gfx = RecordingBackend::default();
        let err = TriangleScene::build(&mut gfx, &assets).err().unwrap();

        assert!(format!("{err}").contains("vertex stage"));
        assert!(gfx.calls.is_empty());
    }

    #[test]
    fn geometry_failure_releases_program() {
        let mut gfx = RecordingBackend::failing_vertex_array();
        assert!(TriangleScene::build(&mut gfx, &ShaderAssets::bundled()).is_err());
        assert_eq!(gfx.live(), 0);
        assert!(matches!(gfx.calls.last(), Some(Call::ReleaseProgram(_))));
    }

    #[test]
    fn lost_surface_is_reported() {
        let mut gfx = RecordingBackend::with_frame_outcome(FrameOutcome::Lost);
        let scene = build(&mut gfx);
        assert_eq!(scene.draw(&mut gfx, ClearColor::BLACK), FrameOutcome::Lost);
    }
}
