use std::borrow::Cow;

use anyhow::{bail, Context, Result};
use wgpu::util::DeviceExt;

use crate::device::{Gpu, SurfaceErrorAction};

use super::{
    ClearColor, FrameOutcome, LinkedProgram, RenderBackend, TriangleScene, Vertex, VertexLayout,
};

/// Linked program: the render pipeline built from a vertex/fragment pair.
pub struct GpuProgram {
    label: String,
    pipeline: wgpu::RenderPipeline,
}

/// Vertex buffer bound to its attribute layout.
pub struct GpuVertexArray {
    buffer: wgpu::Buffer,
    layout: VertexLayout,
}

/// The triangle scene as held by an application running on [`Gpu`].
pub type GpuScene = TriangleScene<GpuProgram, wgpu::Buffer, GpuVertexArray>;

fn vertex_format(components: u8) -> Result<wgpu::VertexFormat> {
    Ok(match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        4 => wgpu::VertexFormat::Float32x4,
        n => bail!("unsupported vertex attribute width: {n} components"),
    })
}

fn wgpu_attributes(layout: &VertexLayout) -> Result<Vec<wgpu::VertexAttribute>> {
    layout
        .attributes
        .iter()
        .map(|a| {
            Ok(wgpu::VertexAttribute {
                format: vertex_format(a.components)?,
                offset: a.offset,
                shader_location: a.location,
            })
        })
        .collect()
}

impl RenderBackend for Gpu<'_> {
    type Program = GpuProgram;
    type Buffer = wgpu::Buffer;
    type VertexArray = GpuVertexArray;

    fn create_program(&mut self, linked: LinkedProgram) -> Result<GpuProgram> {
        let (vertex, fragment, layout) = linked.into_parts();
        let label = format!("{} + {}", vertex.path(), fragment.path());
        let attributes = wgpu_attributes(&layout).context("invalid vertex layout")?;

        let vs_entry = vertex.entry_point().to_string();
        let fs_entry = fragment.entry_point().to_string();

        let vs_label = vertex.path().to_string();
        let fs_label = fragment.path().to_string();

        let vs_module = self.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&vs_label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex.into_module())),
        });
        let fs_module = self.device().create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&fs_label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment.into_module())),
        });

        let pipeline_layout = self
            .device()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ballsim pipeline layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let pipeline = self
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(&vs_entry),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(&fs_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        // Stage modules are not needed once the pipeline exists.
        drop(vs_module);
        drop(fs_module);

        log::debug!("program created: {label}");
        Ok(GpuProgram { label, pipeline })
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<wgpu::Buffer> {
        let buffer = self
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("ballsim vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        log::debug!("vertex buffer created: {} bytes", buffer.size());
        Ok(buffer)
    }

    fn create_vertex_array(
        &mut self,
        buffer: &wgpu::Buffer,
        layout: &VertexLayout,
    ) -> Result<GpuVertexArray> {
        anyhow::ensure!(layout.stride > 0, "vertex layout has zero stride");
        wgpu_attributes(layout)?;

        Ok(GpuVertexArray {
            buffer: buffer.clone(),
            layout: layout.clone(),
        })
    }

    fn draw_frame(
        &mut self,
        clear: ClearColor,
        program: &GpuProgram,
        vertex_array: &GpuVertexArray,
        vertex_count: u32,
    ) -> FrameOutcome {
        let mut frame = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => FrameOutcome::Lost,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        FrameOutcome::Skipped
                    }
                };
            }
        };

        // Clear pass: color + depth. Dropped before the draw pass begins.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ballsim clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: self.depth_view().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ballsim triangle pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&program.pipeline);
            rpass.set_vertex_buffer(0, vertex_array.buffer.slice(..));
            rpass.draw(0..vertex_count, 0..1);
        }

        self.submit(frame);
        FrameOutcome::Presented
    }

    fn release_vertex_array(&mut self, vertex_array: GpuVertexArray) {
        log::debug!(
            "vertex array released ({} attributes)",
            vertex_array.layout.attributes.len()
        );
        drop(vertex_array);
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
        log::debug!("vertex buffer released");
    }

    fn release_program(&mut self, program: GpuProgram) {
        log::debug!("program released: {}", program.label);
        drop(program);
    }
}
