use winit::dpi::PhysicalSize;

/// Depth attachment sized to the surface.
///
/// Recreated whenever the surface is reconfigured to a new non-zero size.
pub struct DepthTarget {
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: PhysicalSize<u32>) -> Self {
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ballsim depth target"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        log::debug!("depth target created: {}x{} {format:?}", size.width, size.height);

        Self {
            format,
            size,
            texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Returns a target matching `size`, reusing `self` when nothing changed.
    pub fn resized(self, device: &wgpu::Device, size: PhysicalSize<u32>) -> Self {
        if size == self.size {
            return self;
        }
        self.texture.destroy();
        Self::new(device, self.format, size)
    }
}
