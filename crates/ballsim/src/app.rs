use anyhow::Result;

use ballsim_engine::core::{App, AppControl, FrameCtx};
use ballsim_engine::device::Gpu;
use ballsim_engine::render::{ClearColor, FrameOutcome, GpuScene, ShaderAssets};

/// Draws the bundled triangle every frame.
pub struct TriangleApp {
    assets: ShaderAssets,
    clear: ClearColor,
    scene: Option<GpuScene>,
}

impl TriangleApp {
    pub fn new() -> Self {
        Self {
            assets: ShaderAssets::bundled(),
            clear: ClearColor::BLACK,
            scene: None,
        }
    }
}

impl Default for TriangleApp {
    fn default() -> Self {
        Self::new()
    }
}

impl App for TriangleApp {
    fn on_start(&mut self, gpu: &mut Gpu<'_>) -> Result<()> {
        self.scene = Some(GpuScene::build(gpu, &self.assets)?);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = self.scene.as_ref() else {
            return AppControl::Exit;
        };

        match scene.draw(&mut *ctx.gpu, self.clear) {
            FrameOutcome::Presented => AppControl::Continue,
            FrameOutcome::Skipped => AppControl::Skipped,
            FrameOutcome::Lost => {
                log::error!("presentation surface lost at frame {}", ctx.frame_index);
                AppControl::Exit
            }
        }
    }

    fn on_exit(&mut self, gpu: &mut Gpu<'_>) {
        if let Some(scene) = self.scene.take() {
            scene.release(gpu);
        }
    }
}
