use anyhow::Result;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    /// A frame was presented.
    Continue,
    /// Nothing was presented this iteration; keep running.
    Skipped,
    Exit,
}

/// Application contract implemented by the binary.
///
/// The runtime calls `on_start` once the window and GPU context exist,
/// `on_frame` once per iteration while running, and `on_exit` exactly once
/// before the window is destroyed. `on_exit` is skipped when `on_start` failed.
pub trait App {
    /// Acquires GPU resources. An error is fatal: the runtime tears down and
    /// returns it from [`Runtime::run`](crate::window::Runtime::run).
    fn on_start(&mut self, gpu: &mut Gpu<'_>) -> Result<()>;

    /// Renders one frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases GPU resources acquired in `on_start`.
    fn on_exit(&mut self, gpu: &mut Gpu<'_>);
}
