use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::core::{App, FrameCtx, FrameLoop, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputEvent;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
    pub decorated: bool,
    /// Keep the window hidden until the application finished `on_start`.
    pub start_hidden: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Ball sim".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
            decorated: true,
            start_hidden: true,
        }
    }
}

impl RuntimeConfig {
    pub fn window_attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size)
            .with_resizable(self.resizable)
            .with_decorations(self.decorated)
            .with_visible(!self.start_hidden)
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` in a single window until the frame loop closes.
    ///
    /// Blocks the calling thread, which owns the event loop and the GPU context
    /// for the whole run. Returns the first fatal setup error, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to initialize the windowing system")?;
        let mut state = RuntimeState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        log::debug!("windowing system shut down");
        state.finish()
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    frame_loop: FrameLoop,

    /// `on_start` succeeded, so `on_exit` owes a matching release.
    started: bool,
    shut_down: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            frame_loop: FrameLoop::new(),
            started: false,
            shut_down: false,
            fatal: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(self.config.window_attributes())
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntry::try_new(window, |w| pollster::block_on(Gpu::new(w, gpu_init)))
            .context("GPU initialization failed")?;

        let app = &mut self.app;
        entry
            .with_gpu_mut(|gpu| app.on_start(gpu))
            .context("application setup failed")?;
        self.started = true;

        entry.with_window(|w| {
            w.set_visible(true);
            w.request_redraw();
            let size = w.inner_size();
            log::info!("window `{}` ready ({}x{})", self.config.title, size.width, size.height);
        });

        self.entry = Some(entry);
        Ok(())
    }

    fn redraw(&mut self, window_id: WindowId) {
        let (app, frame_loop) = (&mut self.app, &mut self.frame_loop);
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let frame_index = frame_loop.frames();
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                gpu: fields.gpu,
                frame_index,
            };
            app.on_frame(&mut ctx)
        });

        frame_loop.after_frame(control);
    }

    /// Releases application resources, then the window, then stops the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.frame_loop.request_close();

        if let Some(mut entry) = self.entry.take() {
            if self.started {
                let app = &mut self.app;
                entry.with_gpu_mut(|gpu| app.on_exit(gpu));
            }
            drop(entry);
            log::debug!("window destroyed");
        }

        event_loop.exit();
    }

    fn finish(self) -> Result<()> {
        match self.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.shut_down {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("{e:#}");
            self.fatal = Some(e);
            self.shutdown(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            self.shutdown(event_loop);
            return;
        }

        // Continuous redraw; presentation is paced by v-sync.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        if let Some(input) = translate_window_event(&event) {
            if let InputEvent::Resized { width, height } = input {
                entry.with_gpu_mut(|gpu| gpu.resize(PhysicalSize::new(width, height)));
            }
            self.frame_loop.handle(&input);
        }

        match event {
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(size));
            }
            WindowEvent::RedrawRequested if self.frame_loop.is_running() => {
                self.redraw(window_id);
            }
            _ => {}
        }

        if !self.frame_loop.is_running() {
            self.shutdown(event_loop);
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        self.shutdown(event_loop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn default_window_is_hidden_resizable_and_decorated() {
        let attrs = RuntimeConfig::default().window_attributes();
        assert_eq!(attrs.title, "Ball sim");
        assert!(!attrs.visible);
        assert!(attrs.resizable);
        assert!(attrs.decorations);
    }

    #[test]
    fn default_window_is_1280_by_720() {
        let attrs = RuntimeConfig::default().window_attributes();
        assert_eq!(
            attrs.inner_size,
            Some(Size::Logical(LogicalSize::new(1280.0, 720.0)))
        );
    }

    #[test]
    fn visible_when_not_starting_hidden() {
        let cfg = RuntimeConfig {
            start_hidden: false,
            ..Default::default()
        };
        assert!(cfg.window_attributes().visible);
    }
}
