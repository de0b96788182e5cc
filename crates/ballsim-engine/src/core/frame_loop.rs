use crate::input::InputEvent;

use super::app::AppControl;

/// Frame loop state. `Closing` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Close-flag state machine driven by polled input.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Number of frames presented while running.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Applies one polled event and returns the resulting state.
    pub fn handle(&mut self, event: &InputEvent) -> LoopState {
        if self.is_running() && event.is_close_request() {
            log::debug!("close requested by {event:?}");
            self.request_close();
        }
        self.state
    }

    /// Sets the close flag directly (e.g. on a fatal surface error).
    pub fn request_close(&mut self) {
        if self.state == LoopState::Running {
            log::info!("frame loop closing after {} frames", self.frames);
        }
        self.state = LoopState::Closing;
    }

    /// Records a presented frame. Returns `false` once closing, in which
    /// case no further frames may be drawn.
    pub fn complete_frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.frames = self.frames.wrapping_add(1);
        true
    }

    /// Applies the app's verdict for one iteration and returns the resulting state.
    pub fn after_frame(&mut self, control: AppControl) -> LoopState {
        match control {
            AppControl::Continue => {
                self.complete_frame();
            }
            AppControl::Skipped => {}
            AppControl::Exit => self.request_close(),
        }
        self.state
    }
}
