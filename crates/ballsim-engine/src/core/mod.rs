//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the
//! application, plus the frame loop state machine that decides when to close.

mod app;
mod ctx;
mod frame_loop;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
pub use frame_loop::{FrameLoop, LoopState};
