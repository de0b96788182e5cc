//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform` translates winit events into `InputEvent`s, which the frame loop
//! consumes synchronously.

pub mod platform;
mod types;

pub use types::{InputEvent, Key, KeyState};
