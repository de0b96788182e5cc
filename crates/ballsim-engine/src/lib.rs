//! Ball sim engine crate.
//!
//! Owns the window runtime, the GPU context and the triangle render path used
//! by the `ballsim` binary.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod window;
