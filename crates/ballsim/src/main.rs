use anyhow::Result;

use ballsim_engine::device::GpuInit;
use ballsim_engine::logging::{init_logging, LoggingConfig};
use ballsim_engine::window::{Runtime, RuntimeConfig};

mod app;

use app::TriangleApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("ballsim {}", env!("CARGO_PKG_VERSION"));

    let result = Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        TriangleApp::new(),
    );

    match &result {
        Ok(()) => log::info!("clean shutdown"),
        Err(e) => log::error!("fatal: {e:#}"),
    }
    result
}
