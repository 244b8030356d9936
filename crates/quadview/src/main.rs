use anyhow::Result;
use winit::dpi::LogicalSize;

use quadview_engine::device::GpuInit;
use quadview_engine::logging::{init_logging, LoggingConfig};
use quadview_engine::window::{Runtime, RuntimeConfig};

mod app;

use app::HelloQuad;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "quadview".to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };

    // Wireframe toggling needs line polygon mode from the device.
    let gpu_init = GpuInit {
        required_features: wgpu::Features::POLYGON_MODE_LINE,
        ..GpuInit::default()
    };

    log::info!("Space toggles fill/wireframe, Escape quits");

    Runtime::run(config, gpu_init, HelloQuad::default())
}
