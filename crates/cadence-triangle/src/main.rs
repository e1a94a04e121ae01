use std::process::ExitCode;

use cadence_engine::config::SampleConfig;
use cadence_engine::device::GpuInit;
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::window::Runtime;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    // Shaders resolve against the working directory unless CADENCE_SHADER_DIR is set.
    let config = SampleConfig::from_env();

    match Runtime::run(config, GpuInit::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
