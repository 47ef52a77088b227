pub mod app;
pub mod cli;
mod engine;
mod logging;
mod size;

pub use engine::{
    host::{OsHost, SwapHost},
    SwapProvisioner, SwapReport,
};
pub use logging::{background_log::BackgroundLog, multilog::MultiLogger};
pub use size::SwapSize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
