pub mod config;
pub mod constants;
pub mod error;

pub use config::ProvisionerConfig;
pub use error::{SwapError, SwapResultExt};
