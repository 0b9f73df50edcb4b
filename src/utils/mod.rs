// Utility modules
pub mod error;
pub mod config;
pub mod types;
pub mod logging;
pub mod progress;

pub use error::*;
pub use config::*;
pub use types::*;
