pub mod cli;
pub mod connectors;
pub mod render;
pub mod utils;

pub use cli::*;
pub use connectors::*;
pub use render::*;
pub use utils::*;
