mod util;
mod asset;
mod config;
pub mod tileset;
pub mod builtin;

pub use util::*;
pub use asset::*;
pub use config::*;
pub use tileset::*;
