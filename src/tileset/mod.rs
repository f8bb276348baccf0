mod tileset;
mod tile;
mod properties;
mod animation;
mod gid;
mod loader;
mod validate;
pub mod parse;

pub use tileset::*;
pub use tile::*;
pub use properties::*;
pub use animation::*;
pub use gid::*;
pub use loader::*;
pub use validate::*;
