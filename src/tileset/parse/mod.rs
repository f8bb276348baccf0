//! Structs defined here mirror those in [`crate::tileset`].
//! The main difference is that they're mostly a 1:1 mapping of the tsx spec
//! and are not yet checked for consistency.
mod tileset;

pub use tileset::*;
