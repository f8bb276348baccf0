//! The tileset shipped with the game, embedded at compile time.
use crate::{RawProtocol, Tileset, TsxParseError};

/// Raw text of `resources/tileset.tsx`.
pub const TILESET_TSX: &str = include_str!("../resources/tileset.tsx");

/// Directory the embedded tileset resolves its image against.
pub const RESOURCE_DIR: &str = "resources";

/// Path the embedded tileset is served under by [`protocol`].
pub const TILESET_PATH: &str = "raw://resources/tileset.tsx";

/// Parses the embedded tileset. Its image source resolves to `resources/tileset.png`.
pub fn tileset() -> Result<Tileset, TsxParseError> {
    Tileset::parse_str(TILESET_TSX, Some(RESOURCE_DIR))
}

/// Protocol serving the embedded resources, for use with an [`crate::AssetLoader`].
pub fn protocol() -> RawProtocol {
    RawProtocol::new().with_file(format!("{RESOURCE_DIR}/tileset.tsx"), TILESET_TSX)
}
