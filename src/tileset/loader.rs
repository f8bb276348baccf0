use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use derive_more::*;
use roxmltree::Document;
use crate::{parse, AssetLoader, AssetPath, Tileset};

/// Loader for a .tsx file.
/// Outputs a [`Tileset`].
pub struct TsxLoader;
impl AssetLoader for TsxLoader {
    type AssetType = Tileset;

    fn load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Tileset> {
        let xml_source = std::str::from_utf8(bytes)?;
        let xml_doc = Document::parse(xml_source)?;
        let parsed_tileset = parse::Tileset::parse_doc(xml_doc, path.parent().as_deref())?;
        let tileset = Tileset::from_parsed(parsed_tileset)?;
        log::debug!("Loaded tileset '{}' from {path}", tileset.name);
        Ok(tileset)
    }

    fn extensions(&self) -> &[&str] {
        &["tsx"]
    }
}

#[derive(Error, Display, From, Debug)]
pub enum TsxParseError {
    #[display(fmt="{_0}")]
    XmlError(roxmltree::Error),
    #[display(fmt="{_0}")]
    ParseIntError(ParseIntError),
    #[display(fmt="{_0}")]
    ParseFloatError(ParseFloatError),
    #[display(fmt="{_0}")]
    ParseBoolError(ParseBoolError),
    #[display(fmt="Unexpected tag '{tag_name}'")]
    #[from(ignore)]
    UnexpectedTagError { tag_name: String },
    #[display(fmt="Tag '{tag_name}' is missing attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttributeError { tag_name: String, attribute: String },
    #[display(fmt="Unexpected value {value}")]
    #[from(ignore)]
    InvalidAttributeValue { value: String },
    #[display(fmt="Unknown property type '{property_type}'")]
    #[from(ignore)]
    UnknownPropertyType { property_type: String },
    #[display(fmt="Property '{name}' should be {expected}")]
    #[from(ignore)]
    PropertyType { name: String, expected: &'static str },
    #[display(fmt="Property '{name}' declared more than once")]
    #[from(ignore)]
    DuplicateProperty { name: String },
    #[display(fmt="Tile {id} declared more than once")]
    #[from(ignore)]
    DuplicateTile { id: u32 },
}
