use crate::{parse, Properties, TileProperties, TsxParseError};

#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tile {
    /// ID of tile local to its tileset
    pub id: u32,
    pub class: String,
    /// Properties as written in the tsx file
    pub properties: Properties,
    pub meta: TileProperties,
}

impl Tile {
    pub fn from_parsed(parsed_tile: parse::Tile) -> Result<Self, TsxParseError> {
        let meta = TileProperties::from_properties(&parsed_tile.properties)?;
        Ok(Self {
            id: parsed_tile.id,
            class: parsed_tile.class,
            properties: parsed_tile.properties,
            meta,
        })
    }

    pub fn is_spawn_marker(&self) -> bool {
        self.meta.spawn.is_some()
    }
}
