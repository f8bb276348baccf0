use roxmltree::{Document, Node};
use tracing::instrument;
use crate::{FillMode, ObjectAlignment, Properties, TileOffset, TileRenderSize, TsxParseError};

/// A mostly 1:1 mapping of the TSX <tileset> specification.
#[derive(Clone, Default, Debug)]
pub struct Tileset {
    pub version: String,
    pub tiled_version: String,
    pub name: String,
    pub class: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub image: Option<Image>,
    pub properties: Properties,
    pub tiles: Vec<Tile>,
}

impl Tileset {

    #[instrument(skip_all)]
    pub fn parse_doc(doc: Document, parent_path: Option<&str>) -> Result<Self, TsxParseError> {
        let root = doc.root_element();
        let tag_name = root.tag_name().name();
        if tag_name != "tileset" {
            return Err(TsxParseError::UnexpectedTagError { tag_name: String::from(tag_name) });
        }
        let mut tileset = Tileset::default();
        tileset.parse(root, parent_path)?;
        Ok(tileset)
    }

    pub fn parse(&mut self, tileset_node: Node, parent_path: Option<&str>) -> Result<(), TsxParseError> {

        // Parses attributes
        for attribute in tileset_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "version" => self.version = String::from(value),
                "tiledversion" => self.tiled_version = String::from(value),
                "name" => self.name = String::from(value),
                "class" => self.class = String::from(value),
                "tilewidth" => self.tile_width = value.parse()?,
                "tileheight" => self.tile_height = value.parse()?,
                "spacing" => self.spacing = value.parse()?,
                "margin" => self.margin = value.parse()?,
                "tilecount" => self.tile_count = value.parse()?,
                "columns" => self.columns = value.parse()?,
                "objectalignment" => self.object_alignment = ObjectAlignment::parse(value)?,
                "tilerendersize" => self.tile_render_size = TileRenderSize::parse(value)?,
                "fillmode" => self.fill_mode = FillMode::parse(value)?,
                _ => {}
            }
        }

        // Parses children
        for child in tileset_node.children().filter(Node::is_element) {
            let tag = child.tag_name().name();
            match tag {
                "image" => self.image = Some(Image::parse(child, parent_path)?),
                "tileoffset" => self.tile_offset = Some(parse_tile_offset(child)?),
                "properties" => self.properties = Properties::parse(child)?,
                "tile" => self.tiles.push(Tile::parse(child)?),
                _ => log::debug!("Skipping <{tag}> in tileset '{}'", self.name),
            }
        }
        Ok(())
    }
}

/// A <tile> entry. Only tiles with extra data are listed in a tsx file.
#[derive(Clone, Default, Debug)]
pub struct Tile {
    pub id: u32,
    pub class: String,
    pub properties: Properties,
}

impl Tile {
    pub fn parse(tile_node: Node) -> Result<Self, TsxParseError> {
        let mut tile = Tile::default();
        let mut has_id = false;
        for attribute in tile_node.attributes() {
            let value = attribute.value();
            match attribute.name() {
                "id" => {
                    tile.id = value.parse()?;
                    has_id = true;
                },
                // "type" predates "class" in older Tiled versions
                "class" | "type" => tile.class = String::from(value),
                _ => {}
            }
        }
        if !has_id {
            return Err(TsxParseError::MissingAttributeError {
                tag_name: String::from("tile"),
                attribute: String::from("id"),
            });
        }
        for child in tile_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "properties" => tile.properties = Properties::parse(child)?,
                tag => log::debug!("Skipping <{tag}> in tile {}", tile.id),
            }
        }
        Ok(tile)
    }
}

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    pub format: String,
    pub source: String,
    pub trans: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Image {
    /// Reads an <image> element. Relative sources are resolved against parent_path
    /// so they stay valid from the working directory.
    pub fn parse(image_node: Node, parent_path: Option<&str>) -> Result<Image, TsxParseError> {
        let source = image_node
            .attribute("source")
            .ok_or_else(|| TsxParseError::MissingAttributeError {
                tag_name: String::from("image"),
                attribute: String::from("source"),
            })?;
        let source = match parent_path {
            _ if source.starts_with('/') => String::from(source),
            Some(parent) => format!("{}/{source}", parent.trim_end_matches('/')),
            None => String::from(source),
        };
        let dimension = |name: &str| -> Result<Option<u32>, TsxParseError> {
            Ok(image_node.attribute(name).map(str::parse).transpose()?)
        };
        Ok(Image {
            format: String::from(image_node.attribute("format").unwrap_or("")),
            source,
            trans: image_node.attribute("trans").map(String::from),
            width: dimension("width")?,
            height: dimension("height")?,
        })
    }
}

fn parse_tile_offset(offset_node: Node) -> Result<TileOffset, TsxParseError> {
    let mut offset = TileOffset::default();
    for attribute in offset_node.attributes() {
        match attribute.name() {
            "x" => offset.x = attribute.value().parse()?,
            "y" => offset.y = attribute.value().parse()?,
            _ => {}
        }
    }
    Ok(offset)
}

#[cfg(test)]
mod test {
    use roxmltree::Document;
    use crate::{parse, FillMode, ObjectAlignment, TileOffset, TsxParseError};

    fn parse(xml: &str, parent_path: Option<&str>) -> Result<parse::Tileset, TsxParseError> {
        let doc = Document::parse(xml)?;
        parse::Tileset::parse_doc(doc, parent_path)
    }

    #[test]
    fn attributes_and_children() {
        let tileset = parse(r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="dungeon" class="walls" tilewidth="32" tileheight="24" spacing="2" margin="1" tilecount="6" columns="3" objectalignment="bottomleft" fillmode="preserve-aspect-fit">
 <tileoffset x="-4" y="8"/>
 <image source="dungeon.png" trans="ff00ff" width="104" height="52"/>
 <properties>
  <property name="biome" value="cave"/>
 </properties>
 <tile id="2" type="door">
  <properties>
   <property name="locked" type="bool" value="true"/>
  </properties>
  <animation>
   <frame tileid="2" duration="100"/>
  </animation>
 </tile>
 <wangsets/>
</tileset>"#, Some("assets")).unwrap();

        assert_eq!("1.10", tileset.version);
        assert_eq!("dungeon", tileset.name);
        assert_eq!("walls", tileset.class);
        assert_eq!((32, 24), (tileset.tile_width, tileset.tile_height));
        assert_eq!((2, 1), (tileset.spacing, tileset.margin));
        assert_eq!((6, 3), (tileset.tile_count, tileset.columns));
        assert_eq!(ObjectAlignment::BottomLeft, tileset.object_alignment);
        assert_eq!(FillMode::PreserveAspectFit, tileset.fill_mode);
        assert_eq!(Some(TileOffset { x: -4, y: 8 }), tileset.tile_offset);

        let image = tileset.image.unwrap();
        assert_eq!("assets/dungeon.png", image.source);
        assert_eq!(Some(String::from("ff00ff")), image.trans);
        assert_eq!((Some(104), Some(52)), (image.width, image.height));

        assert_eq!(1, tileset.properties.len());
        assert_eq!(1, tileset.tiles.len());
        assert_eq!(2, tileset.tiles[0].id);
        assert_eq!("door", tileset.tiles[0].class);
        assert_eq!(1, tileset.tiles[0].properties.len());
    }

    #[test]
    fn wrong_root() {
        let result = parse("<map width=\"10\"/>", None);
        assert!(matches!(result, Err(TsxParseError::UnexpectedTagError { tag_name }) if tag_name == "map"));
    }

    #[test]
    fn tile_without_id() {
        let result = parse("<tileset><tile/></tileset>", None);
        assert!(matches!(result, Err(TsxParseError::MissingAttributeError { .. })));
    }

    #[test]
    fn invalid_enum_value() {
        let result = parse("<tileset objectalignment=\"middle\"/>", None);
        assert!(matches!(result, Err(TsxParseError::InvalidAttributeValue { value }) if value == "middle"));
    }

    #[test]
    fn image_sources() {
        let absolute = parse(r#"<tileset><image source="/atlas/a.png"/></tileset>"#, Some("levels")).unwrap();
        assert_eq!("/atlas/a.png", absolute.image.unwrap().source);
        let rooted = parse(r#"<tileset><image source="a.png"/></tileset>"#, Some("/")).unwrap();
        assert_eq!("/a.png", rooted.image.unwrap().source);
        let bare = parse(r#"<tileset><image source="a.png" width="8"/></tileset>"#, None).unwrap().image.unwrap();
        assert_eq!(("a.png", Some(8), None), (bare.source.as_str(), bare.width, bare.height));
        assert!(matches!(
            parse(r#"<tileset><image width="8"/></tileset>"#, None),
            Err(TsxParseError::MissingAttributeError { attribute, .. }) if attribute == "source"
        ));
        assert!(matches!(
            parse(r#"<tileset><image source="a.png" height="tall"/></tileset>"#, None),
            Err(TsxParseError::ParseIntError(_))
        ));
    }

    #[test]
    fn malformed_xml() {
        let result = parse("<tileset><tile id=\"1\"></tileset>", None);
        assert!(matches!(result, Err(TsxParseError::XmlError(_))));
    }
}
