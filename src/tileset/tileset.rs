use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use glam::{UVec2, Vec2};
use roxmltree::Document;
use crate::{parse, AnimationSequence, Frame, Gid, HashMap, Properties, Tile, TileProperties, TsxParseError};
use crate::parse::Image;

/// A processed version of [`parse::Tileset`] with tiles keyed by id and their properties typed.
#[derive(Clone, Default, Debug)]
pub struct Tileset {
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
    pub tiles: BTreeMap<u32, Tile>,
}

impl Tileset {

    pub fn from_parsed(parsed_tileset: parse::Tileset) -> Result<Self, TsxParseError> {
        let mut tiles = BTreeMap::new();
        for parsed_tile in parsed_tileset.tiles {
            let id = parsed_tile.id;
            let tile = Tile::from_parsed(parsed_tile)?;
            match tiles.entry(id) {
                Entry::Vacant(entry) => { entry.insert(tile); },
                Entry::Occupied(_) => return Err(TsxParseError::DuplicateTile { id }),
            }
        }
        log::debug!("Tileset '{}' annotates {} of {} tiles", parsed_tileset.name, tiles.len(), parsed_tileset.tile_count);
        Ok(Self {
            name: parsed_tileset.name,
            class: parsed_tileset.class,
            tile_width: parsed_tileset.tile_width,
            tile_height: parsed_tileset.tile_height,
            spacing: parsed_tileset.spacing,
            margin: parsed_tileset.margin,
            tile_count: parsed_tileset.tile_count,
            columns: parsed_tileset.columns,
            object_alignment: parsed_tileset.object_alignment,
            tile_render_size: parsed_tileset.tile_render_size,
            fill_mode: parsed_tileset.fill_mode,
            tile_offset: parsed_tileset.tile_offset,
            image: parsed_tileset.image,
            properties: parsed_tileset.properties,
            tiles,
        })
    }

    /// Parses a tsx document held in memory.
    /// Image sources are resolved against parent_path.
    pub fn parse_str(xml_source: &str, parent_path: Option<&str>) -> Result<Self, TsxParseError> {
        let doc = Document::parse(xml_source)?;
        let parsed_tileset = parse::Tileset::parse_doc(doc, parent_path)?;
        Self::from_parsed(parsed_tileset)
    }

    /// Typed properties of a tile.
    /// None if the tile has no entry or lies outside the grid.
    pub fn properties(&self, id: u32) -> Option<&TileProperties> {
        self.tile(id).map(|tile| &tile.meta)
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        if id >= self.tile_count { return None }
        self.tiles.get(&id)
    }

    /// Tiles that carry data, in ascending id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of rows in the grid.
    /// Taken from the image when its size is known, otherwise implied by tile count and columns.
    pub fn rows(&self) -> u32 {
        if let Some(rows) = self.image_rows() {
            return rows;
        }
        if self.columns == 0 { return 0 }
        self.tile_count.div_ceil(self.columns)
    }

    /// Columns that fit in the image, accounting for margin and spacing.
    pub fn image_columns(&self) -> Option<u32> {
        let width = self.image.as_ref()?.width?;
        fit_count(width, self.tile_width, self.margin, self.spacing)
    }

    /// Rows that fit in the image, accounting for margin and spacing.
    pub fn image_rows(&self) -> Option<u32> {
        let height = self.image.as_ref()?.height?;
        fit_count(height, self.tile_height, self.margin, self.spacing)
    }

    /// Column and row of a tile.
    pub fn grid_position(&self, id: u32) -> Option<UVec2> {
        if id >= self.tile_count || self.columns == 0 { return None }
        Some(UVec2::new(id % self.columns, id / self.columns))
    }

    /// Pixel region of a tile within the atlas image.
    /// None if the position does not fit in a u32.
    pub fn source_rect(&self, id: u32) -> Option<TileRect> {
        let cell = self.grid_position(id)?;
        let x = cell_offset(cell.x, self.tile_width, self.margin, self.spacing)?;
        let y = cell_offset(cell.y, self.tile_height, self.margin, self.spacing)?;
        Some(TileRect {
            origin: UVec2::new(x, y),
            size: UVec2::new(self.tile_width, self.tile_height),
        })
    }

    /// Region of a tile normalized to the image size.
    /// None if the image size is unknown.
    pub fn uv_rect(&self, id: u32) -> Option<UvRect> {
        let image = self.image.as_ref()?;
        let image_size = Vec2::new(image.width? as f32, image.height? as f32);
        if image_size.x == 0.0 || image_size.y == 0.0 { return None }
        let rect = self.source_rect(id)?;
        let min = rect.origin.as_vec2() / image_size;
        let max = (rect.origin.as_vec2() + rect.size.as_vec2()) / image_size;
        Some(UvRect { min, max })
    }

    /// Tile depicting the given frame of an entity.
    pub fn find_entity_frame(&self, entity: &str, keyframe: u32) -> Option<u32> {
        self.tiles()
            .find(|tile| tile.meta.entity.as_deref() == Some(entity) && tile.meta.keyframe == Some(keyframe))
            .map(|tile| tile.id)
    }

    /// Distinct entity names, sorted.
    pub fn entities(&self) -> Vec<&str> {
        let mut entities: Vec<&str> = self.tiles()
            .filter_map(|tile| tile.meta.entity.as_deref())
            .collect();
        entities.sort_unstable();
        entities.dedup();
        entities
    }

    /// Frames of an entity ordered by keyframe.
    pub fn animation(&self, entity: &str) -> Option<AnimationSequence> {
        let frames = self.tiles()
            .filter(|tile| tile.meta.entity.as_deref() == Some(entity))
            .map(Frame::from_tile);
        let sequence = AnimationSequence::new(entity, frames);
        if sequence.is_empty() { None } else { Some(sequence) }
    }

    /// Every animation in the tileset, sorted by entity name.
    pub fn animations(&self) -> Vec<AnimationSequence> {
        let mut grouped: HashMap<&str, Vec<Frame>> = HashMap::default();
        for tile in self.tiles() {
            if let Some(entity) = tile.meta.entity.as_deref() {
                grouped.entry(entity).or_default().push(Frame::from_tile(tile));
            }
        }
        let mut animations: Vec<AnimationSequence> = grouped
            .into_iter()
            .map(|(entity, frames)| AnimationSequence::new(entity, frames))
            .collect();
        animations.sort_by(|a, b| a.entity.cmp(&b.entity));
        animations
    }

    /// Spawn marker tiles of the given kind.
    pub fn spawn_tiles(&self, kind: &str) -> Vec<u32> {
        self.tiles()
            .filter(|tile| tile.meta.spawn.as_deref() == Some(kind))
            .map(|tile| tile.id)
            .collect()
    }

    /// Distinct spawn kinds, sorted.
    pub fn spawn_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.tiles()
            .filter_map(|tile| tile.meta.spawn.as_deref())
            .collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    /// Local tile id of a map gid, given the first gid assigned to this tileset.
    /// None for empty cells and gids belonging to other tilesets.
    pub fn resolve_gid(&self, gid: Gid, first_gid: u32) -> Option<u32> {
        if gid.is_empty() { return None }
        let local_id = gid.id().checked_sub(first_gid)?;
        if local_id >= self.tile_count { return None }
        Some(local_id)
    }
}

/// Tiles of tile_length that fit along length.
/// Computed in u64 since every term comes straight from the file.
fn fit_count(length: u32, tile_length: u32, margin: u32, spacing: u32) -> Option<u32> {
    let step = u64::from(tile_length) + u64::from(spacing);
    if step == 0 { return None }
    let usable = u64::from(length).checked_sub(2 * u64::from(margin))? + u64::from(spacing);
    u32::try_from(usable / step).ok()
}

/// Pixel offset of a cell along one axis.
fn cell_offset(cell: u32, tile_length: u32, margin: u32, spacing: u32) -> Option<u32> {
    let step = u64::from(tile_length) + u64::from(spacing);
    let offset = u64::from(margin) + step * u64::from(cell);
    u32::try_from(offset).ok()
}

/// Pixel region of a tile.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileRect {
    pub origin: UVec2,
    pub size: UVec2,
}

/// Normalized region of a tile.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum ObjectAlignment {
    #[default]
    Unspecified,
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ObjectAlignment {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "unspecified" => Ok(Self::Unspecified),
            "topleft" => Ok(Self::TopLeft),
            "top" => Ok(Self::Top),
            "topright" => Ok(Self::TopRight),
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "bottomleft" => Ok(Self::BottomLeft),
            "bottom" => Ok(Self::Bottom),
            "bottomright" => Ok(Self::BottomRight),
            _ => Err(TsxParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum FillMode {
    #[default]
    Stretch,
    PreserveAspectFit,
}

impl FillMode {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "stretch" => Ok(Self::Stretch),
            "preserve-aspect-fit" => Ok(Self::PreserveAspectFit),
            _ => Err(TsxParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum TileRenderSize {
    #[default]
    Tile,
    Grid,
}

impl TileRenderSize {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "tile" => Ok(Self::Tile),
            "grid" => Ok(Self::Grid),
            _ => Err(TsxParseError::InvalidAttributeValue { value: String::from(str) })
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

#[cfg(test)]
mod test {
    use glam::{UVec2, Vec2};
    use crate::{Gid, Tileset, TsxParseError};

    const SPACED: &str = r#"<tileset name="spaced" tilewidth="16" tileheight="16" spacing="2" margin="1" tilecount="6" columns="3">
 <image source="spaced.png" width="54" height="36"/>
 <tile id="4">
  <properties>
   <property name="entity" value="torch"/>
   <property name="keyframe" type="int" value="1"/>
   <property name="delay" type="int" value="80"/>
  </properties>
 </tile>
 <tile id="1">
  <properties>
   <property name="entity" value="torch"/>
   <property name="keyframe" type="int" value="0"/>
   <property name="delay" type="int" value="80"/>
  </properties>
 </tile>
 <tile id="9">
  <properties>
   <property name="spawn" value="ghost"/>
  </properties>
 </tile>
</tileset>"#;

    #[test]
    fn grid_with_margin_and_spacing() {
        let tileset = Tileset::parse_str(SPACED, None).unwrap();
        assert_eq!(2, tileset.rows());
        assert_eq!(Some(3), tileset.image_columns());
        assert_eq!(Some(2), tileset.image_rows());
        assert_eq!(Some(UVec2::new(1, 1)), tileset.grid_position(4));
        assert_eq!(None, tileset.grid_position(6));

        let rect = tileset.source_rect(4).unwrap();
        assert_eq!(UVec2::new(19, 19), rect.origin);
        assert_eq!(UVec2::new(16, 16), rect.size);

        let uv = tileset.uv_rect(0).unwrap();
        assert_eq!(Vec2::new(1.0 / 54.0, 1.0 / 36.0), uv.min);
        assert_eq!(Vec2::new(17.0 / 54.0, 17.0 / 36.0), uv.max);
    }

    #[test]
    fn tiles_are_ordered() {
        let tileset = Tileset::parse_str(SPACED, None).unwrap();
        let ids: Vec<u32> = tileset.tiles().map(|tile| tile.id).collect();
        assert_eq!(vec![1, 4, 9], ids);
    }

    #[test]
    fn out_of_range_lookup() {
        let tileset = Tileset::parse_str(SPACED, None).unwrap();
        assert!(tileset.tiles.contains_key(&9));
        assert_eq!(None, tileset.properties(9));
        assert_eq!(None, tileset.properties(2));
        assert_eq!(Some(80), tileset.properties(1).and_then(|properties| properties.delay));
    }

    #[test]
    fn animation_sorted_by_keyframe() {
        let tileset = Tileset::parse_str(SPACED, None).unwrap();
        let torch = tileset.animation("torch").unwrap();
        let tile_ids: Vec<u32> = torch.frames.iter().map(|frame| frame.tile_id).collect();
        assert_eq!(vec![1, 4], tile_ids);
        assert_eq!(Some(4), tileset.find_entity_frame("torch", 1));
        assert_eq!(None, tileset.find_entity_frame("torch", 2));
        assert!(tileset.animation("lamp").is_none());
    }

    #[test]
    fn duplicate_tiles() {
        let result = Tileset::parse_str(r#"<tileset tilecount="2" columns="2"><tile id="1"/><tile id="1"/></tileset>"#, None);
        assert!(matches!(result, Err(TsxParseError::DuplicateTile { id: 1 })));
    }

    #[test]
    fn resolve_gid() {
        let tileset = Tileset::parse_str(SPACED, None).unwrap();
        assert_eq!(None, tileset.resolve_gid(Gid(0), 1));
        assert_eq!(Some(0), tileset.resolve_gid(Gid(1), 1));
        assert_eq!(Some(5), tileset.resolve_gid(Gid(6), 1));
        assert_eq!(None, tileset.resolve_gid(Gid(7), 1));
        assert_eq!(None, tileset.resolve_gid(Gid(3), 10));
        assert_eq!(Some(2), tileset.resolve_gid(Gid(3 | Gid::FLIPPED_HORIZONTALLY), 1));
    }

    #[test]
    fn rows_follow_image() {
        let tileset = Tileset::parse_str(r#"<tileset tilewidth="16" tileheight="16" tilecount="50" columns="10">
            <image source="atlas.png" width="160" height="96"/>
        </tileset>"#, None).unwrap();
        assert_eq!(6, tileset.rows());
        let tileset = Tileset::parse_str(r#"<tileset tilewidth="16" tileheight="16" tilecount="50" columns="10">
            <image source="atlas.png" width="160"/>
        </tileset>"#, None).unwrap();
        assert_eq!(5, tileset.rows());
    }

    #[test]
    fn huge_attributes_do_not_overflow() {
        let tall = Tileset::parse_str(r#"<tileset tilewidth="1" tileheight="1" tilecount="10" columns="10">
            <image source="atlas.png" width="10" height="4294967295"/>
        </tileset>"#, None).unwrap();
        assert_eq!(Some(u32::MAX), tall.image_rows());

        let margin = Tileset::parse_str(r#"<tileset tilewidth="16" tileheight="16" margin="2147483648" tilecount="4" columns="2">
            <image source="atlas.png" width="32" height="32"/>
        </tileset>"#, None).unwrap();
        assert_eq!(None, margin.image_columns());
        assert_eq!(Some(UVec2::splat(2_147_483_664)), margin.source_rect(3).map(|rect| rect.origin));

        let spacing = Tileset::parse_str(r#"<tileset tilewidth="16" tileheight="16" spacing="4294967295" tilecount="4" columns="2">
            <image source="atlas.png" width="32" height="32"/>
        </tileset>"#, None).unwrap();
        assert_eq!(None, spacing.source_rect(3));
        assert_eq!(None, spacing.uv_rect(3));
        assert_eq!(Some(UVec2::ZERO), spacing.source_rect(0).map(|rect| rect.origin));
        assert_eq!(Some(1), spacing.image_columns());
    }

    #[test]
    fn zero_columns() {
        let tileset = Tileset::parse_str("<tileset tilecount=\"4\" columns=\"0\"/>", None).unwrap();
        assert_eq!(0, tileset.rows());
        assert_eq!(None, tileset.grid_position(0));
        assert_eq!(None, tileset.image_columns());
    }
}
