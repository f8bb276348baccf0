use std::fmt;
use derive_more::*;
use tracing::instrument;
use crate::{FillMode, HashSet, TileRenderSize, Tileset, ValidationConfig};

/// A single broken invariant in a tileset.
#[derive(Display, Clone, Eq, PartialEq, Debug)]
pub enum ValidationIssue {
    #[display(fmt="Tile {id} lies outside the tileset of {tile_count} tiles")]
    TileOutOfRange { id: u32, tile_count: u32 },
    #[display(fmt="Tile count {tile_count} does not equal {columns} columns x {rows} rows")]
    TileCountMismatch { tile_count: u32, columns: u32, rows: u32 },
    #[display(fmt="Tileset declares {declared} columns but its image fits {from_image}")]
    ColumnsMismatch { declared: u32, from_image: u32 },
    #[display(fmt="Tile size is {width}x{height}, expected {expected_width}x{expected_height}")]
    TileSizeMismatch { width: u32, height: u32, expected_width: u32, expected_height: u32 },
    #[display(fmt="Fill mode {fill_mode:?} has no effect unless tiles render at grid size")]
    FillModeIgnored { fill_mode: FillMode },
    #[display(fmt="Entity '{entity}' has keyframe {keyframe} on both tile {first} and tile {second}")]
    DuplicateKeyframe { entity: String, keyframe: u32, first: u32, second: u32 },
    #[display(fmt="Entity '{entity}' is missing keyframe {missing}")]
    KeyframeGap { entity: String, missing: u32 },
    #[display(fmt="Tile {tile} of entity '{entity}' has no keyframe")]
    MissingKeyframe { entity: String, tile: u32 },
    #[display(fmt="Tile {tile} of entity '{entity}' has no delay")]
    MissingDelay { entity: String, tile: u32 },
    #[display(fmt="Spawn tile {tile} ('{spawn}') is not marked invisible")]
    VisibleSpawn { tile: u32, spawn: String },
    #[display(fmt="Required entity '{entity}' is not animated by any tile")]
    MissingEntity { entity: String },
    #[display(fmt="Required spawn '{spawn}' has no marker tile")]
    MissingSpawn { spawn: String },
    #[display(fmt="Image '{source}' is {width}x{height}, tileset declares {declared_width}x{declared_height}")]
    ImageSizeMismatch { source: String, width: u32, height: u32, declared_width: u32, declared_height: u32 },
    #[display(fmt="Image '{source}' could not be read: {reason}")]
    ImageUnreadable { source: String, reason: String },
}

/// Result of validating a tileset.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "OK");
        }
        for issue in &self.issues {
            writeln!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Checks the structural invariants of a tileset.
#[instrument(skip_all)]
pub fn validate(tileset: &Tileset, config: &ValidationConfig) -> ValidationReport {
    let mut issues = Vec::new();
    check_grid(tileset, config, &mut issues);
    check_tile_ids(tileset, &mut issues);
    check_animations(tileset, config, &mut issues);
    check_spawns(tileset, config, &mut issues);
    if config.check_image {
        issues.extend(verify_image(tileset));
    }
    log::debug!("Tileset '{}' has {} issue(s)", tileset.name, issues.len());
    ValidationReport { issues }
}

fn check_grid(tileset: &Tileset, config: &ValidationConfig, issues: &mut Vec<ValidationIssue>) {
    if let Some([expected_width, expected_height]) = config.tile_size {
        if (tileset.tile_width, tileset.tile_height) != (expected_width, expected_height) {
            issues.push(ValidationIssue::TileSizeMismatch {
                width: tileset.tile_width,
                height: tileset.tile_height,
                expected_width,
                expected_height,
            });
        }
    }
    if tileset.fill_mode != FillMode::Stretch && tileset.tile_render_size == TileRenderSize::Tile {
        issues.push(ValidationIssue::FillModeIgnored { fill_mode: tileset.fill_mode });
    }
    if let Some(from_image) = tileset.image_columns() {
        if from_image != tileset.columns {
            issues.push(ValidationIssue::ColumnsMismatch { declared: tileset.columns, from_image });
        }
    }
    let rows = tileset.rows();
    if u64::from(tileset.columns) * u64::from(rows) != u64::from(tileset.tile_count) {
        issues.push(ValidationIssue::TileCountMismatch {
            tile_count: tileset.tile_count,
            columns: tileset.columns,
            rows,
        });
    }
}

fn check_tile_ids(tileset: &Tileset, issues: &mut Vec<ValidationIssue>) {
    for tile in tileset.tiles() {
        if tile.id >= tileset.tile_count {
            issues.push(ValidationIssue::TileOutOfRange { id: tile.id, tile_count: tileset.tile_count });
        }
    }
}

fn check_animations(tileset: &Tileset, config: &ValidationConfig, issues: &mut Vec<ValidationIssue>) {
    let animations = tileset.animations();
    for animation in &animations {
        let entity = &animation.entity;

        // Frames are sorted, so duplicates are adjacent and unkeyed frames trail
        for pair in animation.frames.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].keyframe, pair[1].keyframe) {
                if a == b {
                    issues.push(ValidationIssue::DuplicateKeyframe {
                        entity: entity.clone(),
                        keyframe: a,
                        first: pair[0].tile_id,
                        second: pair[1].tile_id,
                    });
                }
            }
        }
        let keyframes: HashSet<u32> = animation.keyframes().collect();
        if let Some(max) = keyframes.iter().copied().max() {
            for missing in (0..max).filter(|keyframe| !keyframes.contains(keyframe)) {
                issues.push(ValidationIssue::KeyframeGap { entity: entity.clone(), missing });
            }
        }
        for frame in &animation.frames {
            if frame.keyframe.is_none() {
                issues.push(ValidationIssue::MissingKeyframe { entity: entity.clone(), tile: frame.tile_id });
            }
            if config.require_delay && frame.delay.map_or(true, |delay| delay == 0) {
                issues.push(ValidationIssue::MissingDelay { entity: entity.clone(), tile: frame.tile_id });
            }
        }
    }
    for required in &config.required_entities {
        if !animations.iter().any(|animation| &animation.entity == required) {
            issues.push(ValidationIssue::MissingEntity { entity: required.clone() });
        }
    }
}

fn check_spawns(tileset: &Tileset, config: &ValidationConfig, issues: &mut Vec<ValidationIssue>) {
    for tile in tileset.tiles() {
        if let Some(spawn) = &tile.meta.spawn {
            if tile.meta.visible != Some(false) {
                issues.push(ValidationIssue::VisibleSpawn { tile: tile.id, spawn: spawn.clone() });
            }
        }
    }
    let kinds = tileset.spawn_kinds();
    for required in &config.required_spawns {
        if !kinds.contains(&required.as_str()) {
            issues.push(ValidationIssue::MissingSpawn { spawn: required.clone() });
        }
    }
}

/// Compares the atlas image on disk against the size declared in the tileset.
/// Tilesets without an image, or without a declared size, are skipped.
pub fn verify_image(tileset: &Tileset) -> Option<ValidationIssue> {
    let atlas = tileset.image.as_ref()?;
    let (declared_width, declared_height) = (atlas.width?, atlas.height?);
    let source = atlas.source.clone();
    match image::image_dimensions(&source) {
        Ok((width, height)) if (width, height) == (declared_width, declared_height) => None,
        Ok((width, height)) => Some(ValidationIssue::ImageSizeMismatch {
            source,
            width,
            height,
            declared_width,
            declared_height,
        }),
        Err(err) => Some(ValidationIssue::ImageUnreadable { source, reason: err.to_string() }),
    }
}
