use std::path::Path;
use serde::{Deserialize, Serialize};

/// Optional checks applied on top of the structural invariants every tileset must hold.
/// Usually read from a YAML file next to the tileset.
#[derive(Clone, Eq, PartialEq, Default, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Every animation frame must have a positive delay.
    pub require_delay: bool,
    pub required_entities: Vec<String>,
    pub required_spawns: Vec<String>,
    /// Expected width and height of a tile in pixels.
    pub tile_size: Option<[u32; 2]>,
    /// Open the atlas image and compare its size with the declared one.
    pub check_image: bool,
}

impl ValidationConfig {

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config '{}': {err}", path.display()))?;
        let config = Self::from_yaml(&yaml)?;
        log::debug!("Loaded validation config from {}", path.display());
        Ok(config)
    }
}
