use derive_more::*;
use crate::{AssetPath, Protocol};

/// Takes the contents of a file, and converts them into an asset.
pub trait AssetLoader {
    type AssetType;
    fn load(&self, bytes: &[u8], path: &AssetPath) -> anyhow::Result<Self::AssetType>;
    fn extensions(&self) -> &[&str];

    /// Reads bytes with the protocol named in the path, then loads them.
    fn load_path(&self, protocol: &dyn Protocol, path: &str) -> anyhow::Result<Self::AssetType> {
        let path = AssetPath::parse(path, Some(protocol.name()))?;
        if path.protocol != protocol.name() {
            return Err(LoadError::NoSuchProtocol.into());
        }
        if !self.extensions().contains(&path.extension.as_str()) {
            return Err(LoadError::NoSuchLoader.into());
        }
        let bytes = protocol.read(&path)?;
        self.load(&bytes, &path)
    }
}

#[derive(Error, Debug, Display, Clone, Eq, PartialEq)]
pub enum LoadError {
    #[display(fmt="No default protocol")]
    NoDefaultProtocol,
    #[display(fmt="No such protocol")]
    NoSuchProtocol,
    #[display(fmt="No loader matching extension")]
    NoSuchLoader,
    #[display(fmt="Path missing extension")]
    PathMissingExtension,
    #[display(fmt="No file at '{path}'")]
    NotFound { path: String },
}
