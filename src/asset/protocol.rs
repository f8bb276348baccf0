use crate::{AssetPath, HashMap, LoadError};

/// Source of file bytes, selected by the protocol part of an [`AssetPath`].
pub trait Protocol: Send + Sync + 'static {
    /// Protocol name as written before `://`.
    fn name(&self) -> &str;
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
}

/// Reads from the file system. Relative paths resolve against the working directory.
#[derive(Copy, Clone, Debug)]
pub struct FileProtocol;
impl Protocol for FileProtocol {
    fn name(&self) -> &str { "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let file_path = path.without_protocol();
        log::debug!("Reading {file_path}");
        let bytes = std::fs::read(&file_path)
            .map_err(|err| anyhow::anyhow!("Failed to read '{file_path}': {err}"))?;
        Ok(bytes)
    }
}

/// In-memory files keyed by their path without protocol.
/// Serves resources compiled into the binary.
#[derive(Clone, Default, Debug)]
pub struct RawProtocol {
    files: HashMap<String, &'static [u8]>,
}

impl RawProtocol {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: &'static str) -> Self {
        self.files.insert(path.into(), contents.as_bytes());
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }
}

impl Protocol for RawProtocol {
    fn name(&self) -> &str { "raw" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let key = path.without_protocol();
        match self.files.get(&key) {
            Some(bytes) => Ok(bytes.to_vec()),
            None => Err(LoadError::NotFound { path: key }.into()),
        }
    }
}
