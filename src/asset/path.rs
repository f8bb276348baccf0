use std::fmt;
use crate::LoadError;

/**
 * Deconstructed path to a file.
 * IE: file://resources/tileset.tsx
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct AssetPath {
    pub protocol: String,
    pub body: String,
    pub extension: String,
}

impl AssetPath {

    pub fn parse(path: &str, default_protocol: Option<&str>) -> Result<Self, LoadError> {
        let protocol: Option<&str>;
        let mut remainder = path;

        // Reads protocol
        match remainder.split_once("://") {
            Some((left, right)) => {
                protocol = Some(left);
                remainder = right;
            },
            None => protocol = None,
        };
        let Some(protocol) = protocol.or(default_protocol) else {
            return Err(LoadError::NoDefaultProtocol)
        };

        // Reads body and extension. Only the last path segment holds the extension.
        let file_start = remainder.rfind('/').map(|idx| idx + 1).unwrap_or(0);
        let (body, extension) = match remainder[file_start..].rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
                let body = &remainder[..file_start + stem.len()];
                (body, extension)
            },
            _ => return Err(LoadError::PathMissingExtension),
        };

        Ok(Self {
            protocol: protocol.into(),
            body: body.into(),
            extension: extension.into()
        })
    }

    /// Body and extension. No protocol.
    pub fn without_protocol(&self) -> String {
        format!("{}.{}", self.body, self.extension)
    }

    /// Parent directory of this file.
    /// None if it's at the root.
    pub fn parent(&self) -> Option<String> {
        match self.body.rsplit_once('/') {
            Some(("", _)) => Some(String::from("/")),
            Some((parent, _)) => Some(String::from(parent)),
            None => None,
        }
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.without_protocol())
    }
}
