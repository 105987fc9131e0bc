//! Format-agnostic document loading and saving

use serde::{Serialize, de::DeserializeOwned};
use serde_json::ser::PrettyFormatter;

use crate::{Error, NormalizedPath, Result, io};

/// Reads and writes structured documents.
///
/// Format is detected from the file extension: `.json` for manifests and
/// installed snapshots, `.toml` for settings. JSON output follows Composer's
/// own layout: four-space indentation and a trailing newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        let extension = path.extension().unwrap_or("");

        match extension.to_lowercase().as_str() {
            "json" | "lock" => serde_json::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Serialize a document to the text that [`save`](Self::save) would write.
    pub fn render<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<String> {
        let extension = path.extension().unwrap_or("");

        match extension.to_lowercase().as_str() {
            "json" | "lock" => render_json(value).map_err(|e| Error::DocumentSerialize {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "toml" => toml::to_string_pretty(value).map_err(|e| Error::DocumentSerialize {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Save a document atomically, returning the number of bytes written.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<u64> {
        let content = self.render(path, value)?;
        io::write_text(path, &content)
    }
}

/// Pretty-print JSON with four-space indentation and a trailing newline.
pub fn render_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
