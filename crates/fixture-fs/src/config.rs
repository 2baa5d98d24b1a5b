//! Format-agnostic configuration loading and saving

use crate::{Document, Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        self.parse(path, &content)
    }

    /// Load a YAML/JSON/TOML file as an untyped [`Document`].
    ///
    /// A file whose top level is not a mapping (for example an empty file)
    /// loads as an empty document.
    pub fn load_document(&self, path: &NormalizedPath) -> Result<Document> {
        let content = io::read_text(path)?;
        match format_of(path)? {
            Format::Yaml => {
                let value: serde_yaml::Value = self.parse(path, &content)?;
                Ok(Document::from_value(value))
            }
            _ => self.parse(path, &content),
        }
    }

    /// Parse `content` as the format implied by `path`.
    pub fn parse<T: DeserializeOwned>(&self, path: &NormalizedPath, content: &str) -> Result<T> {
        match format_of(path)? {
            Format::Toml => toml::from_str(content).map_err(|e| Error::ConfigParse {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            Format::Json => serde_json::from_str(content).map_err(|e| Error::ConfigParse {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            Format::Yaml => serde_yaml::from_str(content).map_err(|e| Error::ConfigParse {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
        }
    }

    /// Render `value` in the format implied by `path` without touching disk.
    pub fn render<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<String> {
        match format_of(path)? {
            Format::Toml => toml::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
                    path: path.to_native(),
                    format: "JSON".into(),
                    message: e.to_string(),
                })
            }
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| Error::ConfigSerialize {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
        }
    }

    /// Save configuration to a file.
    ///
    /// Uses atomic write to prevent corruption.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let content = self.render(path, value)?;
        io::write_atomic(path, content.as_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
    Yaml,
}

fn format_of(path: &NormalizedPath) -> Result<Format> {
    let extension = path.extension().unwrap_or("");
    match extension.to_lowercase().as_str() {
        "toml" => Ok(Format::Toml),
        "json" => Ok(Format::Json),
        "yaml" | "yml" => Ok(Format::Yaml),
        _ => Err(Error::UnsupportedFormat {
            extension: extension.to_string(),
        }),
    }
}
