//! User config loading, single-document and layered.
//!
//! Layers are applied lowest precedence first. Objects merge key by key,
//! anything else in a higher layer replaces what lies below it.

mod layer_io;
mod merge;

#[cfg(test)]
mod tests;

use crate::ConfigError;
use log::{debug, info};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A user override document: always an object, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UserConfig {
    value: Value,
}

impl UserConfig {
    /// An empty override set.
    pub fn empty() -> Self {
        Self {
            value: Value::Object(Map::new()),
        }
    }

    /// Wrap an already-parsed document.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        layer_io::ensure_object(&value, "config")?;
        Ok(Self { value })
    }

    /// Load a single document from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading user config from raw contents (len={})", contents.len());
        let value = layer_io::parse_document(contents, "config")?;
        Ok(Self { value })
    }

    /// Load a single document from a path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading user config from path: {}", path.display());
        let contents = fs::read_to_string(path)?;
        let value = layer_io::parse_document(&contents, &path.display().to_string())?;
        Ok(Self { value })
    }

    /// The override tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the config, returning the override tree.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Overlay `other` onto this config.
    pub fn merge(&mut self, other: &UserConfig) {
        merge::merge_json_values(&mut self.value, &other.value);
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self::empty()
    }
}

/// Where a layer's contents come from.
#[derive(Debug, Clone)]
enum LayerSource {
    File { path: PathBuf, required: bool },
    Inline(String),
    Value(Value),
}

/// One entry in a layered load.
#[derive(Debug, Clone)]
pub struct UserConfigLayer {
    label: String,
    source: LayerSource,
}

impl UserConfigLayer {
    /// A file that must exist.
    pub fn file(label: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            label: label.into(),
            source: LayerSource::File {
                path: path.as_ref().to_path_buf(),
                required: true,
            },
        }
    }

    /// A file that is skipped when missing.
    pub fn optional_file(label: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            label: label.into(),
            source: LayerSource::File {
                path: path.as_ref().to_path_buf(),
                required: false,
            },
        }
    }

    /// JSON5 contents held in memory.
    pub fn inline(label: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: LayerSource::Inline(contents.into()),
        }
    }

    /// An already-parsed document, e.g. programmatic overrides.
    pub fn value(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            source: LayerSource::Value(value),
        }
    }

    /// Label used in logs and errors.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Metadata about a layer that contributed to a layered load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    /// Label given when the layer was declared.
    pub label: String,
    /// Location on disk for file layers.
    pub path: Option<PathBuf>,
}

/// Merged overrides plus the layers that produced them.
#[derive(Debug, Clone)]
pub struct LayeredUserConfig {
    /// The merged override tree.
    pub config: UserConfig,
    /// Layers actually applied, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

impl LayeredUserConfig {
    /// Load and merge `layers`, lowest precedence first.
    pub fn load(
        layers: impl IntoIterator<Item = UserConfigLayer>,
    ) -> Result<Self, ConfigError> {
        let mut config = UserConfig::empty();
        let mut applied = Vec::new();

        for layer in layers {
            let Some(loaded) = layer_io::load_layer(layer)? else {
                continue;
            };
            config.merge(&UserConfig {
                value: loaded.value,
            });
            debug!("applied user config layer (label={})", loaded.meta.label);
            applied.push(loaded.meta);
        }

        info!("layered user config loaded (layers={})", applied.len());
        Ok(Self {
            config,
            layers: applied,
        })
    }

    /// Consume the result, returning the merged override tree.
    pub fn into_value(self) -> Value {
        self.config.into_value()
    }
}

/// Internal representation of a loaded layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}
