//! IO helpers for reading user config layers.

use super::{ConfigLayer, LayerSource, LoadedLayer, UserConfigLayer};
use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load a layer, or `None` for an optional file that does not exist.
pub(super) fn load_layer(layer: UserConfigLayer) -> Result<Option<LoadedLayer>, ConfigError> {
    let UserConfigLayer { label, source } = layer;
    match source {
        LayerSource::File { path, required } => {
            if !required && !path.exists() {
                debug!(
                    "optional layer missing (label={label}, path={})",
                    path.display()
                );
                return Ok(None);
            }
            debug!("loading user config layer (label={label}, path={})", path.display());
            let contents = fs::read_to_string(&path)?;
            let value = parse_document(&contents, &layer_label(&label, &path))?;
            Ok(Some(LoadedLayer {
                meta: ConfigLayer {
                    label,
                    path: Some(path),
                },
                value,
            }))
        }
        LayerSource::Inline(contents) => {
            let value = parse_document(&contents, &label)?;
            Ok(Some(LoadedLayer {
                meta: ConfigLayer { label, path: None },
                value,
            }))
        }
        LayerSource::Value(value) => {
            ensure_object(&value, &label)?;
            Ok(Some(LoadedLayer {
                meta: ConfigLayer { label, path: None },
                value,
            }))
        }
    }
}

/// Parse JSON5 contents and require an object root.
pub(super) fn parse_document(contents: &str, label: &str) -> Result<Value, ConfigError> {
    let value: Value = json5::from_str(contents)?;
    ensure_object(&value, label)?;
    Ok(value)
}

pub(super) fn ensure_object(value: &Value, label: &str) -> Result<(), ConfigError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{label}: expected an object at the document root"
        )))
    }
}

/// Build a user-friendly label for errors.
fn layer_label(label: &str, path: &Path) -> String {
    format!("{label}({})", path.display())
}
