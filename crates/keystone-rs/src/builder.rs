//! One-call setup: contributors, user layers, pass options.

use crate::KeystoneError;
use keystone_rs_config::{ConfigLayer, LayeredUserConfig, UserConfigLayer};
use keystone_rs_core::{ResolveOptions, ResolverRegistry, Schema, resolve_config_with};
use log::{debug, info};
use serde_json::Value;

/// Label given to overrides added with [`Keystone::with_user_config`].
const OVERRIDES_LABEL: &str = "overrides";

/// Collects schema contributors and user config layers, then runs a pass.
///
/// Contributors merge in the order they were added (later ones win on
/// conflicting paths), and so do user layers.
#[derive(Debug, Default, Clone)]
pub struct Keystone {
    contributors: Vec<Schema>,
    layers: Vec<UserConfigLayer>,
    options: ResolveOptions,
}

impl Keystone {
    /// An empty builder: no contributors, no layers, default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema contributor.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.contributors.push(schema);
        self
    }

    /// Add a contributor written as a declarative tree (`$default`,
    /// `$resolve`, `$description`), resolving names through `registry`.
    pub fn with_declarative_schema(
        self,
        value: &Value,
        registry: &ResolverRegistry,
    ) -> Result<Self, KeystoneError> {
        let schema = Schema::from_value(value, registry)?;
        Ok(self.with_schema(schema))
    }

    /// Add a user config layer above the ones already added.
    pub fn with_layer(mut self, layer: UserConfigLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Add programmatic overrides above the layers already added.
    pub fn with_user_config(self, value: Value) -> Self {
        self.with_layer(UserConfigLayer::value(OVERRIDES_LABEL, value))
    }

    /// Options for the pass, e.g. completion-order tracing.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The merged schema a pass would run against.
    pub fn schema(&self) -> Schema {
        Schema::merge(self.contributors.iter().cloned())
    }

    /// Load the user layers and run one resolution pass.
    pub async fn resolve(&self) -> Result<ResolvedConfig, KeystoneError> {
        info!(
            "resolving config (contributors={}, layers={})",
            self.contributors.len(),
            self.layers.len()
        );
        let user = LayeredUserConfig::load(self.layers.iter().cloned())?;
        debug!("user config ready (applied_layers={})", user.layers.len());
        let layers = user.layers.clone();
        let resolution =
            resolve_config_with(self.schema(), user.into_value(), self.options.clone()).await?;
        Ok(ResolvedConfig {
            value: resolution.value,
            order: resolution.order,
            layers,
        })
    }
}

/// Output of [`Keystone::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// The resolved tree.
    pub value: Value,
    /// Completion order, when tracing was requested.
    pub order: Vec<String>,
    /// User layers that were applied, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

impl ResolvedConfig {
    /// Read a dot-separated path from the resolved tree.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.value);
        }
        path.split('.')
            .try_fold(&self.value, |value, segment| value.get(segment))
    }
}
