//! The `vite` sub-configuration.
//!
//! Derives bundler options from project-level keys (`srcDir`, `dev`, `vue`,
//! `app`, the directory list) that other contributors declare. User values
//! under `vite` win wherever the option is meant to be overridable.

use crate::support::{dedupe, get_optional, is_truthy, overlay, push_flat, resolve_path};
use keystone_rs_core::{Group, Leaf, Schema};
use log::warn;
use serde_json::{Map, Value, json};

/// Extensions tried when resolving bare imports.
pub const RESOLVE_EXTENSIONS: &[&str] = &[".mjs", ".js", ".ts", ".jsx", ".tsx", ".json", ".vue"];

/// Always excluded from dependency pre-bundling.
const OPTIMIZE_DEPS_EXCLUDE: &str = "vue-demi";

/// Cache location relative to `rootDir`.
const CACHE_DIR: &str = "node_modules/.cache/vite";

/// Inputs the preset cannot read from the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViteOptions {
    /// Whether the build runs under a test runner.
    pub is_test: bool,
}

impl ViteOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the build as running under tests.
    pub fn with_test(mut self, is_test: bool) -> Self {
        self.is_test = is_test;
        self
    }
}

/// Schema contributing the `vite` group.
pub fn schema(options: ViteOptions) -> Schema {
    Schema::new(Group::new().with("vite", vite_group(options)))
}

fn vite_group(options: ViteOptions) -> Group {
    Group::new()
        .with(
            "root",
            Leaf::from_fn(|value, get| async move {
                match value {
                    Some(value) => Ok(value),
                    None => Ok(get.get("srcDir").await?),
                }
            }),
        )
        .with(
            "mode",
            Leaf::from_fn(|value, get| async move {
                if let Some(value) = value {
                    return Ok(value);
                }
                let dev = get.get("dev").await?;
                Ok(json!(if is_truthy(&dev) {
                    "development"
                } else {
                    "production"
                }))
            }),
        )
        .with("define", define_leaf(options))
        .with(
            "resolve",
            Group::new().with("extensions", Leaf::from_default(json!(RESOLVE_EXTENSIONS))),
        )
        .with(
            "publicDir",
            Leaf::from_fn(|value, _| async move {
                if value.as_ref().is_some_and(is_truthy) {
                    warn!(
                        "`vite.publicDir` cannot be configured directly and is ignored; \
                         set `dir.public` instead"
                    );
                }
                Ok(json!(false))
            }),
        )
        .with("vue", vue_group())
        .with(
            "vueJsx",
            Leaf::from_fn(|value, get| async move {
                let mut base = Map::new();
                if let Some(custom) =
                    get_optional(&get, "vue.compilerOptions.isCustomElement").await?
                {
                    base.insert("isCustomElement".to_string(), custom);
                }
                Ok(overlay(base, value))
            }),
        )
        .with(
            "optimizeDeps",
            Group::new().with(
                "exclude",
                Leaf::from_fn(|value, get| async move {
                    let mut exclude = Vec::new();
                    push_flat(&mut exclude, value);
                    if let Some(Value::Array(transpile)) =
                        get_optional(&get, "build.transpile").await?
                    {
                        exclude.extend(transpile.into_iter().filter(Value::is_string));
                    }
                    exclude.push(json!(OPTIMIZE_DEPS_EXCLUDE));
                    Ok(Value::Array(exclude))
                }),
            ),
        )
        .with(
            "esbuild",
            Group::new()
                .with("jsxFactory", Leaf::from_default("h"))
                .with("jsxFragment", Leaf::from_default("Fragment"))
                .with("tsconfigRaw", Leaf::from_default("{}")),
        )
        .with("clearScreen", Leaf::from_default(true))
        .with(
            "build",
            Group::new()
                .with(
                    "assetsDir",
                    Leaf::from_fn(|value, get| async move {
                        if let Some(value) = value {
                            return Ok(value);
                        }
                        Ok(match get_optional(&get, "app.buildAssetsDir").await? {
                            Some(Value::String(dir)) => {
                                json!(dir.trim_start_matches('/'))
                            }
                            other => other.unwrap_or(Value::Null),
                        })
                    }),
                )
                .with("emptyOutDir", Leaf::from_default(false)),
        )
        .with(
            "server",
            Group::new().with(
                "fs",
                Group::new().with(
                    "allow",
                    Leaf::from_fn(|value, get| async move {
                        let dirs = get
                            .get_all(["buildDir", "srcDir", "rootDir", "workspaceDir"])
                            .await?;
                        let mut allow = Vec::new();
                        for dir in dirs {
                            push_flat(&mut allow, Some(dir));
                        }
                        push_flat(&mut allow, get_optional(&get, "modulesDir").await?);
                        push_flat(&mut allow, value);
                        Ok(Value::Array(dedupe(allow)))
                    }),
                ),
            ),
        )
        .with(
            "cacheDir",
            Leaf::from_fn(|value, get| async move {
                if let Some(value) = value {
                    return Ok(value);
                }
                let root: String = get.get_as("rootDir").await?;
                Ok(json!(resolve_path(&root, CACHE_DIR)))
            }),
        )
}

fn define_leaf(options: ViteOptions) -> Leaf {
    let is_test = options.is_test;
    Leaf::from_fn(move |value, get| async move {
        let debug = is_truthy(&get.get("debug").await?);
        let dev = is_truthy(&get.get("dev").await?);

        let mut base = Map::new();
        base.insert(
            "__VUE_PROD_HYDRATION_MISMATCH_DETAILS__".to_string(),
            json!(debug),
        );
        base.insert("process.dev".to_string(), json!(dev));
        base.insert("import.meta.dev".to_string(), json!(dev));
        base.insert("process.test".to_string(), json!(is_test));
        base.insert("import.meta.test".to_string(), json!(is_test));
        Ok(overlay(base, value))
    })
}

fn vue_group() -> Group {
    Group::new()
        .with(
            "isProduction",
            Leaf::from_fn(|value, get| async move {
                if let Some(value) = value {
                    return Ok(value);
                }
                let dev = get.get("dev").await?;
                Ok(json!(!is_truthy(&dev)))
            }),
        )
        .with(
            "template",
            Group::new()
                .with("compilerOptions", fallback_to("vue.compilerOptions"))
                .with("transformAssetUrls", fallback_to("vue.transformAssetUrls")),
        )
        .with(
            "script",
            Group::new().with("hoistStatic", fallback_to("vue.compilerOptions.hoistStatic")),
        )
        .with(
            "features",
            Group::new().with(
                "propsDestructure",
                Leaf::from_fn(|value, get| async move {
                    if let Some(value) = value {
                        return Ok(value);
                    }
                    let scoped = get_optional(&get, "vue.script.propsDestructure").await?;
                    let configured = match scoped {
                        Some(value) => Some(value),
                        None => get_optional(&get, "vue.propsDestructure").await?,
                    };
                    Ok(json!(configured.as_ref().is_some_and(is_truthy)))
                }),
            ),
        )
}

/// User value, else whatever `path` resolves to (`null` when undeclared).
fn fallback_to(path: &'static str) -> Leaf {
    Leaf::from_fn(move |value, get| async move {
        if let Some(value) = value {
            return Ok(value);
        }
        Ok(get_optional(&get, path).await?.unwrap_or(Value::Null))
    })
}
