//! Project-level keys shared by build-tool presets.
//!
//! Declares the directory layout (`rootDir`, `srcDir`, `buildDir`,
//! `workspaceDir`, `modulesDir`), the `dev`/`debug` flags, framework
//! defaults under `vue`, `build.transpile` and `app.buildAssetsDir`.
//! Relative directories given by the user are resolved against `rootDir`.

use crate::support::{normalize, path_string, resolve_path};
use keystone_rs_core::{Group, Leaf, Schema};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Build output directory relative to `rootDir`.
const BUILD_DIR: &str = ".nuxt";

/// Inputs the preset cannot read from the tree.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Directory `rootDir` defaults to and relative roots resolve against.
    pub cwd: PathBuf,
}

impl ProjectOptions {
    /// Options rooted at `cwd`.
    ///
    /// `cwd` is normalized lexically; a path that normalizes to nothing
    /// becomes `.`. Pass an absolute path to get absolute directories.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: working_dir(cwd.as_ref()),
        }
    }
}

fn working_dir(cwd: &Path) -> PathBuf {
    let cwd = normalize(cwd);
    if cwd.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cwd
    }
}

/// Schema contributing the project-level keys.
pub fn schema(options: ProjectOptions) -> Schema {
    let cwd = path_string(&working_dir(&options.cwd));
    Schema::new(
        Group::new()
            .with(
                "rootDir",
                Leaf::from_fn(move |value, _| {
                    let cwd = cwd.clone();
                    async move {
                        Ok(match value {
                            Some(Value::String(root)) => json!(resolve_path(&cwd, &root)),
                            _ => json!(cwd),
                        })
                    }
                })
                .with_description("Project root directory"),
            )
            .with("workspaceDir", under_root(None))
            .with("srcDir", under_root(None))
            .with("buildDir", under_root(Some(BUILD_DIR)))
            .with(
                "modulesDir",
                Leaf::from_fn(|value, get| async move {
                    let root: String = get.get_as("rootDir").await?;
                    let mut dirs = vec![json!(resolve_path(&root, "node_modules"))];
                    if let Some(Value::Array(extra)) = value {
                        dirs.extend(extra.into_iter().map(|dir| match dir {
                            Value::String(dir) => json!(resolve_path(&root, &dir)),
                            other => other,
                        }));
                    }
                    Ok(Value::Array(dirs))
                }),
            )
            .with("dev", Leaf::from_default(false))
            .with("debug", Leaf::from_default(false))
            .with("vue", vue_group())
            .with(
                "build",
                Group::new().with("transpile", Leaf::from_default(json!([]))),
            )
            .with(
                "app",
                Group::new().with("buildAssetsDir", Leaf::from_default("/_nuxt/")),
            ),
    )
}

fn vue_group() -> Group {
    Group::new()
        .with("compilerOptions", Leaf::from_default(json!({})))
        .with(
            "transformAssetUrls",
            Leaf::from_default(json!({
                "video": ["src", "poster"],
                "source": ["src"],
                "img": ["src"],
                "image": ["xlink:href", "href"],
                "use": ["xlink:href", "href"]
            })),
        )
        .with(
            "script",
            Group::new().with(
                "propsDestructure",
                Leaf::new().with_description("Overrides `vue.propsDestructure` for scripts"),
            ),
        )
        .with("propsDestructure", Leaf::from_default(true))
}

/// A directory that defaults to `rootDir` (plus `suffix`) and resolves
/// relative user values against it.
fn under_root(suffix: Option<&'static str>) -> Leaf {
    Leaf::from_fn(move |value, get| async move {
        let root: String = get.get_as("rootDir").await?;
        Ok(match (value, suffix) {
            (Some(Value::String(dir)), _) => json!(resolve_path(&root, &dir)),
            (Some(other), _) => other,
            (None, Some(suffix)) => json!(resolve_path(&root, suffix)),
            (None, None) => json!(root),
        })
    })
}
