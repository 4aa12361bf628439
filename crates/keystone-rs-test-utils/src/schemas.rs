use keystone_rs_core::{Group, Leaf, Schema};
use serde_json::{Value, json};

/// `{ a: { $default: 1 }, b: get(a) + 1 }`
pub fn arithmetic_schema() -> Schema {
    Schema::new(
        Group::new().with("a", Leaf::from_default(1)).with(
            "b",
            Leaf::from_fn(|_, get| async move {
                let a: i64 = get.get_as("a").await?;
                Ok(json!(a + 1))
            }),
        ),
    )
}

fn or_root(value: Option<Value>, root: Value, suffix: &str) -> Value {
    value.unwrap_or_else(|| match root {
        Value::String(root) => Value::String(format!("{}{suffix}", root.trim_end_matches('/'))),
        other => other,
    })
}

/// A small project-level contributor providing the keys build-tool presets
/// read: directories, `dev`/`debug`, `vue`, `build.transpile` and `app`.
pub fn base_schema() -> Schema {
    Schema::new(
        Group::new()
            .with("rootDir", Leaf::from_default("/project"))
            .with(
                "srcDir",
                Leaf::from_fn(|value, get| async move {
                    Ok(or_root(value, get.get("rootDir").await?, ""))
                }),
            )
            .with(
                "workspaceDir",
                Leaf::from_fn(|value, get| async move {
                    Ok(or_root(value, get.get("rootDir").await?, ""))
                }),
            )
            .with(
                "buildDir",
                Leaf::from_fn(|value, get| async move {
                    Ok(or_root(value, get.get("rootDir").await?, "/.nuxt"))
                }),
            )
            .with(
                "modulesDir",
                Leaf::from_fn(|value, get| async move {
                    let root = get.get("rootDir").await?;
                    let mut dirs = vec![or_root(None, root, "/node_modules")];
                    if let Some(Value::Array(extra)) = value {
                        dirs.extend(extra);
                    }
                    Ok(Value::Array(dirs))
                }),
            )
            .with("dev", Leaf::from_default(false))
            .with("debug", Leaf::from_default(false))
            .with(
                "vue",
                Group::new()
                    .with("compilerOptions", Leaf::from_default(json!({})))
                    .with(
                        "transformAssetUrls",
                        Leaf::from_default(json!({ "video": ["src", "poster"] })),
                    )
                    .with("propsDestructure", Leaf::from_default(true)),
            )
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
