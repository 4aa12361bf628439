//! The vite preset resolved on top of a base project contributor.

use keystone_rs_core::{Group, Leaf, Schema, resolve_config};
use keystone_rs_presets::vite::{self, ViteOptions};
use keystone_rs_test_utils::base_schema;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn project(options: ViteOptions) -> Schema {
    Schema::merge([base_schema(), vite::schema(options)])
}

async fn resolve_vite(user: Value) -> Value {
    let output = resolve_config(project(ViteOptions::new()), user)
        .await
        .expect("resolve");
    output["vite"].clone()
}

#[tokio::test]
async fn defaults_follow_project_settings() {
    let vite = resolve_vite(json!({})).await;

    assert_eq!(vite["root"], json!("/project"));
    assert_eq!(vite["mode"], json!("production"));
    assert_eq!(vite["publicDir"], json!(false));
    assert_eq!(vite["clearScreen"], json!(true));
    assert_eq!(vite["cacheDir"], json!("/project/node_modules/.cache/vite"));
    assert_eq!(
        vite["resolve"]["extensions"],
        json!([".mjs", ".js", ".ts", ".jsx", ".tsx", ".json", ".vue"])
    );
    assert_eq!(
        vite["esbuild"],
        json!({ "jsxFactory": "h", "jsxFragment": "Fragment", "tsconfigRaw": "{}" })
    );
    assert_eq!(
        vite["build"],
        json!({ "assetsDir": "_nuxt/", "emptyOutDir": false })
    );
    assert_eq!(vite["optimizeDeps"]["exclude"], json!(["vue-demi"]));
    assert_eq!(vite["vueJsx"], json!({}));
}

#[tokio::test]
async fn dev_flag_drives_mode_define_and_production() {
    let vite = resolve_vite(json!({ "dev": true, "debug": true })).await;

    assert_eq!(vite["mode"], json!("development"));
    assert_eq!(vite["vue"]["isProduction"], json!(false));
    assert_eq!(
        vite["define"],
        json!({
            "__VUE_PROD_HYDRATION_MISMATCH_DETAILS__": true,
            "process.dev": true,
            "import.meta.dev": true,
            "process.test": false,
            "import.meta.test": false
        })
    );
}

#[tokio::test]
async fn test_option_is_reflected_in_define() {
    let output = resolve_config(project(ViteOptions::new().with_test(true)), json!({}))
        .await
        .expect("resolve");
    assert_eq!(output["vite"]["define"]["process.test"], json!(true));
    assert_eq!(output["vite"]["define"]["import.meta.test"], json!(true));
}

#[tokio::test]
async fn user_define_keys_overlay_computed_flags() {
    let vite = resolve_vite(json!({
        "vite": { "define": { "process.dev": "forced", "__APP_VERSION__": "1.0.0" } }
    }))
    .await;
    assert_eq!(vite["define"]["process.dev"], json!("forced"));
    assert_eq!(vite["define"]["__APP_VERSION__"], json!("1.0.0"));
    assert_eq!(vite["define"]["import.meta.dev"], json!(false));
}

#[tokio::test]
async fn user_values_override_derived_options() {
    let vite = resolve_vite(json!({
        "srcDir": "/project/app",
        "vite": {
            "root": "/elsewhere",
            "mode": "staging",
            "cacheDir": "/tmp/vite",
            "build": { "assetsDir": "assets" }
        }
    }))
    .await;
    assert_eq!(vite["root"], json!("/elsewhere"));
    assert_eq!(vite["mode"], json!("staging"));
    assert_eq!(vite["cacheDir"], json!("/tmp/vite"));
    assert_eq!(vite["build"]["assetsDir"], json!("assets"));
}

#[tokio::test]
async fn root_follows_src_dir() {
    let vite = resolve_vite(json!({ "srcDir": "/project/app" })).await;
    assert_eq!(vite["root"], json!("/project/app"));
}

#[tokio::test]
async fn public_dir_is_always_disabled() {
    let vite = resolve_vite(json!({ "vite": { "publicDir": "static" } })).await;
    assert_eq!(vite["publicDir"], json!(false));
}

#[tokio::test]
async fn vue_options_fall_back_to_project_vue_settings() {
    let vite = resolve_vite(json!({
        "vue": {
            "compilerOptions": { "hoistStatic": false, "isCustomElement": "my-" }
        }
    }))
    .await;
    let vue = &vite["vue"];
    assert_eq!(
        vue["template"]["compilerOptions"],
        json!({ "hoistStatic": false, "isCustomElement": "my-" })
    );
    assert_eq!(
        vue["template"]["transformAssetUrls"],
        json!({ "video": ["src", "poster"] })
    );
    assert_eq!(vue["script"]["hoistStatic"], json!(false));
    assert_eq!(vue["features"]["propsDestructure"], json!(true));
    assert_eq!(vite["vueJsx"], json!({ "isCustomElement": "my-" }));
}

#[tokio::test]
async fn props_destructure_reads_script_setting_first() {
    let base = Schema::new(Group::new().with(
        "vue",
        Group::new().with(
            "script",
            Group::new().with("propsDestructure", Leaf::from_default(false)),
        ),
    ));
    let schema = Schema::merge([base_schema(), base, vite::schema(ViteOptions::new())]);
    let output = resolve_config(schema, json!({})).await.expect("resolve");
    assert_eq!(
        output["vite"]["vue"]["features"]["propsDestructure"],
        json!(false)
    );
}

#[tokio::test]
async fn optimize_deps_exclude_collects_string_transpile_entries() {
    let vite = resolve_vite(json!({
        "build": { "transpile": ["pkg-a", { "regex": true }, "pkg-b"] },
        "vite": { "optimizeDeps": { "exclude": ["user-dep"] } }
    }))
    .await;
    assert_eq!(
        vite["optimizeDeps"]["exclude"],
        json!(["user-dep", "pkg-a", "pkg-b", "vue-demi"])
    );
}

#[tokio::test]
async fn fs_allow_lists_each_directory_once() {
    let vite = resolve_vite(json!({
        "modulesDir": ["/shared/node_modules"],
        "vite": { "server": { "fs": { "allow": ["/shared/node_modules", "/extra"] } } }
    }))
    .await;
    assert_eq!(
        vite["server"]["fs"]["allow"],
        json!([
            "/project/.nuxt",
            "/project",
            "/project/node_modules",
            "/shared/node_modules",
            "/extra"
        ])
    );
}

#[tokio::test]
async fn vite_keys_without_base_contributor_fail_with_unknown_path() {
    let err = resolve_config(vite::schema(ViteOptions::new()), json!({}))
        .await
        .unwrap_err();
    assert!(err.path().is_some());
}

#[tokio::test]
async fn undeclared_user_keys_are_not_carried_into_the_output() {
    let vite = resolve_vite(json!({
        "vite": { "plugins": ["inspect"], "server": { "port": 4000 } }
    }))
    .await;
    assert!(vite.get("plugins").is_none());
    assert_eq!(
        vite["server"].as_object().map(|server| server.len()),
        Some(1)
    );
    assert!(vite["server"].get("fs").is_some());
}
