//! Full-pass resolution tests.

use keystone_rs_core::{
    Group, Leaf, ResolveError, ResolveOptions, Resolver, Schema, resolve_config,
    resolve_config_with,
};
use keystone_rs_test_utils::{
    CountingResolver, DelayedResolver, EventLog, FailingResolver, RecordingResolver,
    arithmetic_schema,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Defaults feed dependent resolvers.
#[tokio::test]
async fn dependent_leaf_reads_default() {
    let output = resolve_config(arithmetic_schema(), json!({}))
        .await
        .expect("resolve");
    assert_eq!(output, json!({ "a": 1, "b": 2 }));
}

/// User overrides feed dependent resolvers.
#[tokio::test]
async fn dependent_leaf_reads_user_override() {
    let output = resolve_config(arithmetic_schema(), json!({ "a": 5 }))
        .await
        .expect("resolve");
    assert_eq!(output, json!({ "a": 5, "b": 6 }));
}

/// A `null` user value falls back to the static default.
#[tokio::test]
async fn null_user_value_uses_default() {
    let output = resolve_config(arithmetic_schema(), json!({ "a": null }))
        .await
        .expect("resolve");
    assert_eq!(output, json!({ "a": 1, "b": 2 }));
}

/// Resolvers merge with their own default explicitly; the engine does not.
#[tokio::test]
async fn resolver_appends_to_static_default() {
    let schema = Schema::new(
        Group::new().with("flavor", Leaf::from_default("y")).with(
            "extensions",
            Leaf::from_default(json!(["x"])).with_fn(|value, get| async move {
                let mut list = match value.or_else(|| get.own_default().cloned()) {
                    Some(Value::Array(list)) => list,
                    _ => Vec::new(),
                };
                list.push(get.get("flavor").await?);
                Ok(Value::Array(list))
            }),
        ),
    );
    let output = resolve_config(schema, json!({})).await.expect("resolve");
    assert_eq!(output, json!({ "flavor": "y", "extensions": ["x", "y"] }));
}

/// A resolver's return value is final, even when it is `null`.
#[tokio::test]
async fn resolver_result_is_not_replaced_by_default() {
    let schema = Schema::new(Group::new().with(
        "publicDir",
        Leaf::from_default("public").with_fn(|_, _| async { Ok(Value::Null) }),
    ));
    let output = resolve_config(schema, json!({ "publicDir": "static" }))
        .await
        .expect("resolve");
    assert_eq!(output, json!({ "publicDir": null }));
}

/// Output mirrors the schema shape, including empty groups.
#[tokio::test]
async fn output_mirrors_schema_shape() {
    let schema = Schema::new(
        Group::new()
            .with(
                "esbuild",
                Group::new()
                    .with("jsxFactory", Leaf::from_default("h"))
                    .with("jsxFragment", Leaf::from_default("Fragment")),
            )
            .with("empty", Group::new())
            .with("untouched", Leaf::new()),
    );
    let output = resolve_config(schema, json!({ "esbuild": { "jsxFactory": "React" }, "extra": 1 }))
        .await
        .expect("resolve");
    assert_eq!(
        output,
        json!({
            "esbuild": { "jsxFactory": "React", "jsxFragment": "Fragment" },
            "empty": {},
            "untouched": null
        })
    );
}

/// Every leaf resolves exactly once, however many readers it has.
#[tokio::test]
async fn shared_dependency_resolves_once() {
    let shared = CountingResolver::fixed(json!("/project"));
    let mut group = Group::new().with("rootDir", Leaf::from_resolver(shared.clone()));
    let mut readers = Vec::new();
    for idx in 0..8 {
        let reader = CountingResolver::from_fn(|_, get| async move {
            Ok(get.get("rootDir").await?)
        });
        group.insert(format!("reader{idx}"), Leaf::from_resolver(reader.clone()));
        readers.push(reader);
    }

    let output = resolve_config(Schema::new(group), json!({}))
        .await
        .expect("resolve");
    assert_eq!(output["reader7"], json!("/project"));
    assert_eq!(shared.calls(), 1);
    assert!(readers.iter().all(|reader| reader.calls() == 1));
}

/// A dependency finishes strictly before its dependent returns.
#[tokio::test]
async fn dependency_completes_before_dependent_returns() {
    let log = EventLog::new();
    let schema = Schema::new(
        Group::new()
            .with(
                "a",
                Leaf::from_resolver(RecordingResolver::new(
                    "a",
                    Resolver::from_fn(|_, get| async move { Ok(get.get("b").await?) }),
                    log.clone(),
                )),
            )
            .with(
                "b",
                Leaf::from_resolver(RecordingResolver::new(
                    "b",
                    Resolver::new(DelayedResolver::new(
                        Duration::from_millis(5),
                        Resolver::from_fn(|_, _| async { Ok(json!("b")) }),
                    )),
                    log.clone(),
                )),
            ),
    );

    let resolution = resolve_config_with(
        schema,
        json!({}),
        ResolveOptions::new().with_trace_order(true),
    )
    .await
    .expect("resolve");

    assert_eq!(resolution.value, json!({ "a": "b", "b": "b" }));
    assert_eq!(resolution.order, vec!["b".to_string(), "a".to_string()]);
    let end_b = log.position("end:b").expect("b finished");
    let end_a = log.position("end:a").expect("a finished");
    assert!(end_b < end_a);
}

/// Completion order is only reported when requested.
#[tokio::test]
async fn order_is_empty_without_tracing() {
    let resolution = resolve_config_with(arithmetic_schema(), json!({}), ResolveOptions::new())
        .await
        .expect("resolve");
    assert!(resolution.order.is_empty());
}

/// Two independent passes over the same input agree.
#[tokio::test]
async fn passes_are_independent_and_repeatable() {
    let counter = CountingResolver::fixed(json!(1));
    let schema = Arc::new(Schema::new(
        Group::new().with("a", Leaf::from_resolver(counter.clone())),
    ));

    let first = resolve_config(schema.clone(), json!({ "a": 3 }))
        .await
        .expect("first");
    let second = resolve_config(schema, json!({ "a": 3 }))
        .await
        .expect("second");
    assert_eq!(first, second);
    assert_eq!(counter.calls(), 2);
}

/// Unknown paths are reported, not read as `null`.
#[tokio::test]
async fn unknown_path_fails_the_pass() {
    let schema = Schema::new(Group::new().with(
        "root",
        Leaf::from_fn(|_, get| async move { Ok(get.get("srcDri").await?) }),
    ));
    let err = resolve_config(schema, json!({})).await.unwrap_err();
    assert!(matches!(err, ResolveError::UnknownPath { ref path } if path == "srcDri"));
}

/// Malformed paths are rejected before lookup.
#[tokio::test]
async fn malformed_path_fails_the_pass() {
    let schema = Schema::new(Group::new().with(
        "root",
        Leaf::from_fn(|_, get| async move { Ok(get.get("a..b").await?) }),
    ));
    let err = resolve_config(schema, json!({})).await.unwrap_err();
    assert!(matches!(err, ResolveError::InvalidPath { .. }));
}

/// Resolver failures propagate through dependents with the failing path.
#[tokio::test]
async fn resolver_failure_propagates_to_dependents() {
    let schema = Schema::new(
        Group::new()
            .with("a", Leaf::from_resolver(FailingResolver::new("no network")))
            .with(
                "b",
                Leaf::from_fn(|_, get| async move { Ok(get.get("a").await?) }),
            ),
    );
    let err = resolve_config(schema, json!({})).await.unwrap_err();
    match err {
        ResolveError::Resolver { path, source } => {
            assert_eq!(path, "a");
            assert_eq!(source.to_string(), "no network");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Groups can be read as a whole and values can be indexed through leaves.
#[tokio::test]
async fn get_reads_groups_and_leaf_interiors() {
    let schema = Schema::new(
        Group::new()
            .with(
                "vue",
                Group::new()
                    .with(
                        "compilerOptions",
                        Leaf::from_default(json!({ "hoistStatic": true })),
                    )
                    .with("propsDestructure", Leaf::from_default(false)),
            )
            .with(
                "snapshot",
                Leaf::from_fn(|_, get| async move { Ok(get.get("vue").await?) }),
            )
            .with(
                "hoist",
                Leaf::from_fn(|_, get| async move {
                    Ok(get.get("vue.compilerOptions.hoistStatic").await?)
                }),
            )
            .with(
                "missing",
                Leaf::from_fn(|_, get| async move {
                    Ok(get.get("vue.compilerOptions.isCustomElement").await?)
                }),
            ),
    );
    let output = resolve_config(schema, json!({ "vue": { "propsDestructure": true } }))
        .await
        .expect("resolve");
    assert_eq!(
        output["snapshot"],
        json!({ "compilerOptions": { "hoistStatic": true }, "propsDestructure": true })
    );
    assert_eq!(output["hoist"], json!(true));
    assert_eq!(output["missing"], Value::Null);
}

/// `get_all` resolves several paths at once and keeps input order.
#[tokio::test]
async fn get_all_keeps_input_order() {
    let schema = Schema::new(
        Group::new()
            .with("x", Leaf::from_default(1))
            .with("y", Leaf::from_default(2))
            .with(
                "both",
                Leaf::from_fn(|_, get| async move {
                    Ok(Value::Array(get.get_all(["y", "x"]).await?))
                }),
            ),
    );
    let output = resolve_config(schema, json!({})).await.expect("resolve");
    assert_eq!(output["both"], json!([2, 1]));
}
