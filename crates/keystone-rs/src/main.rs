use anyhow::{Context, Result, bail};
use clap::Parser;
use keystone_rs::config::UserConfigLayer;
use keystone_rs::core::ResolveOptions;
use keystone_rs::presets::{ProjectOptions, ViteOptions, project, vite};
use keystone_rs::{Keystone, init_logging, parse_assignments};
use std::path::PathBuf;

/// Resolve a project's build configuration and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "keystone", version, about)]
struct Cli {
    /// Project directory; defaults to the current directory.
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// User config file (JSON5). Repeat to layer; later files win.
    #[arg(short, long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,
    /// Override a single value, e.g. `--set vite.mode=staging`.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    assignments: Vec<String>,
    /// Resolve as if running under a test runner.
    #[arg(long)]
    test: bool,
    /// Print only the subtree at this path.
    #[arg(long, value_name = "PATH")]
    get: Option<String>,
    /// Print the order paths finished resolving to stderr.
    #[arg(long)]
    trace: bool,
    /// Print compact JSON.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(cwd) => std::path::absolute(&cwd)
            .with_context(|| format!("failed to resolve --cwd {}", cwd.display()))?,
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let mut keystone = Keystone::new()
        .with_schema(project::schema(ProjectOptions::new(&cwd)))
        .with_schema(vite::schema(ViteOptions::new().with_test(cli.test)))
        .with_options(ResolveOptions::new().with_trace_order(cli.trace));
    for (idx, path) in cli.configs.iter().enumerate() {
        keystone = keystone.with_layer(UserConfigLayer::file(format!("config#{idx}"), path));
    }
    if !cli.assignments.is_empty() {
        keystone = keystone.with_layer(UserConfigLayer::value(
            "cli",
            parse_assignments(&cli.assignments)?,
        ));
    }

    let resolved = keystone.resolve().await?;
    if cli.trace {
        for path in &resolved.order {
            eprintln!("{path}");
        }
    }

    let output = match cli.get.as_deref() {
        Some(path) => match resolved.get(path) {
            Some(value) => value,
            None => bail!("no value at {path}"),
        },
        None => &resolved.value,
    };
    let rendered = if cli.compact {
        serde_json::to_string(output)?
    } else {
        serde_json::to_string_pretty(output)?
    };
    println!("{rendered}");
    Ok(())
}
