//! Command-line front end for component resolution.
//!
//! Resolves component names to files, lists an environment's components
//! (optionally grouped by namespace), prints summaries, and edits component
//! parameters. The application root comes from `--app`, `KSRESOLVE_APP_ROOT`,
//! or the nearest ancestor of the working directory that holds `app.yaml`.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ksresolve::{App, OsFs, ParamOptions, extract_component, find_app_root};
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ks-component", version, about = "Resolve and inspect application components")]
struct Cli {
    /// Application root (defaults to discovery from the working directory).
    #[arg(long, global = true)]
    app: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the backing file of a component.
    Path { name: String },
    /// List component files for an environment.
    List {
        #[arg(long, default_value = "default")]
        env: String,
        /// Group paths under their namespace.
        #[arg(long)]
        by_namespace: bool,
    },
    /// Print the summaries of a component as JSON.
    Show { name: String },
    /// Print a component's parameters.
    Params {
        name: String,
        /// Overlay this environment's overrides.
        #[arg(long, default_value = "")]
        env: String,
    },
    /// Set a parameter. The value is parsed as JSON, falling back to a string.
    Set {
        name: String,
        key: String,
        value: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Remove a parameter.
    Unset {
        name: String,
        key: String,
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ks-component: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = match cli.app {
        Some(root) => root,
        None => find_app_root(&env::current_dir().context("read working directory")?)?,
    };
    let app = App::load(Arc::new(OsFs), &root)
        .with_context(|| format!("load application at {}", root.display()))?;

    match cli.command {
        Command::Path { name } => {
            let path = ksresolve::path(&app, &name)?;
            println!("{}", path.display());
        }
        Command::List { env, by_namespace } => {
            if by_namespace {
                for (ns, paths) in ksresolve::make_paths_by_namespace(&app, &env)? {
                    println!("{ns}");
                    for path in paths {
                        println!("  {}", path.display());
                    }
                }
            } else {
                for path in ksresolve::make_paths(&app, &env)? {
                    println!("{}", path.display());
                }
            }
        }
        Command::Show { name } => {
            let component = extract_component(&app, &name)?;
            let summaries = component.summarize()?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Command::Params { name, env } => {
            let component = extract_component(&app, &name)?;
            for param in component.params(&env)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    param.component, param.index, param.key, param.value
                );
            }
        }
        Command::Set {
            name,
            key,
            value,
            index,
        } => {
            let component = extract_component(&app, &name)?;
            let path = split_key(&key)?;
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            component.set_param(&path, value, ParamOptions { index })?;
        }
        Command::Unset { name, key, index } => {
            let component = extract_component(&app, &name)?;
            let path = split_key(&key)?;
            component.delete_param(&path, ParamOptions { index })?;
        }
    }
    Ok(())
}

/// Split a dotted parameter key (`image.tag`) into path segments.
fn split_key(key: &str) -> Result<Vec<String>> {
    let segments: Vec<String> = key.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        bail!("invalid parameter key {key:?}");
    }
    Ok(segments)
}
