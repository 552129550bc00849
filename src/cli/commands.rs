use crate::api::{Api, RouteDecl};
use crate::error::SchemaError;
use crate::handler::{handler, Call};
use crate::hello::hello_api;
use crate::render::dumps;
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for docroute
#[derive(Parser)]
#[command(name = "docroute", version)]
#[command(about = "Serve and check doc-declared JSON APIs", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the built-in demo API
    Serve {
        /// Address to bind, overrides DOCROUTE_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Parse a doc block and compile its schemas
    ///
    /// Prints the parsed declaration as JSON. Exits with an error when the doc
    /// block is malformed, names an unknown directive, or a schema does not compile.
    Check {
        /// File holding the doc block
        file: PathBuf,

        /// What the file declares
        #[arg(long, value_enum, default_value_t = DocKind::Directive)]
        kind: DocKind,

        /// API doc providing shared schemas for a directive doc
        #[arg(long)]
        shared: Option<PathBuf>,
    },
}

/// Kind of doc block checked by `docroute check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocKind {
    /// API doc: description plus `@name:` shared schemas
    Shared,
    /// Route doc: description plus `$name:` directives
    Directive,
}

/// Parse and compile a doc block the way the API would at startup.
///
/// # Errors
///
/// The [`SchemaError`] the API would have failed with.
pub fn check_doc(text: &str, kind: DocKind, shared_doc: Option<&str>) -> Result<Value, SchemaError> {
    match kind {
        DocKind::Shared => {
            let api = Api::builder().doc(text).build()?;
            Ok(json!({"desc": api.desc(), "shared": api.shared()}))
        }
        DocKind::Directive => {
            let mut builder = Api::builder();
            if let Some(doc) = shared_doc {
                builder = builder.doc(doc);
            }
            let mut api = builder.build()?;
            let decl = RouteDecl::new(text);
            let (desc, directives) = decl.parse()?;
            api.register("check", "doc", decl, handler(|_call: Call| Ok(Value::Null)))?;
            Ok(json!({"desc": desc, "directives": directives}))
        }
    }
}

/// [`check_doc`] over files.
pub fn check_file(file: &Path, kind: DocKind, shared: Option<&Path>) -> Result<Value> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let shared_doc = shared
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        })
        .transpose()?;
    let checked = check_doc(&text, kind, shared_doc.as_deref())
        .with_context(|| format!("{} is not a valid {kind:?} doc", file.display()))?;
    Ok(checked)
}

fn serve(addr: Option<String>) -> Result<()> {
    let mut config = RuntimeConfig::from_env();
    if let Some(addr) = addr {
        config.addr = addr;
    }
    config.apply();

    let api = hello_api().context("demo API failed to build")?;
    let handle = HttpServer(api.into_service())
        .start(config.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(
        addr = %handle.addr(),
        stack_size = config.stack_size,
        "Server started"
    );
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}

/// Execute a parsed command line.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { addr } => serve(addr),
        Commands::Check { file, kind, shared } => {
            let checked = check_file(&file, kind, shared.as_deref())?;
            println!("{}", dumps(&checked));
            Ok(())
        }
    }
}
