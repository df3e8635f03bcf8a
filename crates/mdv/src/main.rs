//! MDV CLI - Markdown viewer.
//!
//! Renders a markdown document to a complete HTML page: frontmatter panel,
//! rendered body, highlighted code, and diagrams drawn through a Kroki
//! server. Output goes to stdout or a file.

mod error;
mod output;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdv_config::{CliSettings, Config};
use mdv_view::{Pipeline, PipelineConfig};

use error::CliError;
use output::Output;

/// MDV - Markdown viewer.
#[derive(Parser)]
#[command(name = "mdv", version, about)]
struct Cli {
    /// Markdown file to render (.md or .markdown).
    input: PathBuf,

    /// Write the rendered HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to an mdv.toml config file (default: search parent directories).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram rendering.
    #[arg(long)]
    kroki_url: Option<String>,

    /// Skip enrichment: emit the base document with escaped code blocks.
    #[arg(long)]
    no_enrich: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let out = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            out.error(&format!("Failed to create tokio runtime: {err}"));
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = rt.block_on(run(cli, &out)) {
        out.error(&format!("Error: {err}"));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, out: &Output) -> Result<(), CliError> {
    let settings = CliSettings {
        kroki_url: cli.kroki_url,
    };
    let config = Config::load(cli.config.as_deref(), Some(&settings))?;

    let mut pipeline_config = PipelineConfig::default();
    if let Some(url) = config.diagrams.kroki_url {
        pipeline_config.kroki_url = url;
    }

    let pipeline = Pipeline::new(pipeline_config);
    let Some(view) = pipeline.render_file(&cli.input)? else {
        out.info("Nothing to render: document is empty.");
        return Ok(());
    };

    if !cli.no_enrich && view.needs_enrichment() {
        view.enrich().await;
    }

    let html = view.html();
    match cli.output {
        Some(path) => {
            std::fs::write(&path, html)?;
            out.success(&format!("Wrote {}", path.display()));
        }
        None => {
            std::io::stdout().write_all(html.as_bytes())?;
        }
    }
    Ok(())
}
