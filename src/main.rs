// Command-line entry point for tcg.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ts_callgraph::application::AnalyzeUsecase;
use ts_callgraph::infrastructure::concurrency::init_thread_pool;
use ts_callgraph::infrastructure::logging::init_tracing;
use ts_callgraph::infrastructure::{OutputFormat, ProjectLoader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source files to analyze
    files: Vec<PathBuf>,

    /// Glob pattern selecting source files (can specify multiple)
    #[arg(short, long = "glob", env = "SRC_PATHS")]
    globs: Vec<String>,

    /// Project tsconfig.json
    #[arg(short, long, env = "TS_CONFIG_PATH")]
    tsconfig: PathBuf,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Worker threads for reading and parsing (defaults to all cores)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let sources = ProjectLoader::discover(&cli.files, &cli.globs)?;
    if sources.is_empty() {
        Cli::command().print_help()?;
        eprintln!();
        eprintln!("No TypeScript or JavaScript source files given.");
        std::process::exit(2);
    }

    init_thread_pool(cli.jobs).context("Failed to initialize worker pool")?;

    let exporter = cli.format.exporter();
    let usecase = AnalyzeUsecase {
        exporter: exporter.as_ref(),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let graph = usecase.run(sources.as_slice(), &cli.tsconfig, &mut out)?;
    out.flush()?;

    if let Some(path) = &cli.output {
        tracing::info!(
            path = %path.display(),
            format = ?cli.format,
            modules = graph.len(),
            "call graph written"
        );
    }
    Ok(())
}
