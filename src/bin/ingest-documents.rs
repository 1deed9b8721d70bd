//! CLI binary for ingest-documents.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the result.
//!
//! The exit status is 0 whether or not the conversion succeeded; the outcome
//! is reported on stdout and in the logs.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ingest_documents::{convert_pdf, ConversionConfig, MarkerCli};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one PDF, API key from the environment
  export GEMINI_API_KEY=AIza...
  ingest-documents --pdf_path report.pdf --output_dir /tmp/out
  # → /tmp/out/report_PdfConverter_output.md

  # Pass the key explicitly and pick a model
  ingest-documents --pdf_path paper.pdf --output_dir out \
      --api_key AIza... --model_name gemini-2.0-flash

  # Reconvert although the output already exists
  ingest-documents --pdf_path report.pdf --output_dir /tmp/out --overwrite

BEHAVIOUR:
  If <output_dir>/<stem>_PdfConverter_output.md already exists, no conversion
  is run and the existing path is reported. The exit status is always 0;
  failures are reported on stdout and in the logs.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      API key for the Gemini LLM service
  MARKER_MODEL_NAME   LLM model override
  MARKER_SINGLE_BIN   Path to the marker_single executable
  RUST_LOG            Log filter (overrides -v / -q)

SETUP:
  pip install marker-pdf   # provides marker_single
"#;

/// Convert a PDF to Markdown using the Marker converter.
#[derive(Parser, Debug)]
#[command(
    name = "ingest-documents",
    version,
    about = "Convert PDF to markdown using Marker library",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input PDF file.
    #[arg(long = "pdf_path")]
    pdf_path: PathBuf,

    /// Directory where the output markdown file will be saved.
    #[arg(long = "output_dir")]
    output_dir: PathBuf,

    /// API key for Gemini LLM service.
    #[arg(long = "api_key", env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// LLM model used by Marker's LLM processors.
    #[arg(long = "model_name", env = "MARKER_MODEL_NAME")]
    model_name: Option<String>,

    /// marker_single executable.
    #[arg(long = "marker_bin", env = "MARKER_SINGLE_BIN", default_value = "marker_single")]
    marker_bin: PathBuf,

    /// Reconvert even if the output file already exists.
    #[arg(long)]
    overwrite: bool,

    /// Disable the progress spinner.
    #[arg(long = "no_progress")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Drop INFO-level library logs while the spinner is on screen; errors
    // still come through.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    // The spinner exists before the subscriber so log lines can be printed
    // around it instead of being overdrawn by the next tick.
    let bar = show_progress.then(|| spinner(&cli.pdf_path));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(LogWriter { bar: bar.clone() })
        .init();

    let result = run(&cli).await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let output_path = match result {
        Ok(path) => path,
        Err(e) => {
            error!("{e:#}");
            None
        }
    };

    match output_path {
        Some(path) => println!("PDF successfully converted. Output file: {}", path.display()),
        None => println!("PDF conversion failed. Check logs for details."),
    }
}

async fn run(cli: &Cli) -> Result<Option<PathBuf>> {
    let config = build_config(cli)?;
    let converter = MarkerCli::new(&cli.marker_bin);
    Ok(convert_pdf(&converter, &cli.pdf_path, &cli.output_dir, &config).await)
}

/// Stderr writer that hides the spinner while a log line is printed.
#[derive(Clone)]
struct LogWriter {
    bar: Option<ProgressBar>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bar {
            Some(bar) => bar.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .gemini_api_key(cli.api_key.as_str())
        .overwrite(cli.overwrite);

    if let Some(ref model) = cli.model_name {
        builder = builder.model_name(model.as_str());
    }

    builder.build().context("Invalid configuration")
}

fn spinner(pdf_path: &Path) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(
        pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
