//! # ingest-documents
//!
//! Convert a PDF document to Markdown with the [Marker] converter.
//!
//! Layout analysis, OCR, LLM-assisted cleanup and rendering all happen inside
//! Marker. This crate decides *where* the Markdown goes, skips documents that
//! were already converted, runs Marker once, and writes the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Name    <stem>_PdfConverter_output.md under the output dir
//!  ├─ 2. Skip    output already present → return it, no conversion
//!  ├─ 3. Check   output dir created, input is a readable %PDF
//!  ├─ 4. Marker  marker_single with markdown / en / no images / LLM on
//!  └─ 5. Write   Markdown persisted atomically, path returned
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ingest_documents::{convert_pdf, ConversionConfig, MarkerCli};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .gemini_api_key(std::env::var("GEMINI_API_KEY").unwrap_or_default())
//!         .build()?;
//!     match convert_pdf(&MarkerCli::from_env(), "report.pdf", "/tmp/out", &config).await {
//!         Some(path) => println!("wrote {}", path.display()),
//!         None => eprintln!("conversion failed, see logs"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ingest-documents` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! [Marker]: https://github.com/VikParuchuri/marker

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_pdf, convert_pdf_blocking, try_convert_pdf};
pub use error::{FailureKind, IngestError};
pub use output::RenderedDocument;
pub use pipeline::marker::MarkerCli;
pub use pipeline::write::output_path_for;
pub use pipeline::DocumentConverter;
