//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one step around the external
//! converter call.
//!
//! ## Data Flow
//!
//! ```text
//! write::output_path_for ──▶ input ──▶ DocumentConverter ──▶ write::write_markdown
//!   (skip if present)       (%PDF)       (marker_single)       (temp + rename)
//! ```
//!
//! 1. [`write`]  — derive `<stem>_PdfConverter_output.md`, persist atomically
//! 2. [`input`]  — check the PDF exists, is readable and starts with `%PDF`
//! 3. [`marker`] — run Marker and collect its Markdown; the only stage that
//!    leaves the process

pub mod input;
pub mod marker;
pub mod write;

use crate::config::ConversionConfig;
use crate::error::IngestError;
use crate::output::RenderedDocument;
use std::future::Future;
use std::path::Path;

/// An external document converter.
///
/// `Ok(None)` means the converter ran to completion but produced nothing;
/// the caller reports that as a failure without writing any file.
pub trait DocumentConverter: Send + Sync {
    /// Convert the PDF at `pdf_path` using the options in `config`.
    fn convert(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> impl Future<Output = Result<Option<RenderedDocument>, IngestError>> + Send;
}
