//! The conversion invoker.
//!
//! [`try_convert_pdf`] is the fallible core; [`convert_pdf`] is the error
//! boundary around it: every failure is logged with a hint for its
//! [`FailureKind`](crate::error::FailureKind) and turned into `None`, so a
//! caller converting many files can move on to the next one.

use crate::config::ConversionConfig;
use crate::error::IngestError;
use crate::pipeline::{input, write, DocumentConverter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Convert `pdf_path` to Markdown under `output_dir`, returning the output path.
///
/// If `<output_dir>/<stem>_PdfConverter_output.md` already exists (and
/// `config.overwrite` is off) the converter is not called and the existing
/// path is returned.
///
/// # Errors
/// - [`IngestError::OutputDirFailed`] if the output directory cannot be created
/// - input errors (`FileNotFound`, `NotAPdf`, …) from validation
/// - whatever the converter reports
/// - [`IngestError::EmptyOutput`] if the converter produced nothing; no file
///   is written in that case
pub async fn try_convert_pdf<C: DocumentConverter>(
    converter: &C,
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, IngestError> {
    let pdf_path = pdf_path.as_ref();
    let output_dir = output_dir.as_ref();
    let output_path = write::output_path_for(pdf_path, output_dir)?;

    if output_path.exists() {
        if config.overwrite {
            info!("Overwriting existing output: {}", output_path.display());
        } else {
            info!("Output file already exists: {}", output_path.display());
            return Ok(output_path);
        }
    }

    write::ensure_dir(output_dir).await?;
    input::validate_pdf(pdf_path)?;

    if config.use_llm && config.gemini_api_key.is_none() {
        warn!("LLM post-processing is enabled but no API key was supplied");
    }
    info!("Converter configuration: {}", config.redacted_mapping());

    let start = Instant::now();
    info!("Converting PDF: {}", pdf_path.display());
    let rendered = converter.convert(pdf_path, config).await?;

    let document = match rendered {
        Some(doc) if !doc.markdown.is_empty() => doc,
        _ => {
            return Err(IngestError::EmptyOutput {
                path: pdf_path.to_path_buf(),
            })
        }
    };
    if let Some(pages) = document.page_count() {
        info!("Converter reported {} pages", pages);
    }

    write::write_markdown(&output_path, &document.markdown).await?;
    info!(
        "Successfully converted {} in {}ms. Output saved to: {}",
        pdf_path.display(),
        start.elapsed().as_millis(),
        output_path.display()
    );
    Ok(output_path)
}

/// Convert a PDF, logging any failure and returning `None` instead of an error.
pub async fn convert_pdf<C: DocumentConverter>(
    converter: &C,
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Option<PathBuf> {
    let pdf_path = pdf_path.as_ref();
    match try_convert_pdf(converter, pdf_path, output_dir, config).await {
        Ok(path) => Some(path),
        Err(e) => {
            report_failure(pdf_path, &e);
            None
        }
    }
}

/// Synchronous wrapper around [`convert_pdf`].
///
/// Creates a current-thread tokio runtime internally; must not be called
/// from inside another runtime.
pub fn convert_pdf_blocking<C: DocumentConverter>(
    converter: &C,
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Option<PathBuf> {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            report_failure(
                pdf_path.as_ref(),
                &IngestError::Internal(format!("Failed to create tokio runtime: {e}")),
            );
            return None;
        }
    };
    runtime.block_on(convert_pdf(converter, pdf_path, output_dir, config))
}

fn report_failure(pdf_path: &Path, e: &IngestError) {
    let kind = e.kind();
    error!(
        "Conversion of {} failed ({:?}): {}",
        pdf_path.display(),
        kind,
        e
    );
    error!("{}", kind.hint());
}
