//! Output naming and persistence.
//!
//! The output name is a pure function of the input name, which is what makes
//! the "already converted" check possible: `report.pdf` always lands in
//! `<output_dir>/report_PdfConverter_output.md`.

use crate::error::IngestError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the input stem to name the Markdown output.
pub const OUTPUT_SUFFIX: &str = "_PdfConverter_output.md";

/// Compute the deterministic output path for `pdf_path` under `output_dir`.
///
/// The stem is the file name minus its last extension, so `a.b.pdf` becomes
/// `a.b_PdfConverter_output.md`.
pub fn output_path_for(pdf_path: &Path, output_dir: &Path) -> Result<PathBuf, IngestError> {
    let stem = pdf_path
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IngestError::InvalidInput {
            path: pdf_path.to_path_buf(),
        })?;

    let mut name = stem.to_os_string();
    name.push(OUTPUT_SUFFIX);
    Ok(output_dir.join(name))
}

/// Create `dir` (and any missing parents).
pub async fn ensure_dir(dir: &Path) -> Result<(), IngestError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| IngestError::OutputDirFailed {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Write `markdown` to `path` as UTF-8.
///
/// Uses atomic write (temp file + rename) so a crash mid-write never leaves
/// a partial file that a later run would mistake for finished output.
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<(), IngestError> {
    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(|e| IngestError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(IngestError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    debug!("Wrote {} bytes to {}", markdown.len(), path.display());
    Ok(())
}
