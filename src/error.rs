//! Error types for the ingest-documents library.
//!
//! Every failure of a conversion attempt is an [`IngestError`]. Callers that
//! only need to know *what kind* of failure happened (to pick a remediation
//! hint, say) use [`IngestError::kind`], which folds the variants into the
//! three recognised [`FailureKind`]s:
//!
//! * [`FailureKind::MissingDependency`] — the external converter (or one of
//!   its own packages) is not installed.
//! * [`FailureKind::ApiMismatch`] — the converter is installed but does not
//!   speak the interface we expect (unknown option, different output layout).
//! * [`FailureKind::Other`] — everything else: bad input, I/O, a converter
//!   crash, an empty result.
//!
//! All three are terminal for the attempt; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the ingest-documents library.
#[derive(Debug, Error)]
pub enum IngestError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The input path has no file name to derive the output name from.
    #[error("Invalid input '{path}': cannot derive an output file name")]
    InvalidInput { path: PathBuf },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter executable, or a package it imports, is not installed.
    #[error("Missing dependency '{component}': {detail}")]
    MissingDependency { component: String, detail: String },

    /// The converter rejected our invocation or produced an unexpected layout.
    #[error("Converter API mismatch: {detail}")]
    ApiMismatch { detail: String },

    /// The converter ran and exited unsuccessfully.
    #[error("Converter exited with {status}: {stderr}")]
    ConverterFailed { status: String, stderr: String },

    /// The converter finished but returned no Markdown.
    #[error("Converter produced no output for '{path}'")]
    EmptyOutput { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The three failure categories a conversion attempt is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The converter or one of its packages is not installed.
    MissingDependency,
    /// The installed converter does not match the expected interface.
    ApiMismatch,
    /// Any other failure.
    Other,
}

impl FailureKind {
    /// A one-line remediation hint logged alongside the error.
    pub fn hint(self) -> &'static str {
        match self {
            FailureKind::MissingDependency => {
                "Please ensure 'marker-pdf' and its dependencies are installed correctly \
                 and that marker_single is on PATH (or set MARKER_SINGLE_BIN)."
            }
            FailureKind::ApiMismatch => {
                "Double-check the options passed to marker_single against the installed \
                 Marker version (marker_single --help)."
            }
            FailureKind::Other => "Rerun with --verbose for the full converter output.",
        }
    }
}

impl IngestError {
    /// Classify this error into one of the three recognised failure kinds.
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::MissingDependency { .. } => FailureKind::MissingDependency,
            IngestError::ApiMismatch { .. } => FailureKind::ApiMismatch,
            _ => FailureKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dependency_kind_and_display() {
        let e = IngestError::MissingDependency {
            component: "marker_single".into(),
            detail: "not found on PATH".into(),
        };
        assert_eq!(e.kind(), FailureKind::MissingDependency);
        assert!(e.to_string().contains("marker_single"), "got: {e}");
    }

    #[test]
    fn api_mismatch_kind() {
        let e = IngestError::ApiMismatch {
            detail: "No such option: --use_llm".into(),
        };
        assert_eq!(e.kind(), FailureKind::ApiMismatch);
        assert!(e.to_string().contains("--use_llm"));
    }

    #[test]
    fn everything_else_is_other() {
        let errors = [
            IngestError::FileNotFound {
                path: "missing.pdf".into(),
            },
            IngestError::EmptyOutput {
                path: "report.pdf".into(),
            },
            IngestError::ConverterFailed {
                status: "exit status: 1".into(),
                stderr: "CUDA out of memory".into(),
            },
            IngestError::Internal("boom".into()),
        ];
        for e in errors {
            assert_eq!(e.kind(), FailureKind::Other, "{e}");
        }
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = IngestError::OutputWriteFailed {
            path: "/tmp/out/report_PdfConverter_output.md".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("disk full"));
    }

    #[test]
    fn hints_differ_per_kind() {
        assert!(FailureKind::MissingDependency.hint().contains("marker-pdf"));
        assert!(FailureKind::ApiMismatch.hint().contains("--help"));
        assert_ne!(FailureKind::Other.hint(), FailureKind::ApiMismatch.hint());
    }
}
