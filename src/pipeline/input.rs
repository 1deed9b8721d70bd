//! Input validation: make sure the path names a readable PDF before the
//! converter is started.
//!
//! Marker takes minutes to load its models; rejecting a typo'd path or a
//! stray `.docx` here gives the user a clear error in milliseconds.

use crate::error::IngestError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Validate a local file path: it must exist, be readable, and start with
/// the PDF magic bytes.
pub fn validate_pdf(path: &Path) -> Result<(), IngestError> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(f) => {
            // Files shorter than the magic are reported zero-padded.
            let mut head = Vec::with_capacity(4);
            f.take(4)
                .read_to_end(&mut head)
                .map_err(|e| unreadable(path, e))?;
            let mut magic = [0u8; 4];
            magic[..head.len()].copy_from_slice(&head);
            if head.len() < 4 || &magic != b"%PDF" {
                return Err(IngestError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) => return Err(unreadable(path, e)),
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

fn unreadable(path: &Path, e: std::io::Error) -> IngestError {
    let path = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => IngestError::PermissionDenied { path },
        _ => IngestError::FileNotFound { path },
    }
}
