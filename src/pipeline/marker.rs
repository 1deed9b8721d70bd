//! The Marker converter, driven through its `marker_single` command.
//!
//! Marker is a Python package; its CLI is the stable surface we can call
//! from Rust. One invocation looks like:
//!
//! ```text
//! marker_single report.pdf --output_dir <scratch>/out \
//!     --output_format markdown --disable_image_extraction \
//!     --use_llm --llm_service marker.services.gemini.GoogleGeminiService \
//!     --config_json <scratch>/config.json
//! ```
//!
//! and leaves `<scratch>/out/report/report.md` (plus `report_meta.json`)
//! behind. The scratch directory is a [`TempDir`], so nothing Marker writes
//! outlives the call; the caller decides where the Markdown goes.
//!
//! The API key is only ever written to the config JSON inside the scratch
//! directory, never onto the command line.

use crate::config::ConversionConfig;
use crate::error::IngestError;
use crate::output::RenderedDocument;
use crate::pipeline::DocumentConverter;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Executable looked up on `PATH` when no other is configured.
pub const DEFAULT_PROGRAM: &str = "marker_single";

/// Environment variable naming an alternative Marker executable.
pub const PROGRAM_ENV: &str = "MARKER_SINGLE_BIN";

/// Lines of converter stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Runs Marker's `marker_single` as a child process.
#[derive(Debug, Clone)]
pub struct MarkerCli {
    program: PathBuf,
}

impl Default for MarkerCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl MarkerCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `$MARKER_SINGLE_BIN` if set and non-empty, else `marker_single`.
    pub fn from_env() -> Self {
        match std::env::var(PROGRAM_ENV) {
            Ok(p) if !p.trim().is_empty() => Self::new(p),
            _ => Self::default(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(
        &self,
        pdf_path: &Path,
        out_dir: &Path,
        config_json: &Path,
        config: &ConversionConfig,
    ) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(pdf_path)
            .arg("--output_dir")
            .arg(out_dir)
            .args(config.marker_flags())
            .arg("--config_json")
            .arg(config_json)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl DocumentConverter for MarkerCli {
    async fn convert(
        &self,
        pdf_path: &Path,
        config: &ConversionConfig,
    ) -> Result<Option<RenderedDocument>, IngestError> {
        let stem = pdf_path
            .file_stem()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IngestError::InvalidInput {
                path: pdf_path.to_path_buf(),
            })?;

        let scratch = TempDir::new()
            .map_err(|e| IngestError::Internal(format!("Failed to create scratch dir: {e}")))?;
        let config_path = scratch.path().join("config.json");
        let out_dir = scratch.path().join("out");

        let json = serde_json::to_vec_pretty(&config.marker_config_json())
            .map_err(|e| IngestError::Internal(format!("Failed to serialise config: {e}")))?;
        tokio::fs::write(&config_path, json)
            .await
            .map_err(|e| IngestError::Internal(format!("Failed to write config JSON: {e}")))?;

        let mut cmd = self.command(pdf_path, &out_dir, &config_path, config);
        info!(
            "Running {} on {}",
            self.program.display(),
            pdf_path.display()
        );
        debug!("Command: {:?}", cmd.as_std());

        let output = cmd
            .output()
            .await
            .map_err(|e| spawn_error(&self.program, e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            debug!("{} stderr:\n{}", self.program.display(), stderr);
            return Err(classify_failure(&output.status.to_string(), &stderr));
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr:\n{}", self.program.display(), stderr);
        }

        let doc_dir = out_dir.join(stem);
        let md_path = doc_dir.join(with_suffix(stem, ".md"));
        let markdown = match tokio::fs::read(&md_path).await {
            Ok(bytes) => String::from_utf8(bytes).map_err(|e| {
                IngestError::Internal(format!("Converter wrote non-UTF-8 Markdown: {e}"))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IngestError::ApiMismatch {
                    detail: format!(
                        "{} exited successfully but did not write {}",
                        self.program.display(),
                        Path::new(stem).join(with_suffix(stem, ".md")).display()
                    ),
                });
            }
            Err(e) => {
                return Err(IngestError::Internal(format!(
                    "Failed to read converter output {}: {e}",
                    md_path.display()
                )));
            }
        };

        if markdown.is_empty() {
            warn!("{} produced an empty document", self.program.display());
            return Ok(None);
        }

        let metadata = read_metadata(&doc_dir.join(with_suffix(stem, "_meta.json"))).await;
        Ok(Some(RenderedDocument { markdown, metadata }))
    }
}

fn with_suffix(stem: &std::ffi::OsStr, suffix: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(suffix);
    name
}

/// Parse Marker's metadata file. Absent or unreadable metadata is not an error.
async fn read_metadata(path: &Path) -> Option<serde_json::Value> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable metadata {}: {}", path.display(), e);
            None
        }
    }
}

fn spawn_error(program: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::MissingDependency {
            component: program.display().to_string(),
            detail: "executable not found. Install it with: pip install marker-pdf".into(),
        }
    } else {
        IngestError::Internal(format!("Failed to start {}: {e}", program.display()))
    }
}

static RE_MISSING_MODULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"No module named '([^']+)'").unwrap());

static RE_NO_SUCH_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"No such option:\s*(\S+)").unwrap());

/// Map a failed run's stderr onto the three failure kinds.
pub(crate) fn classify_failure(status: &str, stderr: &str) -> IngestError {
    if stderr.contains("ModuleNotFoundError") || stderr.contains("ImportError") {
        let component = RE_MISSING_MODULE
            .captures(stderr)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "marker-pdf".to_string());
        return IngestError::MissingDependency {
            component,
            detail: last_line(stderr),
        };
    }

    if let Some(caps) = RE_NO_SUCH_OPTION.captures(stderr) {
        let option = caps[1].trim_end_matches(['.', ',']);
        return IngestError::ApiMismatch {
            detail: format!("converter does not accept option {option}"),
        };
    }

    if stderr.contains("AttributeError") || stderr.contains("unexpected keyword argument") {
        return IngestError::ApiMismatch {
            detail: last_line(stderr),
        };
    }

    IngestError::ConverterFailed {
        status: status.to_string(),
        stderr: tail(stderr, STDERR_TAIL_LINES),
    }
}

fn last_line(s: &str) -> String {
    s.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}

fn tail(s: &str, n: usize) -> String {
    let lines: Vec<&str> = s.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn command_line_layout() {
        let marker = MarkerCli::new("/opt/marker/bin/marker_single");
        let config = ConversionConfig::builder()
            .gemini_api_key("secret-key")
            .build()
            .unwrap();
        let cmd = marker.command(
            Path::new("in/report.pdf"),
            Path::new("/scratch/out"),
            Path::new("/scratch/config.json"),
            &config,
        );
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "/opt/marker/bin/marker_single");

        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "in/report.pdf");
        assert_eq!(&args[1..3], ["--output_dir", "/scratch/out"]);
        let lang = args.iter().position(|a| a == "--languages").unwrap();
        assert_eq!(args[lang + 1], "en");
        assert!(args.contains(&"--use_llm".to_string()));
        assert!(args.contains(&"--disable_image_extraction".to_string()));
        assert_eq!(
            &args[args.len() - 2..],
            ["--config_json", "/scratch/config.json"]
        );
        assert!(
            !args.iter().any(|a| a.contains("secret-key")),
            "API key must not appear on the command line"
        );
    }

    #[test]
    fn missing_module_is_missing_dependency() {
        let stderr = "Traceback (most recent call last):\n  File \"/usr/bin/marker_single\", line 5, in <module>\n    from marker.scripts.convert_single import convert_single_cli\nModuleNotFoundError: No module named 'marker'\n";
        let err = classify_failure("exit status: 1", stderr);
        assert_eq!(err.kind(), FailureKind::MissingDependency);
        match err {
            IngestError::MissingDependency { component, detail } => {
                assert_eq!(component, "marker");
                assert!(detail.starts_with("ModuleNotFoundError"), "{detail}");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn unknown_option_is_api_mismatch() {
        let stderr = "Usage: marker_single [OPTIONS] FPATH\nTry 'marker_single --help' for help.\n\nError: No such option: --use_llm\n";
        let err = classify_failure("exit status: 2", stderr);
        assert_eq!(err.kind(), FailureKind::ApiMismatch);
        assert!(err.to_string().contains("--use_llm"), "{err}");
    }

    #[test]
    fn attribute_error_is_api_mismatch() {
        let stderr = "AttributeError: 'ConfigParser' object has no attribute 'get_llm_service'\n";
        let err = classify_failure("exit status: 1", stderr);
        assert_eq!(err.kind(), FailureKind::ApiMismatch);
        assert!(err.to_string().contains("get_llm_service"));
    }

    #[test]
    fn anything_else_is_converter_failure() {
        let stderr = (1..=50)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let err = classify_failure("exit status: 137", &stderr);
        assert_eq!(err.kind(), FailureKind::Other);
        match err {
            IngestError::ConverterFailed { status, stderr } => {
                assert_eq!(status, "exit status: 137");
                assert_eq!(stderr.lines().count(), STDERR_TAIL_LINES);
                assert!(stderr.ends_with("line 50"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn missing_executable_is_missing_dependency() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let err = spawn_error(Path::new("marker_single"), e);
        assert_eq!(err.kind(), FailureKind::MissingDependency);
    }
}
