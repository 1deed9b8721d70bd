//! Configuration for a single PDF-to-Markdown conversion.
//!
//! [`ConversionConfig`] is the flat options mapping handed to the Marker
//! converter, plus the one knob that belongs to this crate (`overwrite`).
//! It also knows how to translate itself into what `marker_single`
//! understands: renderer, languages and boolean switches become command-line
//! flags, and the remaining mapping (credentials included) is serialised into
//! the document passed through `--config_json`.
//!
//! `languages` must go on the command line: Marker's parser splits the flag
//! into a list, while `--config_json` values are merged verbatim.

use crate::error::IngestError;
use serde::Serialize;
use std::fmt;

/// Renderer requested from Marker. The output file is always Markdown.
pub const OUTPUT_FORMAT: &str = "markdown";

/// Marker's LLM service class used when `use_llm` is on.
pub const GEMINI_LLM_SERVICE: &str = "marker.services.gemini.GoogleGeminiService";

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use ingest_documents::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .gemini_api_key("AIza...")
///     .build()
///     .unwrap();
/// assert!(config.use_llm);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// OCR languages, comma separated. Default: `"en"`.
    pub languages: String,

    /// Skip extracting embedded images. Default: true.
    pub disable_image_extraction: bool,

    /// Let Marker run its LLM post-processors. Default: true.
    pub use_llm: bool,

    /// API key for the Gemini LLM service. Empty keys are stored as `None`.
    pub gemini_api_key: Option<String>,

    /// LLM model override. If None, Marker's default model is used.
    pub model_name: Option<String>,

    /// Reconvert even when the output file already exists. Default: false.
    pub overwrite: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            languages: "en".to_string(),
            disable_image_extraction: true,
            use_llm: true,
            gemini_api_key: None,
            model_name: None,
            overwrite: false,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("languages", &self.languages)
            .field("disable_image_extraction", &self.disable_image_extraction)
            .field("use_llm", &self.use_llm)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| REDACTED))
            .field("model_name", &self.model_name)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

const REDACTED: &str = "<redacted>";

/// The options mapping as Marker's config parser sees it.
#[derive(Serialize)]
struct MarkerOptions<'a> {
    output_format: &'a str,
    disable_image_extraction: bool,
    use_llm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<&'a str>,
    #[serde(
        rename = "gemini_model_name",
        skip_serializing_if = "Option::is_none"
    )]
    model_name: Option<&'a str>,
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    fn marker_options(&self, key: Option<&str>) -> serde_json::Value {
        let options = MarkerOptions {
            output_format: OUTPUT_FORMAT,
            disable_image_extraction: self.disable_image_extraction,
            use_llm: self.use_llm,
            gemini_api_key: key,
            model_name: self.model_name.as_deref(),
        };
        // A struct of strings and bools always serialises.
        serde_json::to_value(options).unwrap_or(serde_json::Value::Null)
    }

    /// The full options mapping written to Marker's `--config_json` file.
    pub fn marker_config_json(&self) -> serde_json::Value {
        self.marker_options(self.gemini_api_key.as_deref())
    }

    /// The options mapping with the API key masked, for logging.
    pub fn redacted_mapping(&self) -> serde_json::Value {
        self.marker_options(self.gemini_api_key.as_ref().map(|_| REDACTED))
    }

    /// LLM service Marker should instantiate, if LLM post-processing is on.
    pub fn llm_service(&self) -> Option<&'static str> {
        self.use_llm.then_some(GEMINI_LLM_SERVICE)
    }

    /// Command-line flags selecting the renderer, the OCR languages, the LLM
    /// service and the boolean switches. Everything else travels in the
    /// config JSON.
    pub fn marker_flags(&self) -> Vec<String> {
        let mut flags = vec![
            "--output_format".to_string(),
            OUTPUT_FORMAT.to_string(),
            "--languages".to_string(),
            self.languages.clone(),
        ];
        if self.disable_image_extraction {
            flags.push("--disable_image_extraction".to_string());
        }
        if let Some(service) = self.llm_service() {
            flags.push("--use_llm".to_string());
            flags.push("--llm_service".to_string());
            flags.push(service.to_string());
        }
        flags
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn languages(mut self, languages: impl Into<String>) -> Self {
        self.config.languages = languages.into();
        self
    }

    pub fn disable_image_extraction(mut self, v: bool) -> Self {
        self.config.disable_image_extraction = v;
        self
    }

    pub fn use_llm(mut self, v: bool) -> Self {
        self.config.use_llm = v;
        self
    }

    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.gemini_api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.config.model_name = (!model.trim().is_empty()).then_some(model);
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, IngestError> {
        let c = &self.config;
        if c.languages.trim().is_empty() {
            return Err(IngestError::InvalidConfig(
                "At least one OCR language is required".into(),
            ));
        }
        if c
            .languages
            .split(',')
            .any(|lang| lang.trim().is_empty())
        {
            return Err(IngestError::InvalidConfig(format!(
                "Malformed language list '{}'",
                c.languages
            )));
        }
        Ok(self.config)
    }
}
