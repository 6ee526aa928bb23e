//! Session configuration

use crate::error::Result;
use crate::language::{EngineMode, RecognitionLanguage};
use crate::option::{EngineOption, OptionSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default traineddata directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "tessdata";

/// Everything needed to construct a [`Tesseract`](crate::Tesseract) session.
///
/// # Example
///
/// ```
/// use tesskit::{EngineMode, EngineOption, RecognitionLanguage, SessionConfig};
///
/// let config = SessionConfig::with_language(RecognitionLanguage::English)
///     .data_dir("/usr/share/tesseract-ocr/5/tessdata")
///     .engine_mode(EngineMode::TesseractOnly)
///     .option(EngineOption::CharWhitelist("0123456789".into()));
/// assert_eq!(config.language_string(), "eng");
/// ```
///
/// Or from TOML:
///
/// ```
/// use tesskit::SessionConfig;
///
/// let config = SessionConfig::from_toml_str(r#"
///     languages = ["eng", "fra"]
///     data_dir = "assets/tessdata"
///     engine_mode = "tesseract_only"
///
///     [[options]]
///     kind = "preserve_interword_spaces"
///     value = true
/// "#)?;
/// assert_eq!(config.language_string(), "eng+fra");
/// # Ok::<(), tesskit::TessError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Languages to recognize; must not be empty
    #[serde(default = "default_languages")]
    pub languages: Vec<RecognitionLanguage>,
    /// Directory containing `<lang>.traineddata` (and `pdf.ttf` for PDF output)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub engine_mode: EngineMode,
    /// Applied in order once the engine is initialized
    #[serde(default)]
    pub options: OptionSet,
}

fn default_languages() -> Vec<RecognitionLanguage> {
    vec![RecognitionLanguage::English]
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            data_dir: default_data_dir(),
            engine_mode: EngineMode::default(),
            options: OptionSet::default(),
        }
    }
}

impl SessionConfig {
    /// Configuration for several languages recognized together.
    pub fn new(languages: impl IntoIterator<Item = RecognitionLanguage>) -> Self {
        Self {
            languages: languages.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Configuration for a single language.
    pub fn with_language(language: RecognitionLanguage) -> Self {
        Self::new([language])
    }

    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn engine_mode(mut self, engine_mode: EngineMode) -> Self {
        self.engine_mode = engine_mode;
        self
    }

    /// Add an option, replacing any option of the same kind.
    pub fn option(mut self, option: EngineOption) -> Self {
        self.options.insert(option);
        self
    }

    pub fn options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    /// The `+`-joined language string handed to the engine.
    pub fn language_string(&self) -> String {
        RecognitionLanguage::language_string(&self.languages)
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML configuration file.
    ///
    /// A relative `data_dir` is resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        Ok(config)
    }
}
