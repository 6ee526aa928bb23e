//! Recognition languages and engine modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language Tesseract can recognize.
///
/// Each variant maps to the basename of a `<code>.traineddata` file in the
/// session's data directory. Use [`RecognitionLanguage::Custom`] for
/// traineddata that is not listed here (e.g. a font-specific model).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecognitionLanguage {
    Arabic,
    ChineseSimplified,
    ChineseTraditional,
    Czech,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Greek,
    Hebrew,
    Hindi,
    Hungarian,
    Italian,
    Japanese,
    Korean,
    Norwegian,
    Polish,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Thai,
    Turkish,
    Ukrainian,
    Vietnamese,
    /// Any other traineddata basename
    ///
    /// Compared by its payload only: `Custom("eng".into())` is not equal to
    /// [`RecognitionLanguage::English`], although both pass `"eng"` to the
    /// engine. Parse codes with `From<String>` or [`FromStr`] to get the
    /// named variant where one exists.
    Custom(String),
}

const KNOWN_LANGUAGES: &[(RecognitionLanguage, &str)] = &[
    (RecognitionLanguage::Arabic, "ara"),
    (RecognitionLanguage::ChineseSimplified, "chi_sim"),
    (RecognitionLanguage::ChineseTraditional, "chi_tra"),
    (RecognitionLanguage::Czech, "ces"),
    (RecognitionLanguage::Danish, "dan"),
    (RecognitionLanguage::Dutch, "nld"),
    (RecognitionLanguage::English, "eng"),
    (RecognitionLanguage::Finnish, "fin"),
    (RecognitionLanguage::French, "fra"),
    (RecognitionLanguage::German, "deu"),
    (RecognitionLanguage::Greek, "ell"),
    (RecognitionLanguage::Hebrew, "heb"),
    (RecognitionLanguage::Hindi, "hin"),
    (RecognitionLanguage::Hungarian, "hun"),
    (RecognitionLanguage::Italian, "ita"),
    (RecognitionLanguage::Japanese, "jpn"),
    (RecognitionLanguage::Korean, "kor"),
    (RecognitionLanguage::Norwegian, "nor"),
    (RecognitionLanguage::Polish, "pol"),
    (RecognitionLanguage::Portuguese, "por"),
    (RecognitionLanguage::Romanian, "ron"),
    (RecognitionLanguage::Russian, "rus"),
    (RecognitionLanguage::Spanish, "spa"),
    (RecognitionLanguage::Swedish, "swe"),
    (RecognitionLanguage::Thai, "tha"),
    (RecognitionLanguage::Turkish, "tur"),
    (RecognitionLanguage::Ukrainian, "ukr"),
    (RecognitionLanguage::Vietnamese, "vie"),
];

impl RecognitionLanguage {
    /// The Tesseract language code (traineddata basename).
    pub fn code(&self) -> &str {
        if let RecognitionLanguage::Custom(code) = self {
            return code;
        }
        KNOWN_LANGUAGES
            .iter()
            .find(|(language, _)| language == self)
            .map(|(_, code)| *code)
            .unwrap_or_default()
    }

    /// Whether the code can be joined into a language string: non-empty,
    /// with no `+` and no whitespace.
    pub fn is_well_formed(&self) -> bool {
        let code = self.code();
        !code.is_empty() && !code.contains('+') && !code.contains(char::is_whitespace)
    }

    /// Join languages into the `+`-separated string passed to engine init.
    ///
    /// ```
    /// use tesskit::RecognitionLanguage;
    ///
    /// let joined = RecognitionLanguage::language_string(&[
    ///     RecognitionLanguage::English,
    ///     RecognitionLanguage::Custom("OCRB".to_string()),
    /// ]);
    /// assert_eq!(joined, "eng+OCRB");
    /// ```
    pub fn language_string(languages: &[RecognitionLanguage]) -> String {
        languages
            .iter()
            .map(RecognitionLanguage::code)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl From<String> for RecognitionLanguage {
    fn from(code: String) -> Self {
        KNOWN_LANGUAGES
            .iter()
            .find(|(_, known)| *known == code)
            .map(|(language, _)| language.clone())
            .unwrap_or(RecognitionLanguage::Custom(code))
    }
}

impl From<RecognitionLanguage> for String {
    fn from(language: RecognitionLanguage) -> Self {
        match language {
            RecognitionLanguage::Custom(code) => code,
            other => other.code().to_string(),
        }
    }
}

impl FromStr for RecognitionLanguage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RecognitionLanguage::from(s.to_string()))
    }
}

impl fmt::Display for RecognitionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which recognition algorithm family the engine runs.
///
/// The mode decides which options are honored: character whitelists and
/// blacklists only take effect under [`EngineMode::TesseractOnly`]. Setting
/// them in any other mode is accepted by the engine and silently ignored.
/// `TesseractOnly` also needs legacy traineddata in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Legacy engine only
    TesseractOnly,
    /// LSTM neural network only
    #[default]
    LstmOnly,
    /// Legacy and LSTM engines combined
    TesseractLstmCombined,
    /// Whatever the traineddata supports
    Default,
}

impl EngineMode {
    /// Convert to the engine's `TessOcrEngineMode` value.
    pub fn as_raw(self) -> u32 {
        match self {
            EngineMode::TesseractOnly => 0,
            EngineMode::LstmOnly => 1,
            EngineMode::TesseractLstmCombined => 2,
            EngineMode::Default => 3,
        }
    }

    /// Whether character whitelist/blacklist options have any effect.
    pub fn honors_character_lists(self) -> bool {
        self == EngineMode::TesseractOnly
    }
}
