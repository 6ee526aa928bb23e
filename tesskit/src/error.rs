//! Error types for tesskit

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tesskit operations
pub type Result<T> = std::result::Result<T, TessError>;

/// Error types for OCR sessions
#[derive(Error, Debug)]
pub enum TessError {
    /// A session needs at least one recognition language
    #[error("At least one recognition language is required")]
    NoLanguages,

    /// The engine handle could not be allocated
    #[error("Failed to create Tesseract engine handle")]
    EngineCreation,

    /// Engine initialization failed (missing or corrupt traineddata).
    ///
    /// The handle that failed is released; build a new session to retry.
    #[error(
        "Failed to initialize Tesseract with languages '{languages}' from {}: status {status}",
        .data_dir.display()
    )]
    Initialization {
        status: i32,
        languages: String,
        data_dir: PathBuf,
    },

    /// A string or path could not be passed across the native boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input image could not be converted to a pixel buffer
    #[error("Failed to convert image: {0}")]
    ImageConversion(String),

    /// Recognition produced no text buffer
    #[error("Unable to extract text from image")]
    UnableToExtractText,

    /// The PDF renderer could not be created
    #[error("Failed to create PDF renderer")]
    RendererCreation,

    /// The renderer refused to begin a document
    #[error("Failed to begin PDF document")]
    BeginDocument,

    /// A page could not be recognized and rendered
    #[error("Failed to process page {page}")]
    PageProcessing { page: usize },

    /// The renderer refused to finalize the document
    #[error("Failed to end PDF document")]
    EndDocument,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A previous operation panicked while holding the engine
    #[error("Engine state is poisoned by a panic in a previous operation")]
    Poisoned,
}

impl From<toml::de::Error> for TessError {
    fn from(err: toml::de::Error) -> Self {
        TessError::Config(err.to_string())
    }
}

impl From<image::ImageError> for TessError {
    fn from(err: image::ImageError) -> Self {
        TessError::ImageConversion(err.to_string())
    }
}
