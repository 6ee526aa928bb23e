//! # tesskit
//!
//! Thread-safe sessions over the Tesseract OCR engine: recognize text in
//! images and turn image sequences into searchable PDFs.
//!
//! - **One handle per session**: a [`Tesseract`] owns exactly one engine
//!   handle and releases it when dropped
//! - **Serialized access**: sessions are `Sync`; concurrent calls run one at a time
//! - **Scoped native buffers**: pixel buffers, text buffers and PDF renderers
//!   are released on every exit path
//! - **Option tracking**: only changed options are written back to the engine
//!
//! Recognition, layout analysis and PDF rendering are all done by the
//! wrapped engine. The native backend lives behind the `tesseract` feature;
//! without it the crate builds against any [`EngineApi`] implementation.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "tesseract")]
//! # fn main() -> tesskit::Result<()> {
//! use tesskit::{EngineMode, EngineOption, RecognitionLanguage, SessionConfig, Tesseract};
//!
//! let config = SessionConfig::new([RecognitionLanguage::English, RecognitionLanguage::French])
//!     .data_dir("/usr/share/tesseract-ocr/5/tessdata")
//!     .engine_mode(EngineMode::TesseractOnly)
//!     .option(EngineOption::CharBlacklist("|".into()));
//! let tesseract = Tesseract::native(config)?;
//!
//! let page = image::open("scan.png").map_err(tesskit::TessError::from)?;
//! let text = tesseract.recognize(&page)?;
//!
//! // Allow everything again
//! tesseract.update_option(EngineOption::CharBlacklist(String::new()))?;
//!
//! let pdf = tesseract.create_pdf(&[page])?;
//! std::fs::write("scan.pdf", pdf)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "tesseract"))]
//! # fn main() {}
//! ```

mod config;
mod convert;
mod engine;
mod env;
mod error;
mod language;
#[cfg(feature = "tesseract")]
mod native;
mod option;
mod pdf;
mod session;

pub use config::{SessionConfig, DEFAULT_DATA_DIR};
pub use convert::{encode_png, is_blank_canvas};
pub use engine::EngineApi;
pub use env::TESSDATA_PREFIX;
pub use error::{Result, TessError};
pub use language::{EngineMode, RecognitionLanguage};
#[cfg(feature = "tesseract")]
pub use native::{NativeEngine, NativePix, NativeRenderer, NativeTesseract};
pub use option::{EngineOption, OptionKind, OptionSet};
pub use pdf::{DOCUMENT_TITLE, PAGE_TIMEOUT_MS};
pub use session::{Tesseract, DEFAULT_SOURCE_RESOLUTION, MIN_SOURCE_RESOLUTION};
