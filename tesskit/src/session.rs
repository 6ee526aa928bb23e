//! OCR sessions: one engine handle, serialized access, option tracking.

use crate::config::SessionConfig;
use crate::convert::{is_blank_canvas, to_pix};
use crate::engine::{EngineApi, EngineScope};
use crate::env::{ScopedEnvVar, TESSDATA_PREFIX};
use crate::error::{Result, TessError};
use crate::language::{EngineMode, RecognitionLanguage};
use crate::option::{EngineOption, LegacyVariable, OptionSet};
use crate::pdf::render_pdf;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

/// Below this vertical resolution (PPI) the source resolution is treated as
/// missing or unreliable.
pub const MIN_SOURCE_RESOLUTION: i32 = 70;

/// Resolution assumed for images whose own resolution is below
/// [`MIN_SOURCE_RESOLUTION`].
pub const DEFAULT_SOURCE_RESOLUTION: i32 = 300;

struct SessionState<E> {
    engine: E,
    options: OptionSet,
}

/// A Tesseract session owning one initialized engine handle.
///
/// The session is `Send + Sync` and can be shared between threads (e.g. in
/// an `Arc`). Every operation takes the session's single lock, so calls
/// from different threads run one at a time in no particular order, and each
/// blocks until it gets its turn. There is no timeout; run the call on a
/// separate thread to race it against one.
///
/// The lock is not reentrant, and nothing in the API calls back into user
/// code while it is held.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "tesseract")]
/// # fn main() -> tesskit::Result<()> {
/// use tesskit::{RecognitionLanguage, SessionConfig, Tesseract};
///
/// let config = SessionConfig::with_language(RecognitionLanguage::English)
///     .data_dir("/usr/share/tesseract-ocr/5/tessdata");
/// let tesseract = Tesseract::native(config)?;
///
/// let image = image::open("receipt.png").map_err(tesskit::TessError::from)?;
/// println!("{}", tesseract.recognize(&image)?);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "tesseract"))]
/// # fn main() {}
/// ```
pub struct Tesseract<E: EngineApi> {
    state: Mutex<SessionState<E>>,
    languages: Vec<RecognitionLanguage>,
    engine_mode: EngineMode,
    data_dir: PathBuf,
    version: Option<String>,
}

impl<E: EngineApi> Tesseract<E> {
    /// Initialize `engine` from `config` and apply the configured options.
    ///
    /// Initialization can only be attempted once per handle: on failure the
    /// engine is dropped (releasing its handle) and
    /// [`TessError::Initialization`] is returned.
    pub fn new(mut engine: E, config: SessionConfig) -> Result<Self> {
        let SessionConfig {
            languages,
            data_dir,
            engine_mode,
            options,
        } = config;

        if languages.is_empty() {
            return Err(TessError::NoLanguages);
        }
        if let Some(language) = languages.iter().find(|l| !l.is_well_formed()) {
            return Err(TessError::InvalidArgument(format!(
                "malformed language code {:?}",
                language.code()
            )));
        }
        let language_string = RecognitionLanguage::language_string(&languages);

        {
            let _prefix = ScopedEnvVar::set(TESSDATA_PREFIX, &data_dir)?;
            if let Err(err) = engine.init(&data_dir, &language_string, engine_mode) {
                error!(
                    languages = %language_string,
                    data_dir = %data_dir.display(),
                    "failed to initialize tesseract: {err}"
                );
                return Err(err);
            }
        }

        // Stale across handles in the same process; start every session from the default.
        LegacyVariable::OldXHeight(false).apply(&mut engine);

        for option in &options {
            apply_option(&mut engine, engine_mode, option);
        }

        let version = engine.version();
        debug!(
            languages = %language_string,
            ?engine_mode,
            version = version.as_deref().unwrap_or("unknown"),
            "initialized tesseract session"
        );

        Ok(Self {
            state: Mutex::new(SessionState { engine, options }),
            languages,
            engine_mode,
            data_dir,
            version,
        })
    }

    /// Version of the underlying engine, if it reports one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn languages(&self) -> &[RecognitionLanguage] {
        &self.languages
    }

    pub fn engine_mode(&self) -> EngineMode {
        self.engine_mode
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> Result<OptionSet> {
        Ok(self.lock()?.options.clone())
    }

    /// Replace the option set.
    ///
    /// Only options that are new or whose value changed are written to the
    /// engine. Options missing from `options` keep their current engine value;
    /// set them to a neutral value (such as an empty whitelist) to clear them.
    pub fn set_options(&self, options: OptionSet) -> Result<()> {
        let mut state = self.lock()?;
        let SessionState {
            engine,
            options: current,
        } = &mut *state;
        for option in options.additions(current) {
            apply_option(engine, self.engine_mode, option);
        }
        *current = options;
        Ok(())
    }

    /// Insert or replace one option, applying it if its value changed.
    pub fn update_option(&self, option: EngineOption) -> Result<()> {
        let mut state = self.lock()?;
        let unchanged = state
            .options
            .get(option.kind())
            .is_some_and(|current| current.is_identical(&option));
        if !unchanged {
            apply_option(&mut state.engine, self.engine_mode, &option);
            state.options.insert(option);
        }
        Ok(())
    }

    /// Recognize the text in `image`.
    ///
    /// An image with no pixels binds nothing, so the engine has nothing to
    /// recognize and the call fails with [`TessError::UnableToExtractText`].
    pub fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let mut state = self.lock()?;
        let mut scope = EngineScope::new(&mut state.engine);

        if !is_blank_canvas(image) {
            let pix = to_pix(scope.engine(), image)?;
            scope.bind(pix);

            // Only meaningful with an image bound.
            let engine = scope.engine();
            let ppi = engine.source_y_resolution();
            if ppi < MIN_SOURCE_RESOLUTION {
                warn!(
                    ppi,
                    assumed = DEFAULT_SOURCE_RESOLUTION,
                    "source resolution missing or too low"
                );
                engine.set_source_resolution(DEFAULT_SOURCE_RESOLUTION);
            }
        }

        let text = scope
            .engine()
            .utf8_text()
            .ok_or(TessError::UnableToExtractText)?;
        debug!(
            width = image.width(),
            height = image.height(),
            chars = text.chars().count(),
            "recognized text"
        );
        Ok(text)
    }

    /// Recognize `images` and render them as a searchable PDF, one page per
    /// image in order.
    pub fn create_pdf(&self, images: &[DynamicImage]) -> Result<Vec<u8>> {
        let mut state = self.lock()?;
        render_pdf(&mut state.engine, &self.data_dir, images)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState<E>>> {
        self.state.lock().map_err(|_| TessError::Poisoned)
    }
}

fn is_character_list(option: &EngineOption) -> bool {
    matches!(
        option,
        EngineOption::CharWhitelist(_) | EngineOption::CharBlacklist(_)
    )
}

/// Write one option to the engine, noting lists the mode will ignore.
fn apply_option<E: EngineApi>(engine: &mut E, engine_mode: EngineMode, option: &EngineOption) {
    if !engine_mode.honors_character_lists() && is_character_list(option) {
        debug!(
            variable = option.variable_name(),
            ?engine_mode,
            "character list has no effect in this engine mode"
        );
    }
    option.apply(engine);
}

impl<E: EngineApi> std::fmt::Debug for Tesseract<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tesseract")
            .field("languages", &self.languages)
            .field("engine_mode", &self.engine_mode)
            .field("data_dir", &self.data_dir)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
