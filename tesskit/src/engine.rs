//! The native engine boundary.
//!
//! [`EngineApi`] is the surface of the Tesseract/Leptonica C interface that
//! the session pipelines drive. The `native` module implements it over the
//! real libraries; tests implement it with recording fakes.
//!
//! Transient native resources are modeled as associated types that release
//! themselves on `Drop`, so a pipeline only has to let them go out of scope:
//!
//! - [`EngineApi::Pix`] owns a decoded pixel buffer (`pixDestroy`)
//! - [`EngineApi::Renderer`] owns a PDF renderer (`TessDeleteResultRenderer`)
//!
//! Implementations hold the engine handle itself and release it in their own
//! `Drop` impl.

use crate::error::Result;
use crate::language::EngineMode;
use std::path::Path;

/// Operations a session needs from an OCR engine handle.
///
/// None of these methods are reentrant. The session guarantees that at most
/// one call is in flight per engine by holding its mutex across every
/// pipeline.
pub trait EngineApi: Send {
    /// Owned pixel buffer, released on drop.
    type Pix;

    /// Owned PDF renderer bound to an output file, released on drop.
    type Renderer;

    /// Initialize the handle for `languages` (`+`-joined codes) from `data_dir`.
    ///
    /// Called exactly once per handle. A failure leaves the handle unusable.
    fn init(&mut self, data_dir: &Path, languages: &str, mode: EngineMode) -> Result<()>;

    /// Set an engine variable. Returns `false` if the engine rejected it.
    fn set_variable(&mut self, name: &str, value: &str) -> bool;

    /// Decode an encoded image (PNG, JPEG, TIFF, ...) into a pixel buffer.
    fn read_pix(&self, encoded: &[u8]) -> Option<Self::Pix>;

    /// Bind a pixel buffer as the image for the next recognition.
    ///
    /// The buffer must outlive the binding; callers [`clear`](Self::clear)
    /// the engine before dropping it.
    fn set_image(&mut self, pix: &Self::Pix);

    /// Vertical resolution of the bound image in pixels per inch.
    ///
    /// Must only be called while an image is bound.
    fn source_y_resolution(&self) -> i32;

    /// Override the resolution the engine assumes for the bound image.
    fn set_source_resolution(&mut self, ppi: i32);

    /// Run recognition and return the UTF-8 text, or `None` if the engine
    /// produced no text buffer (for example when no image is bound).
    fn utf8_text(&mut self) -> Option<String>;

    /// Drop the bound image and any recognition results.
    fn clear(&mut self);

    /// Version string of the underlying engine.
    fn version(&self) -> Option<String>;

    /// Open a PDF renderer writing to `<output_base>.pdf`.
    ///
    /// `data_dir` must contain the renderer's font (`pdf.ttf`).
    fn create_pdf_renderer(
        &mut self,
        output_base: &Path,
        data_dir: &Path,
        text_only: bool,
    ) -> Result<Self::Renderer>;

    /// Start a document. Must succeed before any page is processed.
    fn begin_document(&mut self, renderer: &mut Self::Renderer, title: &str) -> bool;

    /// Recognize one page and append it to the renderer's document.
    fn process_page(
        &mut self,
        pix: &Self::Pix,
        page_index: usize,
        label: &str,
        timeout_ms: i32,
        renderer: &mut Self::Renderer,
    ) -> bool;

    /// Finalize the document. The output file is complete once the renderer
    /// has also been dropped.
    fn end_document(&mut self, renderer: &mut Self::Renderer) -> bool;
}

/// Pixel buffers bound to an engine for the length of one pipeline call.
///
/// On drop the engine is cleared first, then the held buffers are released,
/// so the engine never points at freed pixels.
pub(crate) struct EngineScope<'e, E: EngineApi> {
    engine: &'e mut E,
    pixes: Vec<E::Pix>,
}

impl<'e, E: EngineApi> EngineScope<'e, E> {
    pub(crate) fn new(engine: &'e mut E) -> Self {
        Self {
            engine,
            pixes: Vec::new(),
        }
    }

    pub(crate) fn engine(&mut self) -> &mut E {
        &mut *self.engine
    }

    /// Keep a buffer alive until the scope ends.
    pub(crate) fn hold(&mut self, pix: E::Pix) {
        self.pixes.push(pix);
    }

    /// Hold a buffer and bind it as the current image.
    pub(crate) fn bind(&mut self, pix: E::Pix) {
        self.pixes.push(pix);
        if let Some(pix) = self.pixes.last() {
            self.engine.set_image(pix);
        }
    }

    pub(crate) fn split(&mut self) -> (&mut E, &[E::Pix]) {
        (&mut *self.engine, self.pixes.as_slice())
    }
}

impl<E: EngineApi> Drop for EngineScope<'_, E> {
    fn drop(&mut self) {
        self.engine.clear();
    }
}
