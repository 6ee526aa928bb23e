//! Native engine over libtesseract and libleptonica.
//!
//! Every raw handle is wrapped in an owning type that releases it on drop:
//!
//! | Type | Acquired by | Released by |
//! |------|-------------|-------------|
//! | [`NativeEngine`] | `TessBaseAPICreate` | `TessBaseAPIEnd` + `TessBaseAPIDelete` |
//! | [`NativePix`] | `pixReadMem` | `pixDestroy` |
//! | [`NativeRenderer`] | `TessPDFRendererCreate` | `TessDeleteResultRenderer` |
//! | `NativeText` | `TessBaseAPIGetUTF8Text` | `TessDeleteText` |
//!
//! None of the raw pointers leave this module.

use crate::config::SessionConfig;
use crate::engine::EngineApi;
use crate::error::{Result, TessError};
use crate::language::EngineMode;
use crate::session::Tesseract;
use leptess::capi;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

/// A session backed by the system Tesseract library.
pub type NativeTesseract = Tesseract<NativeEngine>;

impl Tesseract<NativeEngine> {
    /// Create a native engine handle and initialize a session with it.
    pub fn native(config: SessionConfig) -> Result<Self> {
        Tesseract::new(NativeEngine::create()?, config)
    }
}

/// Owned `TessBaseAPI` handle.
pub struct NativeEngine {
    raw: *mut capi::TessBaseAPI,
}

// SAFETY: the handle is only used through `&mut self` (or `&self` for
// read-only getters), and `Tesseract` serializes all access behind a mutex.
// The C API has no thread affinity, only a ban on concurrent use.
unsafe impl Send for NativeEngine {}

impl NativeEngine {
    /// Allocate a new, uninitialized engine handle.
    pub fn create() -> Result<Self> {
        let raw = unsafe { capi::TessBaseAPICreate() };
        if raw.is_null() {
            return Err(TessError::EngineCreation);
        }
        Ok(Self { raw })
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        unsafe {
            capi::TessBaseAPIEnd(self.raw);
            capi::TessBaseAPIDelete(self.raw);
        }
    }
}

/// Owned Leptonica `PIX`.
pub struct NativePix {
    raw: *mut capi::Pix,
}

impl Drop for NativePix {
    fn drop(&mut self) {
        unsafe { capi::pixDestroy(&mut self.raw) };
    }
}

/// Owned PDF result renderer.
pub struct NativeRenderer {
    raw: *mut capi::TessResultRenderer,
}

impl Drop for NativeRenderer {
    fn drop(&mut self) {
        unsafe { capi::TessDeleteResultRenderer(self.raw) };
    }
}

/// Recognized text buffer allocated by the engine.
struct NativeText {
    raw: *mut c_char,
}

impl NativeText {
    fn to_string_lossy(&self) -> String {
        unsafe { CStr::from_ptr(self.raw) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Drop for NativeText {
    fn drop(&mut self) {
        unsafe { capi::TessDeleteText(self.raw) };
    }
}

fn c_string(value: &str) -> Option<CString> {
    CString::new(value).ok()
}

fn c_path(path: &Path) -> Result<CString> {
    let text = path.to_str().ok_or_else(|| {
        TessError::InvalidArgument(format!("path is not valid UTF-8: {}", path.display()))
    })?;
    CString::new(text).map_err(|_| {
        TessError::InvalidArgument(format!("path contains a NUL byte: {}", path.display()))
    })
}

impl EngineApi for NativeEngine {
    type Pix = NativePix;
    type Renderer = NativeRenderer;

    fn init(&mut self, data_dir: &Path, languages: &str, mode: EngineMode) -> Result<()> {
        let c_data_dir = c_path(data_dir)?;
        let c_languages = c_string(languages).ok_or_else(|| {
            TessError::InvalidArgument(format!("language string contains a NUL byte: {languages:?}"))
        })?;

        let status = unsafe {
            capi::TessBaseAPIInit2(
                self.raw,
                c_data_dir.as_ptr(),
                c_languages.as_ptr(),
                mode.as_raw() as capi::TessOcrEngineMode,
            )
        };
        if status != 0 {
            return Err(TessError::Initialization {
                status,
                languages: languages.to_string(),
                data_dir: data_dir.to_path_buf(),
            });
        }
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> bool {
        let (Some(c_name), Some(c_value)) = (c_string(name), c_string(value)) else {
            return false;
        };
        unsafe { capi::TessBaseAPISetVariable(self.raw, c_name.as_ptr(), c_value.as_ptr()) == 1 }
    }

    fn read_pix(&self, encoded: &[u8]) -> Option<NativePix> {
        let raw = unsafe { capi::pixReadMem(encoded.as_ptr(), encoded.len() as _) };
        if raw.is_null() {
            None
        } else {
            Some(NativePix { raw })
        }
    }

    fn set_image(&mut self, pix: &NativePix) {
        unsafe { capi::TessBaseAPISetImage2(self.raw, pix.raw) };
    }

    fn source_y_resolution(&self) -> i32 {
        unsafe { capi::TessBaseAPIGetSourceYResolution(self.raw) }
    }

    fn set_source_resolution(&mut self, ppi: i32) {
        unsafe { capi::TessBaseAPISetSourceResolution(self.raw, ppi) };
    }

    fn utf8_text(&mut self) -> Option<String> {
        let raw = unsafe { capi::TessBaseAPIGetUTF8Text(self.raw) };
        if raw.is_null() {
            return None;
        }
        let text = NativeText { raw };
        Some(text.to_string_lossy())
    }

    fn clear(&mut self) {
        unsafe { capi::TessBaseAPIClear(self.raw) };
    }

    fn version(&self) -> Option<String> {
        let raw = unsafe { capi::TessVersion() };
        if raw.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
    }

    fn create_pdf_renderer(
        &mut self,
        output_base: &Path,
        data_dir: &Path,
        text_only: bool,
    ) -> Result<NativeRenderer> {
        let c_output = c_path(output_base)?;
        let c_data_dir = c_path(data_dir)?;
        let raw = unsafe {
            capi::TessPDFRendererCreate(
                c_output.as_ptr(),
                c_data_dir.as_ptr(),
                i32::from(text_only) as _,
            )
        };
        if raw.is_null() {
            return Err(TessError::RendererCreation);
        }
        Ok(NativeRenderer { raw })
    }

    fn begin_document(&mut self, renderer: &mut NativeRenderer, title: &str) -> bool {
        let Some(c_title) = c_string(title) else {
            return false;
        };
        unsafe { capi::TessResultRendererBeginDocument(renderer.raw, c_title.as_ptr()) == 1 }
    }

    fn process_page(
        &mut self,
        pix: &NativePix,
        page_index: usize,
        label: &str,
        timeout_ms: i32,
        renderer: &mut NativeRenderer,
    ) -> bool {
        let (Some(c_label), Ok(page_index)) = (c_string(label), i32::try_from(page_index)) else {
            return false;
        };
        unsafe {
            capi::TessBaseAPIProcessPage(
                self.raw,
                pix.raw,
                page_index,
                c_label.as_ptr(),
                std::ptr::null(),
                timeout_ms,
                renderer.raw,
            ) == 1
        }
    }

    fn end_document(&mut self, renderer: &mut NativeRenderer) -> bool {
        unsafe { capi::TessResultRendererEndDocument(renderer.raw) == 1 }
    }
}
