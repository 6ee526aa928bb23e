//! Recording engine shared by the integration tests.
//!
//! `RecordingEngine` implements `EngineApi` without any native library. It
//! logs every boundary call, counts live pixel buffers and renderers, and
//! tracks how many pipeline calls overlap inside the engine.

#![allow(dead_code)]

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tesskit::{EngineApi, EngineMode, TessError, TESSDATA_PREFIX};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init {
        data_dir: PathBuf,
        languages: String,
        mode: EngineMode,
        tessdata_prefix: Option<OsString>,
    },
    SetVariable(String, String),
    ReadPix,
    SetImage,
    SourceYResolution,
    SetSourceResolution(i32),
    Utf8Text,
    Clear,
    CreateRenderer(PathBuf),
    BeginDocument(String),
    ProcessPage { index: usize, label: String },
    EndDocument,
}

/// Failure switches for the fake engine.
#[derive(Debug, Clone, Default)]
pub struct Behavior {
    pub init_status: i32,
    pub source_ppi: i32,
    pub reject_pix: bool,
    pub fail_renderer: bool,
    pub fail_begin: bool,
    pub fail_page: Option<usize>,
    pub fail_end: bool,
    /// Report success from `end_document` but delete the output file.
    pub remove_output_on_end: bool,
    /// Sleep inside recognition to widen race windows.
    pub recognition_delay_ms: u64,
}

/// Shared view of everything the engine did, readable after the engine has
/// been moved into a session.
#[derive(Clone, Default)]
pub struct Probe {
    calls: Arc<Mutex<Vec<Call>>>,
    live_pix: Arc<AtomicUsize>,
    live_renderers: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    engines_dropped: Arc<AtomicUsize>,
}

impl Probe {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_variable_calls(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetVariable(name, value) => Some((name, value)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    pub fn renderer_path(&self) -> Option<PathBuf> {
        self.calls().into_iter().find_map(|call| match call {
            Call::CreateRenderer(path) => Some(path),
            _ => None,
        })
    }

    pub fn live_pix(&self) -> usize {
        self.live_pix.load(Ordering::SeqCst)
    }

    pub fn live_renderers(&self) -> usize {
        self.live_renderers.load(Ordering::SeqCst)
    }

    /// Images currently bound and not yet cleared.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn engines_dropped(&self) -> usize {
        self.engines_dropped.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakePix {
    image: DynamicImage,
    live: Arc<AtomicUsize>,
}

impl Drop for FakePix {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FakeRenderer {
    output: PathBuf,
    pages: Vec<String>,
    live: Arc<AtomicUsize>,
}

impl Drop for FakeRenderer {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct RecordingEngine {
    probe: Probe,
    behavior: Behavior,
    bound: Option<DynamicImage>,
    ppi: i32,
    variables: Vec<(String, String)>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Probe) {
        Self::with_behavior(Behavior::default())
    }

    pub fn with_behavior(behavior: Behavior) -> (Self, Probe) {
        let probe = Probe::default();
        let engine = Self {
            probe: probe.clone(),
            ppi: behavior.source_ppi,
            behavior,
            bound: None,
            variables: Vec::new(),
        };
        (engine, probe)
    }

    fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Drop for RecordingEngine {
    fn drop(&mut self) {
        self.probe.engines_dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// What the fake "recognizes": a description of the bound image.
pub fn describe(image: &DynamicImage) -> String {
    let (width, height) = image.dimensions();
    let rgb = image.to_rgb8();
    let Rgb([r, g, b]) = *rgb.get_pixel(0, 0);
    format!("{width}x{height} #{r:02x}{g:02x}{b:02x}\n")
}

impl EngineApi for RecordingEngine {
    type Pix = FakePix;
    type Renderer = FakeRenderer;

    fn init(&mut self, data_dir: &Path, languages: &str, mode: EngineMode) -> tesskit::Result<()> {
        self.probe.record(Call::Init {
            data_dir: data_dir.to_path_buf(),
            languages: languages.to_string(),
            mode,
            tessdata_prefix: std::env::var_os(TESSDATA_PREFIX),
        });
        if self.behavior.init_status != 0 {
            return Err(TessError::Initialization {
                status: self.behavior.init_status,
                languages: languages.to_string(),
                data_dir: data_dir.to_path_buf(),
            });
        }
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> bool {
        self.probe
            .record(Call::SetVariable(name.to_string(), value.to_string()));
        self.variables.push((name.to_string(), value.to_string()));
        true
    }

    fn read_pix(&self, encoded: &[u8]) -> Option<FakePix> {
        self.probe.record(Call::ReadPix);
        if self.behavior.reject_pix {
            return None;
        }
        let image = image::load_from_memory(encoded).ok()?;
        self.probe.live_pix.fetch_add(1, Ordering::SeqCst);
        Some(FakePix {
            image,
            live: self.probe.live_pix.clone(),
        })
    }

    fn set_image(&mut self, pix: &FakePix) {
        self.probe.record(Call::SetImage);
        if self.bound.replace(pix.image.clone()).is_none() {
            self.probe.enter();
        }
        self.ppi = self.behavior.source_ppi;
    }

    fn source_y_resolution(&self) -> i32 {
        self.probe.record(Call::SourceYResolution);
        assert!(
            self.bound.is_some(),
            "source resolution queried without a bound image"
        );
        self.ppi
    }

    fn set_source_resolution(&mut self, ppi: i32) {
        self.probe.record(Call::SetSourceResolution(ppi));
        self.ppi = ppi;
    }

    fn utf8_text(&mut self) -> Option<String> {
        self.probe.record(Call::Utf8Text);
        if self.behavior.recognition_delay_ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(
                self.behavior.recognition_delay_ms,
            ));
        }
        let image = self.bound.as_ref()?;
        let mut text = describe(image);
        if let Some(whitelist) = self.variable("tessedit_char_whitelist") {
            if !whitelist.is_empty() {
                text.retain(|c| whitelist.contains(c) || c == '\n');
            }
        }
        Some(text)
    }

    fn clear(&mut self) {
        self.probe.record(Call::Clear);
        if self.bound.take().is_some() {
            self.probe.leave();
        }
    }

    fn version(&self) -> Option<String> {
        Some("5.3.0-fake".to_string())
    }

    fn create_pdf_renderer(
        &mut self,
        output_base: &Path,
        _data_dir: &Path,
        _text_only: bool,
    ) -> tesskit::Result<FakeRenderer> {
        self.probe
            .record(Call::CreateRenderer(output_base.with_extension("pdf")));
        if self.behavior.fail_renderer {
            return Err(TessError::RendererCreation);
        }
        self.probe.live_renderers.fetch_add(1, Ordering::SeqCst);
        Ok(FakeRenderer {
            output: output_base.with_extension("pdf"),
            pages: Vec::new(),
            live: self.probe.live_renderers.clone(),
        })
    }

    fn begin_document(&mut self, renderer: &mut FakeRenderer, title: &str) -> bool {
        self.probe.record(Call::BeginDocument(title.to_string()));
        if self.behavior.fail_begin {
            return false;
        }
        std::fs::write(&renderer.output, format!("%PDF-1.5\n% {title}\n")).is_ok()
    }

    fn process_page(
        &mut self,
        pix: &FakePix,
        page_index: usize,
        label: &str,
        _timeout_ms: i32,
        renderer: &mut FakeRenderer,
    ) -> bool {
        self.probe.record(Call::ProcessPage {
            index: page_index,
            label: label.to_string(),
        });
        if self.behavior.fail_page == Some(page_index) {
            return false;
        }
        self.set_image(pix);
        let text = self.utf8_text().unwrap_or_default();
        renderer
            .pages
            .push(format!("page {page_index} {label}: {}", text.trim_end()));
        true
    }

    fn end_document(&mut self, renderer: &mut FakeRenderer) -> bool {
        self.probe.record(Call::EndDocument);
        if self.behavior.fail_end {
            return false;
        }
        let mut body = std::fs::read_to_string(&renderer.output).unwrap_or_default();
        for page in &renderer.pages {
            body.push_str(page);
            body.push('\n');
        }
        body.push_str(&format!("/Count {}\n%%EOF\n", renderer.pages.len()));
        if self.behavior.remove_output_on_end {
            return std::fs::remove_file(&renderer.output).is_ok();
        }
        std::fs::write(&renderer.output, body).is_ok()
    }
}

pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

pub fn page_count(pdf: &[u8]) -> usize {
    String::from_utf8_lossy(pdf)
        .lines()
        .filter(|line| line.starts_with("page "))
        .count()
}

/// Formatted log output collected by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a debug-level subscriber on this thread and return its logs.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}
