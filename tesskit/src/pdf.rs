//! Searchable PDF generation.
//!
//! The engine's PDF renderer only writes to the filesystem, so each call
//! renders into its own temporary directory and reads the result back. The
//! directory is removed before the call returns on every path.

use crate::convert::to_pix;
use crate::engine::{EngineApi, EngineScope};
use crate::error::{Result, TessError};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Title written into the document info dictionary.
pub const DOCUMENT_TITLE: &str = "Unknown Title";

/// Upper bound on recognition time for a single page.
pub const PAGE_TIMEOUT_MS: i32 = 30_000;

/// Basename the renderer writes to; it appends `.pdf` itself.
const OUTPUT_STEM: &str = "document";

/// Label the renderer records for a page.
pub(crate) fn page_label(page: usize) -> String {
    format!("page.{page}")
}

/// Render `images` as one PDF, one page per image, and return its bytes.
pub(crate) fn render_pdf<E: EngineApi>(
    engine: &mut E,
    data_dir: &Path,
    images: &[DynamicImage],
) -> Result<Vec<u8>> {
    let workspace = tempfile::Builder::new().prefix("tesskit-pdf-").tempdir()?;
    let output_base = workspace.path().join(OUTPUT_STEM);
    let output_path = output_base.with_extension("pdf");

    let mut scope = EngineScope::new(engine);

    let mut renderer = scope
        .engine()
        .create_pdf_renderer(&output_base, data_dir, false)?;
    if !scope.engine().begin_document(&mut renderer, DOCUMENT_TITLE) {
        return Err(TessError::BeginDocument);
    }

    for image in images {
        let pix = to_pix(scope.engine(), image)?;
        scope.hold(pix);
    }

    let (engine, pixes) = scope.split();
    for (page, pix) in pixes.iter().enumerate() {
        debug!(page, "rendering PDF page");
        if !engine.process_page(pix, page, &page_label(page), PAGE_TIMEOUT_MS, &mut renderer) {
            return Err(TessError::PageProcessing { page });
        }
    }

    if !engine.end_document(&mut renderer) {
        return Err(TessError::EndDocument);
    }
    // The renderer closes its output file when released.
    drop(renderer);

    let bytes = std::fs::read(&output_path)?;
    workspace.close()?;
    debug!(pages = images.len(), bytes = bytes.len(), "rendered PDF");
    Ok(bytes)
}
