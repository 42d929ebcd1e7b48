mod error;
mod fonts;
mod model;
mod pdf;

pub mod drafts;
pub mod geo;

pub use error::Error;
pub use fonts::FontStyle;
pub use model::{
    DEFAULT_PHOTO_CAPTION, Geolocation, LocationDetails, PhotoEvidence, Record, TableRow,
};
pub use pdf::{
    DEFAULT_TITLE, Document, DrawOp, LayoutCursor, LayoutState, Page, PageGeometry, Rect,
    RenderOptions, Rgb, Stroke, TextAlign, page_label,
};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Validate `record` and lay it out into a finished, footer-stamped document.
pub fn generate(record: &Record, options: &RenderOptions) -> Result<Document, Error> {
    record.validate()?;
    pdf::render(record, options)
}

/// Generate and write the PDF into `out_dir` under the record's file name.
/// Returns the path written.
pub fn generate_to_file(
    record: &Record,
    options: &RenderOptions,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let doc = generate(record, options)?;
    let t_render = t0.elapsed();

    let bytes = doc.to_pdf_bytes()?;
    let t_serialize = t0.elapsed();

    let path = out_dir.join(doc.file_name());
    std::fs::write(&path, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, serialize={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_serialize - t_render).as_secs_f64() * 1000.0,
        (t_total - t_serialize).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}

/// Read `file` for every photo that names one and has no bytes yet.
/// Unreadable files are logged and left empty, so the photo is skipped at
/// render time.
pub fn load_photo_files(record: &mut Record, base_dir: &Path) {
    for photo in record.photos.iter_mut().filter(|p| p.image.is_none()) {
        let Some(file) = photo.file.as_ref() else {
            continue;
        };
        let path = base_dir.join(file);
        match std::fs::read(&path) {
            Ok(bytes) => photo.image = Some(bytes),
            Err(e) => log::warn!("Photo {} not loaded from {}: {e}", photo.id, path.display()),
        }
    }
}
