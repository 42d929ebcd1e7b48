use chrono::Local;

use crate::error::Error;
use crate::fonts::FontStyle;
use crate::model::{PhotoEvidence, Record};

use super::RenderContext;
use super::canvas::{Rect, Rgb, Stroke, TextAlign, text_op};
use super::layout::wrap_text;
use super::section::render_section_title;

pub(crate) const PHOTOS_TITLE: &str = "EVIDENCIA FOTOGRÁFICA";
pub(crate) const SIGNATURE_TITLE: &str = "FIRMA DEL SUPERVISOR";

pub(crate) const PHOTO_WIDTH: f32 = 80.0;
/// Container height beyond the image, holding the caption lines.
pub(crate) const PHOTO_CAPTION_HEIGHT: f32 = 30.0;
const PHOTO_INSET: f32 = 5.0;
const DESCRIPTION_OFFSET: f32 = 15.0;
const DATE_OFFSET: f32 = 25.0;
const CAPTION_LINE: f32 = 5.0;
/// Room kept under the "Fecha:" baseline.
const CAPTION_BOTTOM: f32 = 5.0;
const PHOTO_SPACING: f32 = 5.0;
const CAPTION_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;

pub(crate) const SIGNATURE_WIDTH: f32 = 70.0;
const SIGNATURE_TEXT_HEIGHT: f32 = 20.0;
const SIGNATURE_GAP: f32 = 5.0;
pub(crate) const SIGNATURE_BOX_WIDTH: f32 = 100.0;
pub(crate) const SIGNATURE_BOX_HEIGHT: f32 = 60.0;
pub(crate) const SIGNATURE_BLANK_LINE: &str = "_________________________";
pub(crate) const SIGNATURE_PENDING: &str = "(Pendiente de firma digital)";

const CONTAINER_STROKE: Stroke = Stroke {
    color: Rgb::gray(180),
    width: 0.3,
};
const PLACEHOLDER_STROKE: Stroke = Stroke {
    color: Rgb::gray(100),
    width: 0.5,
};

/// Pixel data ready to become a PDF image XObject.
#[derive(Clone, Debug)]
pub(crate) enum ImageData {
    /// Original JPEG stream, embedded as-is with DCTDecode.
    Jpeg { data: Vec<u8>, gray: bool },
    /// Decoded 8-bit RGB samples with an optional alpha channel.
    Raw { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

#[derive(Clone, Debug)]
pub(crate) struct DecodedImage {
    pub(crate) pixel_width: u32,
    pub(crate) pixel_height: u32,
    pub(crate) data: ImageData,
}

impl DecodedImage {
    /// Height that keeps the source aspect ratio at `display_width`.
    pub(crate) fn display_height(&self, display_width: f32) -> f32 {
        self.pixel_height as f32 * display_width / self.pixel_width as f32
    }
}

/// Decode encoded image bytes, sniffing the format from the content.
pub(crate) fn decode_image(bytes: &[u8]) -> Result<DecodedImage, Error> {
    let format = image::guess_format(bytes).map_err(|e| Error::Image(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::Image(e.to_string()))?;
    let (pixel_width, pixel_height) = (decoded.width(), decoded.height());
    if pixel_width == 0 || pixel_height == 0 {
        return Err(Error::Image("image has no pixels".into()));
    }

    let data = match (format, decoded.color()) {
        (image::ImageFormat::Jpeg, image::ColorType::Rgb8) => ImageData::Jpeg {
            data: bytes.to_vec(),
            gray: false,
        },
        (image::ImageFormat::Jpeg, image::ColorType::L8) => ImageData::Jpeg {
            data: bytes.to_vec(),
            gray: true,
        },
        _ => {
            let rgba: image::RgbaImage = decoded.to_rgba8();
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);
            let rgb = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());
            ImageData::Raw { rgb, alpha }
        }
    };

    Ok(DecodedImage {
        pixel_width,
        pixel_height,
        data,
    })
}

/// Draw every decodable photo in its own bordered container. Photos without
/// image data or that fail to decode are logged and left out.
pub(crate) fn render_photos(ctx: &mut RenderContext, photos: &[PhotoEvidence]) {
    if photos.is_empty() {
        return;
    }
    render_section_title(ctx, PHOTOS_TITLE);

    for photo in photos {
        // Decoded one at a time, in order: each placement depends on where
        // the previous photo left the cursor.
        let decoded = match photo.image.as_deref().map(decode_image) {
            Some(Ok(decoded)) => decoded,
            Some(Err(e)) => {
                log::warn!("Skipping photo {}: {e}", photo.id);
                continue;
            }
            None => {
                log::warn!("Skipping photo {}: no image data", photo.id);
                continue;
            }
        };
        render_photo(ctx, photo, decoded);
    }

    let line_h = ctx.layout.geometry().line_height;
    ctx.layout.advance(line_h);
}

fn render_photo(ctx: &mut RenderContext, photo: &PhotoEvidence, decoded: DecodedImage) {
    let g = *ctx.layout.geometry();

    // A container taller than a whole page is scaled down to fit one.
    let max_image_h = g.bottom_limit() - ctx.content_top() - PHOTO_CAPTION_HEIGHT;
    let mut image_w = PHOTO_WIDTH;
    let mut image_h = decoded.display_height(PHOTO_WIDTH);
    if image_h > max_image_h && max_image_h > 0.0 {
        image_w *= max_image_h / image_h;
        image_h = max_image_h;
    }

    let label_x = g.margin_left + PHOTO_WIDTH + 10.0;
    let value_x = g.margin_left + PHOTO_WIDTH + 40.0;
    let description = if photo.description.trim().is_empty() {
        "N/A"
    } else {
        photo.description.as_str()
    };
    let value_w = (g.right_edge() - PHOTO_INSET - value_x).max(1.0);
    let description_lines = wrap_text(description, FontStyle::Regular, CAPTION_SIZE, value_w);

    // "Fecha:" follows the last description line; long captions grow the container.
    let date_dy = DATE_OFFSET + (description_lines.len() - 1) as f32 * CAPTION_LINE;
    let container_h = (image_h + PHOTO_CAPTION_HEIGHT).max(date_dy + CAPTION_BOTTOM);

    if ctx.layout.would_overflow(container_h) {
        ctx.break_page();
    }

    let name = ctx.register_image(decoded);
    let x = g.margin_left;
    let y = ctx.layout.y();
    log::debug!(
        "PHOTO id={} {name} {image_w:.1}x{image_h:.1} page={} y={y:.2}",
        photo.id,
        ctx.layout.page_index() + 1
    );

    let captured = photo
        .timestamp
        .with_timezone(&Local)
        .format("%d/%m/%Y, %H:%M:%S")
        .to_string();

    let page = ctx.page();
    page.fill_stroke_rect(
        Rect::new(x, y, g.content_width(), container_h),
        Rgb::WHITE,
        CONTAINER_STROKE,
    );
    page.image(&name, Rect::new(x + PHOTO_INSET, y + PHOTO_INSET, image_w, image_h));
    let caption = |label: &str, dy: f32| {
        text_op(label, label_x, y + dy, TextAlign::Left, FontStyle::Bold, CAPTION_SIZE, Rgb::BLACK)
    };
    let value = |text: &str, dy: f32| {
        text_op(text, value_x, y + dy, TextAlign::Left, FontStyle::Regular, CAPTION_SIZE, Rgb::BLACK)
    };
    page.text(caption("Descripción:", DESCRIPTION_OFFSET));
    for (i, line) in description_lines.iter().enumerate() {
        page.text(value(line, DESCRIPTION_OFFSET + i as f32 * CAPTION_LINE));
    }
    page.text(caption("Fecha:", date_dy));
    page.text(value(&captured, date_dy));

    ctx.layout.advance(container_h + PHOTO_SPACING);
}

/// Signature image with the supervisor's name and role, or an empty box to
/// sign by hand when no signature was captured. An unreadable signature
/// image fails the whole document.
pub(crate) fn render_signature(ctx: &mut RenderContext, record: &Record) -> Result<(), Error> {
    render_section_title(ctx, SIGNATURE_TITLE);

    let g = *ctx.layout.geometry();
    let line_h = g.line_height;
    let x = g.margin_left;

    match record.signature.as_deref() {
        Some(bytes) => {
            let decoded = decode_image(bytes)
                .map_err(|e| Error::Image(format!("signature: {e}")))?;
            let sig_h = decoded.display_height(SIGNATURE_WIDTH);
            if ctx.layout.would_overflow(sig_h + SIGNATURE_TEXT_HEIGHT) {
                ctx.break_page();
            }

            let name = ctx.register_image(decoded);
            let y = ctx.layout.y();
            ctx.page().image(&name, Rect::new(x, y, SIGNATURE_WIDTH, sig_h));
            ctx.layout.advance(sig_h + SIGNATURE_GAP);

            body_line(ctx, &record.supervisor_name, FontStyle::Bold);
            ctx.layout.advance(line_h);
            let role = if record.supervisor_role.trim().is_empty() {
                "Supervisor"
            } else {
                record.supervisor_role.as_str()
            };
            body_line(ctx, role, FontStyle::Regular);
        }
        None => {
            let block_h = SIGNATURE_BOX_HEIGHT + SIGNATURE_GAP + 2.0 * line_h;
            if ctx.layout.would_overflow(block_h) {
                ctx.break_page();
            }

            let y = ctx.layout.y();
            ctx.page().stroke_rect(
                Rect::new(x, y, SIGNATURE_BOX_WIDTH, SIGNATURE_BOX_HEIGHT),
                PLACEHOLDER_STROKE,
            );
            ctx.layout.advance(SIGNATURE_BOX_HEIGHT + SIGNATURE_GAP);
            body_line(ctx, SIGNATURE_BLANK_LINE, FontStyle::Regular);
            ctx.layout.advance(line_h);
            body_line(ctx, &record.supervisor_name, FontStyle::Regular);
            ctx.layout.advance(line_h);
            body_line(ctx, SIGNATURE_PENDING, FontStyle::Regular);
        }
    }

    ctx.layout.advance(2.0 * line_h);
    Ok(())
}

fn body_line(ctx: &mut RenderContext, text: &str, font: FontStyle) {
    let x = ctx.layout.geometry().margin_left;
    let y = ctx.layout.y();
    ctx.page()
        .text(text_op(text, x, y, TextAlign::Left, font, BODY_SIZE, Rgb::BLACK));
}
