mod canvas;
mod cursor;
mod header;
mod image;
mod layout;
mod section;
mod table;

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use pdf_writer::{Content, Filter, Name, Pdf, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{MM_PER_PT, register_fonts, to_winansi_bytes};
use crate::model::{Record, TableRow};

pub use canvas::{DrawOp, Page, Rect, Rgb, Stroke, TextAlign};
pub use cursor::{LayoutCursor, LayoutState, PageGeometry};
pub use header::page_label;

use self::header::{LOGO_WIDTH, Logo, footer_ops, paint_header};
use self::image::{DecodedImage, ImageData, decode_image, render_photos, render_signature};
use self::section::BAND_HEIGHT;
use self::table::{check_geometry, render_table};

pub const DEFAULT_TITLE: &str = "INFORME DE SUPERVISIÓN DE EVENTO";

/// Everything about the output that is not part of the record itself.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub geometry: PageGeometry,
    /// Banner text on every page.
    pub title: String,
    /// Encoded logo image drawn under the banner.
    pub logo: Option<Vec<u8>>,
    /// Date printed in every footer.
    pub generated_on: NaiveDate,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            geometry: PageGeometry::a4(),
            title: DEFAULT_TITLE.to_string(),
            logo: None,
            generated_on: Local::now().date_naive(),
        }
    }
}

impl RenderOptions {
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        RenderOptions {
            generated_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ..RenderOptions::default()
        }
    }
}

/// State of one in-flight generation: the cursor, the pages drawn so far
/// and the images they reference.
pub(crate) struct RenderContext<'a> {
    options: &'a RenderOptions,
    pub(crate) layout: LayoutState,
    pub(crate) pages: Vec<Page>,
    images: Vec<(String, DecodedImage)>,
    logo: Option<Logo>,
    content_top: f32,
}

impl<'a> RenderContext<'a> {
    /// Opens the first page with its header already painted.
    pub(crate) fn new(options: &'a RenderOptions) -> Self {
        let geometry = options.geometry;
        let mut ctx = RenderContext {
            options,
            layout: LayoutState::new(geometry),
            pages: Vec::new(),
            images: Vec::new(),
            logo: None,
            content_top: geometry.margin_top,
        };

        if let Some(bytes) = options.logo.as_deref() {
            match decode_image(bytes) {
                Ok(decoded) => {
                    let height = decoded.display_height(LOGO_WIDTH);
                    let name = ctx.register_image(decoded);
                    ctx.logo = Some(Logo { name, height });
                }
                Err(e) => log::warn!("Logo not drawn: {e}"),
            }
        }

        ctx.open_page();
        ctx
    }

    /// Page under the cursor.
    pub(crate) fn page(&mut self) -> &mut Page {
        let index = self.layout.page_index();
        &mut self.pages[index]
    }

    /// First y below the header; identical on every page.
    pub(crate) fn content_top(&self) -> f32 {
        self.content_top
    }

    pub(crate) fn break_page(&mut self) {
        log::debug!(
            "PAGE BREAK at y={:.2} on page {}",
            self.layout.y(),
            self.layout.page_index() + 1
        );
        self.open_page();
    }

    fn open_page(&mut self) {
        let mut page = Page::new();
        self.content_top = paint_header(
            &mut page,
            &self.options.geometry,
            &self.options.title,
            self.logo.as_ref(),
        );
        self.pages.push(page);
        self.layout.start_page(self.pages.len() - 1, self.content_top);
    }

    /// Keeps `image` for serialization and returns the name pages draw it by.
    pub(crate) fn register_image(&mut self, image: DecodedImage) -> String {
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push((name.clone(), image));
        name
    }

    fn finish(self, file_name: String) -> Document {
        Document {
            pages: self.pages,
            images: self.images,
            geometry: self.options.geometry,
            title: self.options.title.clone(),
            generated_on: self.options.generated_on,
            file_name,
        }
    }
}

/// Lay out `record` page by page, then stamp "Página N de TOTAL" footers
/// once the page count is known.
pub fn render(record: &Record, options: &RenderOptions) -> Result<Document, Error> {
    let t0 = Instant::now();
    check_geometry(&options.geometry)?;

    let mut ctx = RenderContext::new(options);
    if ctx.content_top() + BAND_HEIGHT > options.geometry.bottom_limit() {
        return Err(Error::Pdf(format!(
            "header ends at {:.1}mm, past the content limit {:.1}mm",
            ctx.content_top(),
            options.geometry.bottom_limit()
        )));
    }

    for (title, rows) in report_sections(record) {
        render_table(&mut ctx, title, &rows);
    }
    render_photos(&mut ctx, &record.photos);
    render_signature(&mut ctx, record)?;
    let t_layout = t0.elapsed();

    let mut doc = ctx.finish(record.file_name());
    doc.stamp_footers();
    let t_total = t0.elapsed();

    log::info!(
        "Render: {} pages, {} images, layout={:.1}ms, footers={:.1}ms",
        doc.page_count(),
        doc.images.len(),
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
    );

    Ok(doc)
}

fn report_sections(r: &Record) -> [(&'static str, Vec<TableRow>); 5] {
    [
        (
            "INFORMACIÓN GENERAL",
            vec![
                TableRow::new("Fecha Visita:", &r.visit_date),
                TableRow::new("Lugar Visita:", &r.visit_location),
                TableRow::new("Supervisor:", &r.supervisor_name),
                TableRow::new("Cargo:", &r.supervisor_role),
                TableRow::new("Valor Patrocinio:", &r.sponsorship_value),
            ],
        ),
        (
            "GEOLOCALIZACIÓN",
            vec![TableRow::new("Ubicación:", &location_text(r))],
        ),
        (
            "DETALLES DEL EVENTO",
            vec![
                TableRow::new("Exclusividad Ventas/Visibilidad:", &r.sales_visibility_exclusivity),
                TableRow::new("Nombre del Artista (s) y Hora de Presentación:", &r.artist),
                TableRow::new("Codificación y/o Disponibilidad Producto:", &r.product_availability),
                TableRow::new("Compromiso Compra:", &r.purchase_commitment),
                TableRow::new("Aforo:", &r.capacity),
            ],
        ),
        (
            "ACTIVACIONES Y VISIBILIDAD",
            vec![
                TableRow::new("Visibilidad Marca:", &r.brand_visibility),
                TableRow::new("Activación Marca:", &r.brand_activation),
                TableRow::new("Momento Marca:", &r.brand_moment),
            ],
        ),
        (
            "RESULTADOS Y OBSERVACIONES",
            vec![
                TableRow::new("Reporte de Ventas:", &r.sales_report),
                TableRow::new("Observaciones Generales:", &r.general_observations),
            ],
        ),
    ]
}

/// Value of the single geolocation row. Zero coordinates print as not
/// obtained.
fn location_text(r: &Record) -> String {
    let Some((lat, lon)) = r.geolocation.acquired_coordinates() else {
        return "No obtenida".to_string();
    };

    let mut text = format!("Lat: {lat:.5}, Lon: {lon:.5}");
    if let Some(at) = r.geolocation.captured_at() {
        let _ = write!(
            text,
            "\nTimestamp: {}",
            at.with_timezone(&Local).format("%d/%m/%Y, %H:%M:%S")
        );
    }

    let extras = [
        ("Dirección aproximada", r.approximate_address.as_deref()),
        ("Barrio", r.neighborhood.as_deref()),
        ("Dirección detallada", r.manual_address.as_deref()),
    ];
    for (label, value) in extras {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            let _ = write!(text, "\n{label}: {value}");
        }
    }

    if r.location_verified {
        if let Some(code) = r.verification_code.as_deref() {
            let _ = write!(text, "\nCódigo de verificación: {code}");
        }
    }
    text
}

/// A laid-out report: pages of recorded drawing ops plus the images they use.
#[derive(Clone, Debug)]
pub struct Document {
    pages: Vec<Page>,
    images: Vec<(String, DecodedImage)>,
    geometry: PageGeometry,
    title: String,
    generated_on: NaiveDate,
    file_name: String,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Suggested download name, derived from the visit date and location.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Rewrite every page's footer layer against the current page count.
    /// Running it again leaves the document unchanged.
    pub fn stamp_footers(&mut self) {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.replace_footer(footer_ops(&self.geometry, i + 1, total, self.generated_on));
        }
    }

    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>, Error> {
        let t0 = Instant::now();
        if self.pages.is_empty() {
            return Err(Error::Pdf("document has no pages".into()));
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let font_pairs = register_fonts(&mut pdf, &mut alloc);
        let image_xobjects: Vec<(&str, Ref)> = self
            .images
            .iter()
            .map(|(name, img)| (name.as_str(), embed_image(&mut pdf, &mut alloc, img)))
            .collect();
        let t_resources = t0.elapsed();

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        let page_h = to_pt(self.geometry.page_height);
        for (page, &content_id) in self.pages.iter().zip(&content_ids) {
            let mut content = Content::new();
            for op in page.all_ops() {
                write_op(&mut content, op, page_h);
            }
            let raw = content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let media_box = pdf_writer::Rect::new(0.0, 0.0, to_pt(self.geometry.page_width), page_h);
        for (&page_id, &content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = pdf.page(page_id);
            page.media_box(media_box)
                .parent(pages_id)
                .contents(content_id);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        pdf.document_info(info_id)
            .title(TextStr(&self.title))
            .producer(TextStr(concat!("acta-pdf ", env!("CARGO_PKG_VERSION"))));

        let bytes = pdf.finish();
        let t_total = t0.elapsed();
        log::info!(
            "Serialize: resources={:.1}ms, pages={:.1}ms (output {} bytes)",
            t_resources.as_secs_f64() * 1000.0,
            (t_total - t_resources).as_secs_f64() * 1000.0,
            bytes.len(),
        );
        Ok(bytes)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let bytes = self.to_pdf_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn embed_image(pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref, img: &DecodedImage) -> Ref {
    let xobj_ref = alloc();
    let (w, h) = (img.pixel_width as i32, img.pixel_height as i32);

    match &img.data {
        ImageData::Jpeg { data, gray } => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w);
            xobj.height(h);
            if *gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
        }
        ImageData::Raw { rgb, alpha } => {
            let smask_ref = alpha.as_ref().map(|alpha| {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed);
                mask.filter(Filter::FlateDecode);
                mask.width(w);
                mask.height(h);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask_ref
            });

            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(rgb, 6);
            let mut xobj = pdf.image_xobject(xobj_ref, &compressed);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w);
            xobj.height(h);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }

    xobj_ref
}

/// Emit one recorded op, flipping from top-left millimetres to PDF points.
fn write_op(content: &mut Content, op: &DrawOp, page_h: f32) {
    match op {
        DrawOp::Rect { rect, fill, stroke } => {
            content.save_state();
            if let Some(fill) = fill {
                let (r, g, b) = fill.components();
                content.set_fill_rgb(r, g, b);
            }
            if let Some(stroke) = stroke {
                let (r, g, b) = stroke.color.components();
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(to_pt(stroke.width));
            }
            content.rect(
                to_pt(rect.x),
                page_h - to_pt(rect.bottom()),
                to_pt(rect.w),
                to_pt(rect.h),
            );
            match (fill, stroke) {
                (Some(_), Some(_)) => content.fill_nonzero_and_stroke(),
                (Some(_), None) => content.fill_nonzero(),
                (None, Some(_)) => content.stroke(),
                (None, None) => content.end_path(),
            };
            content.restore_state();
        }
        DrawOp::Line { x1, y1, x2, y2, stroke } => {
            let (r, g, b) = stroke.color.components();
            content.save_state();
            content.set_stroke_rgb(r, g, b);
            content.set_line_width(to_pt(stroke.width));
            content.move_to(to_pt(*x1), page_h - to_pt(*y1));
            content.line_to(to_pt(*x2), page_h - to_pt(*y2));
            content.stroke();
            content.restore_state();
        }
        DrawOp::Text { x, y, text, font, size, color } => {
            let (r, g, b) = color.components();
            let bytes = to_winansi_bytes(text);
            content.save_state();
            content.set_fill_rgb(r, g, b);
            content
                .begin_text()
                .set_font(Name(font.pdf_name().as_bytes()), *size)
                .set_text_matrix([1.0, 0.0, 0.0, 1.0, to_pt(*x), page_h - to_pt(*y)])
                .show(Str(&bytes))
                .end_text();
            content.restore_state();
        }
        DrawOp::Image { name, rect } => {
            content.save_state();
            content.transform([
                to_pt(rect.w),
                0.0,
                0.0,
                to_pt(rect.h),
                to_pt(rect.x),
                page_h - to_pt(rect.bottom()),
            ]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();
        }
    }
}
