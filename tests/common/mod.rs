#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use acta_pdf::{Document, DrawOp, PhotoEvidence, Record, RenderOptions};
use chrono::{DateTime, NaiveDate, Utc};

pub fn footer_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

pub fn options() -> RenderOptions {
    RenderOptions {
        generated_on: footer_date(),
        ..RenderOptions::default()
    }
}

pub fn captured_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_550_400, 0).unwrap()
}

/// Record with every required field and short descriptive values.
pub fn sample_record() -> Record {
    Record {
        supervisor_name: "Ana Pérez".into(),
        supervisor_role: "Coordinadora".into(),
        visit_date: "2024-05-01".into(),
        visit_location: "Teatro Colón".into(),
        artist: "Orquesta 21:00".into(),
        sponsorship_value: "$ 5.000.000".into(),
        sales_visibility_exclusivity: "Sí".into(),
        product_availability: "Disponible".into(),
        purchase_commitment: "Cumplido".into(),
        capacity: "1200".into(),
        brand_visibility: "Alta".into(),
        brand_activation: "Muestreo".into(),
        brand_moment: "Intermedio".into(),
        sales_report: "Ventas según lo esperado".into(),
        general_observations: "Sin novedades".into(),
        ..Default::default()
    }
}

pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn photo(id: u64, image: Vec<u8>, caption: &str) -> PhotoEvidence {
    PhotoEvidence::new(id, image, caption, captured_at())
}

/// "Página N de T" strings from every page's footer, in page order.
pub fn footer_labels(doc: &Document) -> Vec<String> {
    doc.pages()
        .iter()
        .flat_map(|p| p.footer_ops())
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } if text.starts_with("Página") => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Index of the first page containing `text` in its body.
pub fn page_with_text(doc: &Document, text: &str) -> Option<usize> {
    doc.pages().iter().position(|p| p.texts().any(|t| t == text))
}

/// Generated PDFs are kept under tests/output/ for manual inspection.
pub fn output_path(name: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}
