mod common;

use pretty_assertions::assert_eq;

fn pdf_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn jpeg_photos_are_embedded_without_recompression() {
    let mut record = common::sample_record();
    let jpeg = common::jpeg_fixture(64, 48);
    record.add_photo(common::photo(1, jpeg.clone(), "Barra"));
    record.add_photo(common::photo(2, common::png_fixture(64, 48), "Tarima"));

    let doc = acta_pdf::generate(&record, &common::options()).unwrap();
    let bytes = doc.to_pdf_bytes().unwrap();
    let text = pdf_text(&bytes);

    assert!(bytes.starts_with(b"%PDF-"));
    assert!(text.contains("/DCTDecode"));
    assert!(text.contains("/FlateDecode"));
    assert!(bytes.windows(jpeg.len()).any(|w| w == jpeg.as_slice()));
    assert!(text.contains("/WinAnsiEncoding"));
    assert!(text.contains(&format!("/Count {}", doc.page_count())));

    std::fs::write(common::output_path("photos.pdf"), &bytes).unwrap();
}

#[test]
fn generate_to_file_uses_the_report_name() {
    let tmp = tempfile::tempdir().unwrap();
    let record = common::sample_record();

    let path = acta_pdf::generate_to_file(&record, &common::options(), tmp.path()).unwrap();

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Acta_Supervisión_2024-05-01_Teatro_Col_n.pdf")
    );
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn logo_is_drawn_on_every_page() {
    let mut record = common::sample_record();
    record.general_observations = "Observaciones de cierre del evento. ".repeat(15);
    let mut options = common::options();
    options.logo = Some(common::png_fixture(200, 50));

    let doc = acta_pdf::generate(&record, &options).unwrap();
    assert!(doc.page_count() > 1);
    for page in doc.pages() {
        let (_, rect) = page.images().next().expect("logo");
        assert_eq!((rect.x, rect.y, rect.w, rect.h), (75.0, 35.0, 60.0, 15.0));
    }
    assert_eq!(doc.image_count(), 1);
}
