mod common;

use acta_pdf::{DrawOp, Error, RenderOptions, page_label};
use pretty_assertions::assert_eq;

/// Page 600mm tall with no logo: content runs from 35 to 575. All five
/// tables fit on page 1 and end past y=224, so a 330mm photo container
/// (80 x 300 image + 30 caption) never fits after them, nor twice on a page.
fn tall_page_options() -> RenderOptions {
    let mut options = common::options();
    options.geometry.page_height = 600.0;
    options
}

#[test]
fn three_tall_photos_take_one_page_each() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut record = common::sample_record();
    for id in 1..=3 {
        record.add_photo(common::photo(id, common::png_fixture(100, 375), &format!("Foto {id}")));
    }

    let doc = acta_pdf::generate(&record, &tall_page_options()).unwrap();

    assert_eq!(doc.page_count(), 4);
    assert_eq!(doc.image_count(), 3);
    assert_eq!(
        common::footer_labels(&doc),
        vec!["Página 1 de 4", "Página 2 de 4", "Página 3 de 4", "Página 4 de 4"]
    );

    assert_eq!(common::page_with_text(&doc, "RESULTADOS Y OBSERVACIONES"), Some(0));
    assert_eq!(common::page_with_text(&doc, "EVIDENCIA FOTOGRÁFICA"), Some(0));
    for (page, caption) in [(1, "Foto 1"), (2, "Foto 2"), (3, "Foto 3")] {
        assert_eq!(common::page_with_text(&doc, caption), Some(page));
        assert_eq!(doc.pages()[page].images().count(), 1);
        let (_, rect) = doc.pages()[page].images().next().unwrap();
        assert_eq!((rect.w, rect.h), (80.0, 300.0));
        assert_eq!(rect.y, 40.0);
    }
    assert_eq!(common::page_with_text(&doc, "FIRMA DEL SUPERVISOR"), Some(3));
    assert_eq!(common::page_with_text(&doc, "(Pendiente de firma digital)"), Some(3));
}

#[test]
fn nothing_drawn_past_the_content_limit() {
    let mut record = common::sample_record();
    record.general_observations = "Asistencia alta y buena recepción del producto. ".repeat(15);
    record.brand_activation = "Muestreo en barra y zona VIP. ".repeat(10);
    for id in 1..=4 {
        record.add_photo(common::photo(id, common::png_fixture(60, 80), ""));
    }

    let options = common::options();
    let limit = options.geometry.bottom_limit();
    let doc = acta_pdf::generate(&record, &options).unwrap();
    assert!(doc.page_count() > 1);

    for (i, page) in doc.pages().iter().enumerate() {
        for op in page.ops() {
            let bottom = match op {
                DrawOp::Rect { rect, .. } | DrawOp::Image { rect, .. } => rect.bottom(),
                DrawOp::Line { y1, y2, .. } => y1.max(*y2),
                DrawOp::Text { y, .. } => *y,
            };
            assert!(bottom <= limit + 1e-3, "page {} op {op:?}", i + 1);
        }
    }
}

#[test]
fn footer_totals_match_final_page_count() {
    let mut record = common::sample_record();
    record.sales_report = "Reporte extenso de ventas por punto. ".repeat(15);
    record.general_observations = "Observaciones de cierre del evento. ".repeat(15);
    record.brand_moment = "Momento de marca durante el show. ".repeat(10);

    let mut doc = acta_pdf::generate(&record, &common::options()).unwrap();
    let total = doc.page_count();
    let expected: Vec<String> = (1..=total).map(|n| page_label(n, total)).collect();
    assert_eq!(common::footer_labels(&doc), expected);

    doc.stamp_footers();
    doc.stamp_footers();
    assert_eq!(common::footer_labels(&doc), expected);
    for page in doc.pages() {
        assert!(page.texts().any(|t| t == "Generado el: 01/05/2024"));
    }
}

#[test]
fn missing_required_fields_produce_no_document() {
    let mut record = common::sample_record();
    record.visit_location.clear();
    record.supervisor_name = "   ".into();

    match acta_pdf::generate(&record, &common::options()) {
        Err(Error::MissingFields(fields)) => {
            assert_eq!(fields, vec!["supervisorName", "visitLocation"])
        }
        other => panic!("expected missing fields, got {other:?}"),
    }
}

#[test]
fn geolocation_row_lists_resolved_address() {
    let mut record = common::sample_record();
    record.geolocation.lat = Some(4.60971);
    record.geolocation.lon = Some(-74.08175);
    record.approximate_address = Some("Calle 10 # 5-32".into());

    let doc = acta_pdf::generate(&record, &common::options()).unwrap();
    let texts: Vec<&str> = doc.pages()[0].texts().collect();
    assert!(texts.contains(&"Lat: 4.60971, Lon: -74.08175"));
    assert!(texts.contains(&"Dirección aproximada: Calle 10 # 5-32"));
    assert!(!texts.contains(&"No obtenida"));
}
