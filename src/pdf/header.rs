use chrono::NaiveDate;

use crate::fonts::FontStyle;

use super::canvas::{DrawOp, Page, Rect, Rgb, Stroke, TextAlign, text_op};
use super::cursor::PageGeometry;

pub(crate) const BANNER_HEIGHT: f32 = 30.0;
const TITLE_BASELINE: f32 = 18.0;
const TITLE_SIZE: f32 = 18.0;
pub(crate) const LOGO_TOP: f32 = 35.0;
pub(crate) const LOGO_WIDTH: f32 = 60.0;
const LOGO_RULE_GAP: f32 = 5.0;
const LOGO_CONTENT_GAP: f32 = 15.0;

const FOOTER_RULE_GAP: f32 = 5.0;
const FOOTER_SIZE: f32 = 9.0;
const FOOTER_TEXT: Rgb = Rgb::gray(100);

const RULE: Stroke = Stroke {
    color: Rgb::PRIMARY,
    width: 0.5,
};

/// Registered logo XObject and its display size.
#[derive(Clone, Debug)]
pub(crate) struct Logo {
    pub(crate) name: String,
    pub(crate) height: f32,
}

/// Paint the banner, title and logo at the top of `page`. Returns the y at
/// which body content starts below the header.
pub(crate) fn paint_header(
    page: &mut Page,
    g: &PageGeometry,
    title: &str,
    logo: Option<&Logo>,
) -> f32 {
    page.fill_rect(Rect::new(0.0, 0.0, g.page_width, BANNER_HEIGHT), Rgb::PRIMARY);
    page.text(text_op(
        title,
        g.page_width / 2.0,
        TITLE_BASELINE,
        TextAlign::Center,
        FontStyle::Bold,
        TITLE_SIZE,
        Rgb::WHITE,
    ));

    let Some(logo) = logo else {
        return LOGO_TOP;
    };

    let logo_x = (g.page_width - LOGO_WIDTH) / 2.0;
    page.image(&logo.name, Rect::new(logo_x, LOGO_TOP, LOGO_WIDTH, logo.height));

    let rule_y = LOGO_TOP + logo.height + LOGO_RULE_GAP;
    page.line(g.margin_left, rule_y, g.right_edge(), rule_y, RULE);

    LOGO_TOP + logo.height + LOGO_CONTENT_GAP
}

/// Footer layer for one page: rule, generation date and "Página N de TOTAL".
pub(crate) fn footer_ops(
    g: &PageGeometry,
    page_number: usize,
    total_pages: usize,
    generated_on: NaiveDate,
) -> Vec<DrawOp> {
    let baseline = g.page_height - g.margin_bottom;
    let rule_y = baseline - FOOTER_RULE_GAP;
    vec![
        DrawOp::Line {
            x1: g.margin_left,
            y1: rule_y,
            x2: g.right_edge(),
            y2: rule_y,
            stroke: RULE,
        },
        text_op(
            &format!("Generado el: {}", generated_on.format("%d/%m/%Y")),
            g.margin_left,
            baseline,
            TextAlign::Left,
            FontStyle::Regular,
            FOOTER_SIZE,
            FOOTER_TEXT,
        ),
        text_op(
            &page_label(page_number, total_pages),
            g.right_edge(),
            baseline,
            TextAlign::Right,
            FontStyle::Regular,
            FOOTER_SIZE,
            FOOTER_TEXT,
        ),
    ]
}

pub fn page_label(page_number: usize, total_pages: usize) -> String {
    format!("Página {page_number} de {total_pages}")
}
