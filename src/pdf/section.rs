use crate::fonts::FontStyle;

use super::RenderContext;
use super::canvas::{Rect, Rgb, Stroke, TextAlign, text_op};

pub(crate) const BAND_HEIGHT: f32 = 14.0;
pub(crate) const BAND_SPACING: f32 = 7.0;
const BAND_FILL: Rgb = Rgb(240, 240, 250);
const TITLE_SIZE: f32 = 12.0;
const TITLE_INSET: f32 = 5.0;
/// Baseline offset from the band top; puts 12pt caps in the middle of the band.
const TITLE_BASELINE: f32 = 8.0;

/// Paint a titled banner at the cursor, breaking the page first if the band
/// does not fit, then move past it.
pub(crate) fn render_section_title(ctx: &mut RenderContext, title: &str) {
    if ctx.layout.would_overflow(BAND_HEIGHT) {
        ctx.break_page();
    }

    let g = *ctx.layout.geometry();
    let y = ctx.layout.y();
    let rule = Stroke {
        color: Rgb::PRIMARY,
        width: 0.5,
    };

    let page = ctx.page();
    page.fill_rect(Rect::new(g.margin_left, y, g.content_width(), BAND_HEIGHT), BAND_FILL);
    page.line(g.margin_left, y, g.right_edge(), y, rule);
    page.line(g.margin_left, y + BAND_HEIGHT, g.right_edge(), y + BAND_HEIGHT, rule);
    page.text(text_op(
        title,
        g.margin_left + TITLE_INSET,
        y + TITLE_BASELINE,
        TextAlign::Left,
        FontStyle::Bold,
        TITLE_SIZE,
        Rgb::PRIMARY,
    ));

    ctx.layout.advance(BAND_HEIGHT + BAND_SPACING);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::RenderOptions;
    use crate::pdf::canvas::DrawOp;

    #[test]
    fn banner_advances_by_band_plus_spacing() {
        let options = RenderOptions::for_tests();
        let mut ctx = RenderContext::new(&options);
        let before = ctx.layout.y();
        render_section_title(&mut ctx, "INFORMACIÓN GENERAL");
        assert_eq!(ctx.layout.y(), before + BAND_HEIGHT + BAND_SPACING);
        assert!(ctx.page().texts().any(|t| t == "INFORMACIÓN GENERAL"));
    }

    #[test]
    fn banner_that_would_overflow_moves_to_next_page() {
        let options = RenderOptions::for_tests();
        let mut ctx = RenderContext::new(&options);
        let limit = ctx.layout.geometry().bottom_limit();
        ctx.layout.set_y(limit - BAND_HEIGHT + 0.5);

        render_section_title(&mut ctx, "GEOLOCALIZACIÓN");

        assert_eq!(ctx.pages.len(), 2);
        assert_eq!(ctx.layout.page_index(), 1);
        let band = ctx.pages[1].ops().iter().find_map(|op| match op {
            DrawOp::Rect { rect, fill: Some(fill), .. } if *fill == BAND_FILL => Some(*rect),
            _ => None,
        });
        assert_eq!(band.map(|r| r.y), Some(ctx.content_top()));
    }
}
