use crate::error::Error;
use crate::fonts::FontStyle;
use crate::model::TableRow;

use super::RenderContext;
use super::canvas::{Page, Rect, Rgb, Stroke, TextAlign, text_op};
use super::cursor::PageGeometry;
use super::layout::wrap_text;
use super::section::render_section_title;

const LABEL_SHARE: f32 = 0.35;
pub(crate) const CELL_PADDING: f32 = 3.0;
pub(crate) const TABLE_SPACING: f32 = 5.0;
pub(crate) const FONT_SIZE: f32 = 11.0;
pub(crate) const BAND_EVEN: Rgb = Rgb::gray(245);
pub(crate) const BAND_ODD: Rgb = Rgb::WHITE;
const BORDER: Stroke = Stroke {
    color: Rgb::gray(180),
    width: 0.3,
};

struct Columns {
    label_w: f32,
    value_w: f32,
}

impl Columns {
    fn for_geometry(g: &PageGeometry) -> Self {
        let content_w = g.content_width();
        Columns {
            label_w: content_w * LABEL_SHARE,
            value_w: content_w * (1.0 - LABEL_SHARE),
        }
    }

    fn label_text_w(&self) -> f32 {
        self.label_w - 2.0 * CELL_PADDING
    }

    fn value_text_w(&self) -> f32 {
        self.value_w - 2.0 * CELL_PADDING
    }
}

/// Rejects geometries whose table columns leave no room for text.
pub(crate) fn check_geometry(g: &PageGeometry) -> Result<(), Error> {
    let cols = Columns::for_geometry(g);
    if cols.label_text_w() <= 0.0 || cols.value_text_w() <= 0.0 {
        return Err(Error::Pdf(format!(
            "content width {:.1}mm leaves no room for table text",
            g.content_width()
        )));
    }
    if g.bottom_limit() <= g.margin_top {
        return Err(Error::Pdf(format!(
            "page height {:.1}mm leaves no room for content",
            g.page_height
        )));
    }
    Ok(())
}

struct RowLayout {
    height: f32,
    label_lines: Vec<String>,
    value_lines: Vec<String>,
}

fn row_layout(row: &TableRow, cols: &Columns, line_h: f32) -> RowLayout {
    let label_lines = wrap_text(&row.label, FontStyle::Bold, FONT_SIZE, cols.label_text_w());
    let value_lines = wrap_text(
        row.display_value(),
        FontStyle::Regular,
        FONT_SIZE,
        cols.value_text_w(),
    );
    let text_h = label_lines.len().max(value_lines.len()) as f32 * line_h;
    let height = (text_h + 2.0 * CELL_PADDING).max(line_h + 2.0 * CELL_PADDING);
    RowLayout {
        height,
        label_lines,
        value_lines,
    }
}

/// Lay out label/value rows under a section banner as a bordered, banded
/// table. Rows are never split; a row that does not fit closes the current
/// border box and continues on a new page.
pub(crate) fn render_table(ctx: &mut RenderContext, title: &str, rows: &[TableRow]) {
    render_section_title(ctx, title);
    if rows.is_empty() {
        return;
    }

    let g = *ctx.layout.geometry();
    let cols = Columns::for_geometry(&g);
    let line_h = g.line_height;
    let x = g.margin_left;
    let width = g.content_width();
    let divider_x = x + cols.label_w;

    let mut start_y = ctx.layout.y();

    for (ri, row) in rows.iter().enumerate() {
        let layout = row_layout(row, &cols, line_h);
        let row_h = layout.height;

        if ctx.layout.would_overflow(row_h) {
            close_border(ctx, x, start_y, width);
            ctx.break_page();
            start_y = ctx.layout.y();
        }

        let row_top = ctx.layout.y();
        log::debug!(
            "TABLE {title:?} row={ri} row_h={row_h:.2} lines={}/{} page={} y={row_top:.2}",
            layout.label_lines.len(),
            layout.value_lines.len(),
            ctx.layout.page_index() + 1,
        );

        let band = if ri % 2 == 0 { BAND_EVEN } else { BAND_ODD };
        let is_last = ri + 1 == rows.len();

        let page = ctx.page();
        page.fill_rect(Rect::new(x, row_top, width, row_h), band);
        page.line(divider_x, row_top, divider_x, row_top + row_h, BORDER);
        if !is_last {
            page.line(x, row_top + row_h, x + width, row_top + row_h, BORDER);
        }
        paint_cell_lines(page, &layout.label_lines, FontStyle::Bold, x + CELL_PADDING, row_top, row_h, line_h);
        paint_cell_lines(
            page,
            &layout.value_lines,
            FontStyle::Regular,
            divider_x + CELL_PADDING,
            row_top,
            row_h,
            line_h,
        );

        ctx.layout.advance(row_h);
    }

    close_border(ctx, x, start_y, width);
    ctx.layout.advance(TABLE_SPACING);
}

/// Outer border from `start_y` down to the cursor. Nothing is drawn when no
/// row landed on this page.
fn close_border(ctx: &mut RenderContext, x: f32, start_y: f32, width: f32) {
    let close_h = ctx.layout.y() - start_y;
    if close_h > 0.0 {
        ctx.page().stroke_rect(Rect::new(x, start_y, width, close_h), BORDER);
    }
}

/// One line sits centred in the row; several are stacked from the top.
fn paint_cell_lines(
    page: &mut Page,
    lines: &[String],
    font: FontStyle,
    x: f32,
    row_top: f32,
    row_h: f32,
    line_h: f32,
) {
    if let [line] = lines {
        let baseline = row_top + row_h / 2.0 + line_h / 2.0 - 2.0;
        page.text(text_op(line, x, baseline, TextAlign::Left, font, FONT_SIZE, Rgb::BLACK));
        return;
    }
    for (i, line) in lines.iter().enumerate() {
        let baseline = row_top + CELL_PADDING + i as f32 * line_h + line_h;
        page.text(text_op(line, x, baseline, TextAlign::Left, font, FONT_SIZE, Rgb::BLACK));
    }
}
