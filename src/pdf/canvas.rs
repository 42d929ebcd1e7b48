use crate::fonts::FontStyle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const PRIMARY: Rgb = Rgb(25, 118, 210);

    pub const fn gray(level: u8) -> Rgb {
        Rgb(level, level, level)
    }

    pub(crate) fn components(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// Axis-aligned box in millimetres, `y` measured down from the page top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One recorded drawing primitive. Coordinates are page millimetres.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
    },
    /// `x` is the resolved left edge; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontStyle,
        size: f32,
        color: Rgb,
    },
    Image {
        name: String,
        rect: Rect,
    },
}

/// One output page: the body drawn during the forward pass and a footer
/// layer that the backward pass replaces wholesale.
#[derive(Clone, Debug, Default)]
pub struct Page {
    ops: Vec<DrawOp>,
    footer: Vec<DrawOp>,
}

impl Page {
    pub fn new() -> Self {
        Page::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn footer_ops(&self) -> &[DrawOp] {
        &self.footer
    }

    /// Body ops followed by footer ops, in paint order.
    pub fn all_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().chain(self.footer.iter())
    }

    /// Every text string on the page, footer included.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.all_ops().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &Rect)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { name, rect } => Some((name.as_str(), rect)),
            _ => None,
        })
    }

    pub(crate) fn replace_footer(&mut self, footer: Vec<DrawOp>) {
        self.footer = footer;
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: Some(color),
            stroke: None,
        });
    }

    pub(crate) fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: None,
            stroke: Some(stroke),
        });
    }

    pub(crate) fn fill_stroke_rect(&mut self, rect: Rect, fill: Rgb, stroke: Stroke) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: Some(fill),
            stroke: Some(stroke),
        });
    }

    pub(crate) fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
    }

    pub(crate) fn text(&mut self, op: DrawOp) {
        debug_assert!(matches!(op, DrawOp::Text { .. }));
        self.ops.push(op);
    }

    pub(crate) fn image(&mut self, name: &str, rect: Rect) {
        self.ops.push(DrawOp::Image {
            name: name.to_string(),
            rect,
        });
    }
}

/// Build a text op, resolving alignment against `x` with the font metrics.
pub(crate) fn text_op(
    text: &str,
    x: f32,
    y: f32,
    align: TextAlign,
    font: FontStyle,
    size: f32,
    color: Rgb,
) -> DrawOp {
    let width = font.text_width_mm(text, size);
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    };
    DrawOp::Text {
        x: left,
        y,
        text: text.to_string(),
        font,
        size,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_aligned_text_ends_at_anchor() {
        let op = text_op(
            "Página 1 de 2",
            195.0,
            282.0,
            TextAlign::Right,
            FontStyle::Regular,
            9.0,
            Rgb::gray(100),
        );
        let DrawOp::Text { x, text, size, .. } = &op else {
            panic!("not a text op");
        };
        let width = FontStyle::Regular.text_width_mm(text, *size);
        assert!((x + width - 195.0).abs() < 1e-3);
    }

    #[test]
    fn footer_layer_is_replaced_not_appended() {
        let mut page = Page::new();
        page.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgb::WHITE);
        page.replace_footer(vec![text_op(
            "a",
            0.0,
            0.0,
            TextAlign::Left,
            FontStyle::Regular,
            9.0,
            Rgb::BLACK,
        )]);
        page.replace_footer(vec![text_op(
            "b",
            0.0,
            0.0,
            TextAlign::Left,
            FontStyle::Regular,
            9.0,
            Rgb::BLACK,
        )]);
        assert_eq!(page.texts().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(page.ops().len(), 1);
    }
}
