use pdf_writer::{Name, Pdf, Ref};

/// The two standard-14 faces the report uses. Neither is embedded; viewers
/// supply them, so only their advance widths are needed for layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    pub(crate) const ALL: [FontStyle; 2] = [FontStyle::Regular, FontStyle::Bold];

    pub(crate) fn pdf_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }

    fn base_font(self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"Helvetica",
            FontStyle::Bold => b"Helvetica-Bold",
        }
    }

    fn widths_1000(self) -> &'static [f32] {
        match self {
            FontStyle::Regular => &HELVETICA_WIDTHS,
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of one character in 1000-units.
    pub(crate) fn char_width_1000(self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000()[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    /// Width of `text` in points at `font_size`.
    pub fn text_width_pt(self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Width of `text` in millimetres at `font_size` points.
    pub fn text_width_mm(self, text: &str, font_size: f32) -> f32 {
        self.text_width_pt(text, font_size) * MM_PER_PT
    }
}

pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
const HELVETICA_WIDTHS: [f32; 224] = helvetica_widths(false);
const HELVETICA_BOLD_WIDTHS: [f32; 224] = helvetica_widths(true);

const fn helvetica_widths(bold: bool) -> [f32; 224] {
    let mut out = [0.0f32; 224];
    let mut i = 0usize;
    while i < 224 {
        let b = (i + 32) as u8;
        out[i] = match (b, bold) {
            (32, _) => 278.0,                                // space
            (33..=47, _) => 333.0,                           // punctuation
            (48..=57, _) => 556.0,                           // digits
            (58..=64, _) => 333.0,                           // more punctuation
            (73 | 74, false) => 278.0,                       // I J (narrow uppercase)
            (73, true) => 278.0,
            (74, true) => 556.0,
            (77, _) => 833.0,                                // M (wide)
            (87, _) => 944.0,                                // W
            (65..=90, false) => 667.0,                       // uppercase A-Z (average)
            (65..=90, true) => 722.0,
            (91..=96, _) => 333.0,                           // brackets etc.
            (102 | 105 | 106 | 108 | 116, false) => 278.0,   // narrow lowercase: f i j l t
            (102 | 105 | 106 | 108 | 116, true) => 333.0,
            (109, false) => 833.0,                           // m (wide)
            (109, true) => 889.0,
            (119, false) => 722.0,                           // w
            (119, true) => 778.0,
            (114, false) => 333.0,                           // r
            (114, true) => 389.0,
            (97..=122, false) => 556.0,                      // lowercase a-z (average)
            (97..=122, true) => 611.0,
            (192..=222, false) => 667.0,                     // accented uppercase
            (192..=222, true) => 722.0,
            (223..=255, false) => 556.0,                     // accented lowercase
            (223..=255, true) => 611.0,
            (_, false) => 556.0,
            (_, true) => 611.0,
        };
        i += 1;
    }
    out
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page become `?`.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            b => b,
        })
        .collect()
}

/// Write the Type1 font dictionaries and return `(resource name, ref)` pairs.
pub(crate) fn register_fonts(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
) -> Vec<(&'static str, Ref)> {
    FontStyle::ALL
        .iter()
        .map(|&style| {
            let font_ref = alloc();
            pdf.type1_font(font_ref)
                .base_font(Name(style.base_font()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
            (style.pdf_name(), font_ref)
        })
        .collect()
}
