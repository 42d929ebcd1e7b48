use crate::fonts::FontStyle;

/// Greedy word wrap of `text` into lines no wider than `max_width` mm.
/// Explicit newlines always break; a word wider than the whole line is
/// split between characters. Blank paragraphs yield an empty line.
pub(crate) fn wrap_text(text: &str, font: FontStyle, font_size: f32, max_width: f32) -> Vec<String> {
    debug_assert!(max_width > 0.0, "wrap width must be positive");
    let space_w = font.text_width_mm(" ", font_size);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_w: f32 = 0.0;

        for word in paragraph.split_whitespace() {
            let word_w = font.text_width_mm(word, font_size);
            let proposed_w = if current.is_empty() {
                word_w
            } else {
                current_w + space_w + word_w
            };

            if proposed_w <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed_w;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            }

            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
            } else {
                for piece in split_long_word(word, font, font_size, max_width) {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                    current_w = font.text_width_mm(&piece, font_size);
                    current = piece;
                }
            }
        }

        lines.push(current);
    }

    lines
}

fn split_long_word(word: &str, font: FontStyle, font_size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_w: f32 = 0.0;
    for ch in word.chars() {
        let ch_w = font.char_width_1000(ch) * font_size / 1000.0 * crate::fonts::MM_PER_PT;
        if !piece.is_empty() && piece_w + ch_w > max_width {
            pieces.push(std::mem::take(&mut piece));
            piece_w = 0.0;
        }
        piece.push(ch);
        piece_w += ch_w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}
