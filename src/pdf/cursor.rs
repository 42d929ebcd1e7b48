/// Fixed page geometry in millimetres, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Band above the bottom margin kept free for the footer.
    pub footer_height: f32,
    pub line_height: f32,
}

impl PageGeometry {
    /// A4 portrait, 15 mm margins.
    pub const fn a4() -> Self {
        PageGeometry {
            page_width: 210.0,
            page_height: 297.0,
            margin_top: 15.0,
            margin_bottom: 15.0,
            margin_left: 15.0,
            margin_right: 15.0,
            footer_height: 10.0,
            line_height: 7.0,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn right_edge(&self) -> f32 {
        self.page_width - self.margin_right
    }

    /// Lowest y any forward-pass content may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom - self.footer_height
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::a4()
    }
}

/// Vertical write position during the forward pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    pub y: f32,
    /// 0-based index of the page being drawn.
    pub page_index: usize,
}

/// Cursor plus the geometry it is measured against. Answers overflow
/// questions only; breaking the page is the caller's job.
#[derive(Clone, Debug)]
pub struct LayoutState {
    geometry: PageGeometry,
    cursor: LayoutCursor,
}

impl LayoutState {
    pub fn new(geometry: PageGeometry) -> Self {
        LayoutState {
            geometry,
            cursor: LayoutCursor {
                y: geometry.margin_top,
                page_index: 0,
            },
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn current_position(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn y(&self) -> f32 {
        self.cursor.y
    }

    pub fn page_index(&self) -> usize {
        self.cursor.page_index
    }

    pub fn advance(&mut self, height: f32) {
        self.cursor.y += height;
    }

    /// True when `height` more content starting at the cursor would cross
    /// the bottom limit.
    pub fn would_overflow(&self, height: f32) -> bool {
        self.cursor.y + height > self.geometry.bottom_limit()
    }

    /// Move to a fresh page; `y` is where content may start on it.
    pub(crate) fn start_page(&mut self, page_index: usize, y: f32) {
        self.cursor = LayoutCursor { y, page_index };
    }

    pub(crate) fn set_y(&mut self, y: f32) {
        self.cursor.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_content_box() {
        let g = PageGeometry::a4();
        assert_eq!(g.content_width(), 180.0);
        assert_eq!(g.bottom_limit(), 272.0);
        assert_eq!(g.right_edge(), 195.0);
    }

    #[test]
    fn overflow_is_strictly_past_the_bottom_limit() {
        let mut state = LayoutState::new(PageGeometry::a4());
        state.set_y(200.0);
        assert!(!state.would_overflow(72.0));
        assert!(state.would_overflow(72.5));
    }

    #[test]
    fn advance_moves_cursor_by_exact_height() {
        let mut state = LayoutState::new(PageGeometry::a4());
        let start = state.current_position();
        state.advance(13.0);
        assert_eq!(state.y(), start.y + 13.0);
        assert_eq!(state.page_index(), 0);

        state.start_page(1, 35.0);
        assert_eq!(
            state.current_position(),
            LayoutCursor {
                y: 35.0,
                page_index: 1
            }
        );
    }
}
