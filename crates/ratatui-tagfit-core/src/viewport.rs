/// Scroll position of a rectangular viewport over larger content.
///
/// All setters clamp, so `x`/`y` never point past the last full page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportState {
    pub x: u32,
    pub y: u32,
    pub viewport_w: u16,
    pub viewport_h: u16,
    pub content_w: u32,
    pub content_h: u32,
}

impl ViewportState {
    pub fn set_viewport(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
        self.clamp();
    }

    pub fn set_content(&mut self, w: u32, h: u32) {
        self.content_w = w;
        self.content_h = h;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        let max_y = self.max_y();
        let max_x = self.max_x();
        self.y = self.y.min(max_y);
        self.x = self.x.min(max_x);
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        let next = self.x as i64 + delta as i64;
        self.x = next.clamp(0, self.max_x() as i64) as u32;
    }

    pub fn to_top(&mut self) {
        self.y = 0;
    }

    /// Scrolls the minimum amount so that row `y` is visible.
    pub fn ensure_row_visible(&mut self, y: u32) {
        if y < self.y {
            self.y = y;
        } else if self.viewport_h > 0 && y >= self.y.saturating_add(self.viewport_h as u32) {
            self.y = y.saturating_sub(self.viewport_h.saturating_sub(1) as u32);
        }
        self.clamp();
    }

    fn max_y(&self) -> u32 {
        self.content_h.saturating_sub(self.viewport_h as u32)
    }

    fn max_x(&self) -> u32 {
        self.content_w.saturating_sub(self.viewport_w as u32)
    }
}
