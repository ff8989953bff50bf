/// Transient presentation state the orchestration layer is allowed to touch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UiState {
    pub sidebar_open: bool,
    /// Lines scrolled away from the top of the content area.
    pub scroll_offset: u16,
}

impl UiState {
    pub fn open_sidebar(&mut self) {
        self.sidebar_open = true;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}
