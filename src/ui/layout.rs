use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub header: Rect,
    pub now_playing: Rect,
    pub spectrum: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        // Main vertical split: header, now playing, spectrum, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(7), // Now playing
                Constraint::Min(4),    // Spectrum visualizer
                Constraint::Length(2), // Footer
            ])
            .split(area);

        Self {
            header: chunks[0],
            now_playing: chunks[1],
            spectrum: chunks[2],
            footer: chunks[3],
        }
    }
}
