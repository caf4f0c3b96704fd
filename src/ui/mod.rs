pub mod layout;
pub mod now_playing;
pub mod spectrum;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::app::{App, StatusLevel};
use crate::audio::VisualizerState;

pub use layout::AppLayout;
pub use now_playing::NowPlayingPanel;
pub use spectrum::SpectrumWidget;

pub fn render(app: &mut App, area: Rect, buf: &mut Buffer) {
    let layout = AppLayout::new(area);

    render_header(app, layout.header, buf);
    NowPlayingPanel::new(app).render(layout.now_playing, buf);
    render_spectrum(app, layout.spectrum, buf);
    render_footer(app, layout.footer, buf);
}

fn render_header(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = app.theme();
    let title_style = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);

    let title = Line::from(vec![
        Span::styled(" Sonar ", title_style),
        Span::styled("│", Style::default().fg(theme.foreground_dim)),
        Span::styled(
            format!(" {} theme", app.config.theme.label()),
            Style::default().fg(theme.foreground_dim),
        ),
    ]);

    buf.set_line(area.x, area.y, &title, area.width);
}

fn render_spectrum(app: &mut App, area: Rect, buf: &mut Buffer) {
    let theme = app.theme().clone();

    let title = match app.visualizer.state() {
        VisualizerState::Running => " Spectrum ",
        VisualizerState::Armed => " Spectrum (paused) ",
        VisualizerState::Idle => " Spectrum (idle) ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(area);
    block.render(area, buf);

    // The next tick maps onto whatever size the panel has now
    app.set_spectrum_canvas(spectrum::canvas_for(inner));

    if app.visualizer.is_enabled() {
        SpectrumWidget::new(app.visualizer.bars())
            .with_colors(theme.spectrum_low, theme.spectrum_mid, theme.spectrum_high)
            .render(inner, buf);
    } else {
        let hint_style = Style::default().fg(theme.foreground_dim);
        buf.set_string(inner.x + 1, inner.y, "Disabled (press v)", hint_style);
    }
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = app.theme();
    let hint_style = Style::default().fg(theme.hint_text);
    let key_style = Style::default().fg(theme.hint_key);

    let hints = [
        ("Space", "Play/Pause"),
        ("s", "Stop"),
        ("n/p", "Next/Prev"),
        ("←/→", "Seek"),
        ("↑/↓", "Volume"),
        ("m", "Mute"),
        ("r", "Repeat"),
        ("h", "Shuffle"),
        ("v", "Spectrum"),
        ("q", "Quit"),
    ];
    let mut spans = vec![Span::styled(" ", hint_style)];
    for (key, label) in hints {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(format!(":{}  ", label), hint_style));
    }
    buf.set_line(area.x, area.y, &Line::from(spans), area.width);

    // Status message on second line
    if let Some(ref status) = app.status_message {
        let color = match status.level {
            StatusLevel::Info => theme.accent,
            StatusLevel::Error => theme.error,
        };
        buf.set_stringn(
            area.x + 1,
            area.y + 1,
            &status.text,
            area.width.saturating_sub(2) as usize,
            Style::default().fg(color),
        );
    }
}
