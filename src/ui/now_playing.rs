use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::app::App;
use crate::audio::PlaybackState;
use crate::config::Theme;
use crate::library::{format_duration, RepeatMode};

pub struct NowPlayingPanel<'a> {
    app: &'a App,
}

impl<'a> NowPlayingPanel<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    fn render_track_info(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let Some(track) = self.app.queue.current() else {
            let no_track_style = Style::default().fg(theme.foreground_dim);
            buf.set_string(area.x + 1, area.y + 1, "No track loaded", no_track_style);
            return;
        };
        let width = area.width.saturating_sub(2) as usize;

        // Track title
        let title_style = Style::default()
            .fg(theme.foreground)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, truncate_string(&track.title, width), title_style);

        // Format and position in queue
        let mut details = track.format.label().to_string();
        if let Some(format) = self.app.player.format() {
            details.push_str(&format!(
                " · {} Hz · {} ch · {}-bit",
                format.sample_rate, format.channels, format.bits_per_sample
            ));
        }
        if let Some(index) = self.app.queue.current_index() {
            details.push_str(&format!(" · {}/{}", index + 1, self.app.queue.len()));
        }
        let details_style = Style::default().fg(theme.now_playing_accent);
        buf.set_string(area.x + 1, area.y + 1, truncate_string(&details, width), details_style);

        let controls_area = Rect::new(area.x, area.y + 3, area.width, 1);
        self.render_controls(controls_area, buf, theme);

        let progress_area = Rect::new(area.x, area.y + 4, area.width, 1);
        self.render_progress(progress_area, buf, theme);
    }

    fn render_controls(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let player = &self.app.player;
        let repeat = self.app.queue.repeat();

        let (state_symbol, state_style) = match player.state() {
            PlaybackState::Playing => ("▶ Playing", Style::default().fg(theme.accent)),
            PlaybackState::Paused => ("⏸ Paused", Style::default().fg(theme.warning)),
            PlaybackState::Stopped => ("■ Stopped", Style::default().fg(theme.foreground_dim)),
        };

        let repeat_style = match repeat {
            RepeatMode::Off => Style::default().fg(theme.foreground_dim),
            RepeatMode::All | RepeatMode::One => Style::default().fg(theme.accent),
        };

        let shuffle_style = if self.app.queue.is_shuffled() {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.foreground_dim)
        };

        let volume = if player.is_muted() {
            Span::styled("Muted", Style::default().fg(theme.warning))
        } else {
            Span::styled(
                format!("Vol: {}%", (player.volume() * 100.0).round() as u8),
                Style::default().fg(theme.accent),
            )
        };

        let line = Line::from(vec![
            Span::styled(state_symbol, state_style),
            Span::raw("   "),
            Span::styled("⤨", shuffle_style),
            Span::raw(" "),
            Span::styled(repeat.symbol(), repeat_style),
            Span::raw("   "),
            volume,
        ]);
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
    }

    fn render_progress(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let position_str = format_duration(self.app.player.position());
        let duration_str = format_duration(self.app.player.duration());
        let progress = self.app.player.progress();

        // Time labels
        let time_style = Style::default().fg(theme.foreground_dim);
        buf.set_string(area.x + 1, area.y, &position_str, time_style);

        let duration_x = (area.x + area.width).saturating_sub(duration_str.len() as u16 + 1);
        buf.set_string(duration_x, area.y, &duration_str, time_style);

        // Progress bar in the middle
        let bar_start = area.x + position_str.len() as u16 + 2;
        let bar_end = duration_x.saturating_sub(1);
        let bar_width = bar_end.saturating_sub(bar_start) as usize;

        if bar_width > 2 {
            let filled = ((progress * bar_width as f64) as usize).min(bar_width);
            let filled_bar = "━".repeat(filled);
            let empty_bar = "─".repeat(bar_width - filled);

            buf.set_string(
                bar_start,
                area.y,
                &filled_bar,
                Style::default().fg(theme.progress_bar_filled),
            );
            buf.set_string(
                bar_start + filled as u16,
                area.y,
                &empty_bar,
                Style::default().fg(theme.progress_bar_empty),
            );
        }
    }
}

impl Widget for NowPlayingPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.app.theme();

        let block = Block::default()
            .title(" Now Playing ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 5 {
            return;
        }
        self.render_track_info(inner, buf, theme);
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    } else {
        s.chars().take(max_len).collect()
    }
}
