use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::audio::{Bar, Canvas};

/// Unicode block characters for high-resolution vertical bars
/// These give us 8 levels of granularity per character cell
const BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Vertical canvas units per terminal row
pub const STEPS_PER_ROW: u16 = 8;

/// Canvas for a panel area: one unit per column, eight per row
pub fn canvas_for(area: Rect) -> Canvas {
    Canvas::new(
        area.width as f32,
        area.height as f32 * STEPS_PER_ROW as f32,
    )
}

/// Draws mapped bar geometry into a panel.
///
/// Bars are positioned in canvas units (see [`canvas_for`]); a bar narrower than
/// one column still gets one.
pub struct SpectrumWidget<'a> {
    bars: &'a [Bar],
    color_low: Color,
    color_mid: Color,
    color_high: Color,
}

impl<'a> SpectrumWidget<'a> {
    pub fn new(bars: &'a [Bar]) -> Self {
        Self {
            bars,
            color_low: Color::Green,
            color_mid: Color::Yellow,
            color_high: Color::Red,
        }
    }

    pub fn with_colors(mut self, low: Color, mid: Color, high: Color) -> Self {
        self.color_low = low;
        self.color_mid = mid;
        self.color_high = high;
        self
    }

    fn bar_color(&self, index: usize, height: f32, max_height: f32) -> Color {
        let (low_r, low_g, low_b) = color_to_rgb(self.color_low);
        let (mid_r, mid_g, mid_b) = color_to_rgb(self.color_mid);
        let (high_r, high_g, high_b) = color_to_rgb(self.color_high);

        let position = index as f32 / self.bars.len() as f32;
        // Keep minimum brightness
        let intensity = (height / max_height).clamp(0.3, 1.0);

        let (r, g, b) = if position < 0.5 {
            let t = position * 2.0;
            (
                lerp(low_r, mid_r, t),
                lerp(low_g, mid_g, t),
                lerp(low_b, mid_b, t),
            )
        } else {
            let t = (position - 0.5) * 2.0;
            (
                lerp(mid_r, high_r, t),
                lerp(mid_g, high_g, t),
                lerp(mid_b, high_b, t),
            )
        };

        Color::Rgb(
            (r as f32 * intensity) as u8,
            (g as f32 * intensity) as u8,
            (b as f32 * intensity) as u8,
        )
    }
}

impl Widget for SpectrumWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.bars.is_empty() {
            return;
        }

        let max_height = area.height as f32 * STEPS_PER_ROW as f32;

        for (index, bar) in self.bars.iter().enumerate() {
            let first = bar.left.max(0.0) as u16;
            if first >= area.width {
                continue;
            }
            let columns = (bar.width.round() as u16).max(1).min(area.width - first);

            let bar_height = bar.height.min(max_height) as usize;
            let style = Style::default().fg(self.bar_color(index, bar.height, max_height));

            // Render from bottom to top
            for y in 0..area.height {
                let row_from_bottom = (area.height - 1 - y) as usize;
                let cell_bottom = row_from_bottom * STEPS_PER_ROW as usize;
                let cell_top = cell_bottom + STEPS_PER_ROW as usize;

                let block_char = if bar_height >= cell_top {
                    BLOCKS[8]
                } else if bar_height > cell_bottom {
                    BLOCKS[(bar_height - cell_bottom).min(8)]
                } else {
                    continue;
                };

                for x in first..first + columns {
                    buf.set_string(area.x + x, area.y + y, block_char.to_string(), style);
                }
            }
        }
    }
}

/// Linear interpolation between two values
fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t) as u8
}

/// Extract RGB components from a Color, with fallback for non-RGB colors
fn color_to_rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Red => (255, 0, 0),
        Color::Cyan => (0, 255, 255),
        Color::Magenta => (255, 0, 255),
        Color::Blue => (0, 0, 255),
        Color::White => (255, 255, 255),
        Color::LightGreen => (144, 238, 144),
        Color::LightYellow => (255, 255, 224),
        Color::LightRed => (255, 128, 128),
        Color::LightCyan => (224, 255, 255),
        Color::LightMagenta => (255, 128, 255),
        Color::LightBlue => (173, 216, 230),
        _ => (128, 128, 128),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(left: f32, width: f32, height: f32) -> Bar {
        Bar {
            left,
            width,
            height,
        }
    }

    fn render(bars: &[Bar], area: Rect) -> Buffer {
        let mut buf = Buffer::empty(area);
        SpectrumWidget::new(bars).render(area, &mut buf);
        buf
    }

    #[test]
    fn canvas_uses_eighth_rows() {
        let canvas = canvas_for(Rect::new(3, 4, 40, 5));
        assert_eq!(canvas, Canvas::new(40.0, 40.0));
    }

    #[test]
    fn draws_partial_top_cell() {
        // 1.5 rows tall in a 3 row panel
        let area = Rect::new(0, 0, 4, 3);
        let buf = render(&[bar(1.0, 2.0, 12.0)], area);

        assert_eq!(buf[(1, 2)].symbol(), "█");
        assert_eq!(buf[(2, 2)].symbol(), "█");
        assert_eq!(buf[(1, 1)].symbol(), "▄");
        assert_eq!(buf[(1, 0)].symbol(), " ");
        assert_eq!(buf[(0, 2)].symbol(), " ");
        assert_eq!(buf[(3, 2)].symbol(), " ");
    }

    #[test]
    fn narrow_bars_get_one_column() {
        let area = Rect::new(0, 0, 4, 1);
        let buf = render(&[bar(2.0, 0.0, 8.0)], area);
        assert_eq!(buf[(2, 0)].symbol(), "█");
    }

    #[test]
    fn clips_to_panel() {
        let area = Rect::new(0, 0, 4, 2);
        let buf = render(&[bar(3.0, 5.0, 100.0), bar(10.0, 1.0, 8.0)], area);
        assert_eq!(buf[(3, 0)].symbol(), "█");
        assert_eq!(buf[(3, 1)].symbol(), "█");
    }

    #[test]
    fn empty_bars_leave_panel_blank() {
        let area = Rect::new(0, 0, 3, 2);
        assert_eq!(render(&[], area), Buffer::empty(area));
    }
}
