use {
    crate::history::History,
    crossterm::{
        QueueableCommand,
        style::{self, Color, Stylize},
    },
    std::{
        io::{self, Write},
        iter::{once, repeat_n},
    },
};

/// a labeled horizontal bar showing a percentage.
pub struct Meter<'a> {
    pub label: &'a str,
    /// a percentage. values outside of `[0, 100]` are clamped.
    pub percent: f64,
    /// the width of the bar, not counting its borders.
    pub width: usize,
}

/// the newest samples of a percentage series, one cell per sample.
pub struct Sparkline<'a> {
    pub history: &'a History<f64>,
    pub width: usize,
}

// === impl Meter ===

impl Meter<'_> {
    const ACTIVE: char = '█';
    const IDLE: char = ' ';
    const BORDER_L: char = '[';
    const BORDER_R: char = ']';

    /// the width of the label column.
    pub const LABEL: usize = 8;

    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        let Self {
            label,
            percent,
            width,
        } = *self;

        let percent = percent.clamp(0.0, 100.0);
        let active = ((percent / 100.0) * width as f64).round() as usize;

        let bar = once(Self::BORDER_L)
            .chain(repeat_n(Self::ACTIVE, active))
            .chain(repeat_n(Self::IDLE, width - active))
            .chain(once(Self::BORDER_R))
            .collect::<String>();

        writer
            .queue(style::Print(format!("{label:<width$} ", width = Self::LABEL)))?
            .queue(style::PrintStyledContent(bar.with(color(percent))))?
            .queue(style::Print(format!(" {percent:5.1}%")))?;

        Ok(())
    }
}

// === impl Sparkline ===

impl Sparkline<'_> {
    const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    /// the cells of this sparkline, oldest first, padded on the left to its full width.
    pub fn cells(&self) -> String {
        let Self { history, width } = *self;

        let shown = history.len().min(width);
        let padding = repeat_n(Self::LEVELS[0], width - shown);
        let cells = history.iter().skip(history.len() - shown).map(|percent| {
            let level = (percent.clamp(0.0, 100.0) / 100.0 * 8.0).round() as usize;
            Self::LEVELS[level]
        });

        padding.chain(cells).collect()
    }

    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        let latest = self.history.latest().copied().unwrap_or_default();
        writer.queue(style::PrintStyledContent(self.cells().with(color(latest))))?;
        Ok(())
    }
}

/// green while a percentage is low, yellow once it is high, red once it is critical.
fn color(percent: f64) -> Color {
    if percent >= 85.0 {
        Color::Red
    } else if percent >= 60.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}
