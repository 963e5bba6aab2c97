use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// Absent or unparseable values yield `BackgroundType::Dark`.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|val| parse_colorfgbg(&val))
        .unwrap_or(BackgroundType::Dark)
}

/// Parse a `"foreground;background"` value. Background colours 0–6 are dark,
/// anything above is light.
pub fn parse_colorfgbg(value: &str) -> Option<BackgroundType> {
    let bg = value.split(';').next_back()?.trim().parse::<u8>().ok()?;
    Some(if bg <= 6 {
        BackgroundType::Dark
    } else {
        BackgroundType::Light
    })
}

/// Complete theme definition carrying all UI styles used by the charts and
/// tables.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub warning: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_border: Style,
    pub axis: Style,
    pub axis_title: Style,
    /// Line colours, assigned to scramble types in order of first appearance.
    pub series: Vec<Color>,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
    pub dnf: Style,
    pub plus_two: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            warning: Style::default().fg(Color::Yellow),

            chart_border: Style::default().fg(Color::DarkGray),
            axis: Style::default().fg(Color::Gray),
            axis_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            series: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Green,
                Color::LightRed,
                Color::LightBlue,
            ],

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            dnf: Style::default().fg(Color::Red),
            plus_two: Style::default().fg(Color::Yellow),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            warning: Style::default().fg(Color::Yellow),

            chart_border: Style::default().fg(Color::Gray),
            axis: Style::default().fg(Color::DarkGray),
            axis_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            series: vec![
                Color::Blue,
                Color::Red,
                Color::Magenta,
                Color::Green,
                Color::DarkGray,
                Color::Cyan,
            ],

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            dnf: Style::default().fg(Color::Red),
            plus_two: Style::default().fg(Color::Magenta),
        }
    }

    /// Classic theme using only the basic 8-colour ANSI palette and no bold.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            warning: Style::default().fg(Color::Yellow),

            chart_border: Style::default().fg(Color::White),
            axis: Style::default().fg(Color::White),
            axis_title: Style::default().fg(Color::White),
            series: vec![
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Green,
                Color::Red,
                Color::Blue,
            ],

            table_header: Style::default().fg(Color::Cyan),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),
            dnf: Style::default().fg(Color::Red),
            plus_two: Style::default().fg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Line style for the `index`-th series, cycling through the palette.
    pub fn series_style(&self, index: usize) -> Style {
        match self.series.len() {
            0 => self.text,
            n => Style::default().fg(self.series[index % n]),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
