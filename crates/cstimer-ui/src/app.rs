//! Main application state and TUI event loop for cstimer-viz.
//!
//! [`App`] owns the theme, the active view and the display time zone. It
//! draws a loaded [`RecordSet`] until the user quits.

use std::io;
use std::time::Duration;

use chrono_tz::Tz;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::debug;

use cstimer_core::models::RecordSet;
use cstimer_core::time_utils::resolve_timezone;

use crate::plotter::Plotter;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Every scramble type on one chart.
    Overlay,
    /// One chart per scramble type.
    Facets,
    /// Tabular list of recent solves.
    Table,
}

impl ViewMode {
    /// Parse a view name as accepted by `--view`; unknown names give `Overlay`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "facets" => Self::Facets,
            "table" => Self::Table,
            _ => Self::Overlay,
        }
    }

    /// The view shown after this one when cycling.
    pub fn next(self) -> Self {
        match self {
            Self::Overlay => Self::Facets,
            Self::Facets => Self::Table,
            Self::Table => Self::Overlay,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overlay => "overlay",
            Self::Facets => "facets",
            Self::Table => "table",
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the cstimer-viz TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Current view mode.
    pub view_mode: ViewMode,
    /// Zone used for axis labels and table timestamps.
    pub timezone: Tz,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    /// Construct a new application with the given configuration.
    pub fn new(theme_name: &str, view_mode: ViewMode, timezone: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            timezone: resolve_timezone(timezone),
            should_quit: false,
        }
    }

    /// Run the TUI over `records` until `q`, `Q` or `Ctrl+C` is pressed.
    ///
    /// `v` and `Tab` cycle through the views. The terminal is restored before
    /// returning, including when drawing fails.
    pub fn run(mut self, records: &RecordSet) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame, records)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('v') | KeyCode::Tab => {
                self.view_mode = self.view_mode.next();
                debug!("Switched to {} view", self.view_mode.label());
            }
            _ => {}
        }
    }

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame, records: &RecordSet) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let header = Line::from(vec![
            Span::styled("csTimer Visualizer", self.theme.header),
            Span::styled(" | ", self.theme.separator),
            Span::styled(format!("{} solves", records.len()), self.theme.text),
            Span::styled(" | ", self.theme.separator),
            Span::styled(self.view_mode.label(), self.theme.text),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let plotter = Plotter::new(records, &self.theme, self.timezone);
        match self.view_mode {
            ViewMode::Overlay => plotter.render_overlay(frame, chunks[1]),
            ViewMode::Facets => plotter.render_facets(frame, chunks[1]),
            ViewMode::Table => table_view::render_records_table(
                frame,
                chunks[1],
                records,
                self.timezone,
                &self.theme,
            ),
        }

        let footer = Line::from(Span::styled(
            "v/Tab: switch view   q: quit",
            self.theme.dim,
        ));
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cstimer_core::models::SolveRecord;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_set() -> RecordSet {
        RecordSet::from_unsorted(
            [(0, 9.1, "333"), (60, 8.7, "333"), (120, 3.2, "222so")]
                .into_iter()
                .map(|(offset, duration, ty)| SolveRecord {
                    duration_secs: duration,
                    scramble: "U R2 F".to_string(),
                    was_plus_two: false,
                    datetime: Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap(),
                    scramble_type: ty.to_string(),
                })
                .collect(),
        )
    }

    fn render_to_text(app: &App, records: &RecordSet) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame, records)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    // ── ViewMode ──────────────────────────────────────────────────────────────

    #[test]
    fn test_view_mode_from_name() {
        assert_eq!(ViewMode::from_name("overlay"), ViewMode::Overlay);
        assert_eq!(ViewMode::from_name("facets"), ViewMode::Facets);
        assert_eq!(ViewMode::from_name("table"), ViewMode::Table);
        assert_eq!(ViewMode::from_name("bogus"), ViewMode::Overlay);
    }

    #[test]
    fn test_view_mode_cycles() {
        let start = ViewMode::Overlay;
        assert_eq!(start.next(), ViewMode::Facets);
        assert_eq!(start.next().next(), ViewMode::Table);
        assert_eq!(start.next().next().next(), start);
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    #[test]
    fn test_handle_key_quit() {
        let mut app = App::new("dark", ViewMode::Overlay, "UTC");
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_handle_key_ctrl_c_quits() {
        let mut app = App::new("dark", ViewMode::Overlay, "UTC");
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_handle_key_plain_c_does_not_quit() {
        let mut app = App::new("dark", ViewMode::Overlay, "UTC");
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_handle_key_switches_view() {
        let mut app = App::new("dark", ViewMode::Overlay, "UTC");
        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.view_mode, ViewMode::Facets);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Table);
    }

    #[test]
    fn test_new_resolves_timezone() {
        let app = App::new("dark", ViewMode::Overlay, "Asia/Tokyo");
        assert_eq!(app.timezone, chrono_tz::Asia::Tokyo);
        let fallback = App::new("dark", ViewMode::Overlay, "Nowhere/Special");
        assert_eq!(fallback.timezone, Tz::UTC);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_header_and_footer() {
        let app = App::new("dark", ViewMode::Overlay, "UTC");
        let text = render_to_text(&app, &sample_set());
        assert!(text.contains("csTimer Visualizer"));
        assert!(text.contains("3 solves"));
        assert!(text.contains("v/Tab: switch view"));
    }

    #[test]
    fn test_render_each_view() {
        let records = sample_set();
        let mut app = App::new("classic", ViewMode::Overlay, "UTC");

        assert!(render_to_text(&app, &records).contains("Solve times"));

        app.view_mode = ViewMode::Facets;
        assert!(render_to_text(&app, &records).contains("Scramble Type = 222so"));

        app.view_mode = ViewMode::Table;
        assert!(render_to_text(&app, &records).contains("best 3.200"));
    }

    #[test]
    fn test_render_empty_records() {
        let app = App::new("dark", ViewMode::Facets, "UTC");
        let text = render_to_text(&app, &RecordSet::default());
        assert!(text.contains("No solves to plot"));
    }
}
