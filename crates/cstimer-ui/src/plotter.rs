//! Solve-time line charts.
//!
//! [`Plotter`] draws a [`RecordSet`] as [`ratatui::widgets::Chart`]s with
//! `Datetime` on the x-axis and `Duration [s]` on the y-axis, either as one
//! overlaid chart coloured by scramble type or as one stacked chart per
//! scramble type. DNF solves (`NaN` durations) break the line.

use chrono_tz::Tz;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use cstimer_core::models::{RecordSet, SolveRecord};
use cstimer_core::time_utils::{epoch_seconds_to_utc, format_axis_label};

use crate::themes::Theme;

/// Headroom above the slowest solve, as a fraction of it.
const Y_HEADROOM: f64 = 0.05;

/// Chart data for one scramble type.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub style: Style,
    /// Contiguous runs of finished solves; each DNF starts a new run.
    pub segments: Vec<Vec<(f64, f64)>>,
}

/// Shared axis geometry so every facet is drawn on the same scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
}

/// Split records into plottable `(epoch_seconds, duration)` runs.
///
/// A `NaN` duration ends the current run and is not itself plotted, leaving
/// a gap in the line.
pub fn line_segments(records: &[&SolveRecord]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for record in records {
        if record.duration_secs.is_nan() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }
        let x = record.datetime.timestamp_millis() as f64 / 1_000.0;
        current.push((x, record.duration_secs));
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Compute axis bounds and labels for a record set.
///
/// x spans the record time range (a single instant is padded by a second on
/// either side); y spans zero to just above the slowest finished solve.
pub fn compute_axes(records: &RecordSet, tz: Tz) -> Axes {
    let (x_lo, x_hi) = match records.time_range() {
        Some((first, last)) => {
            let lo = first.timestamp_millis() as f64 / 1_000.0;
            let hi = last.timestamp_millis() as f64 / 1_000.0;
            if hi > lo {
                (lo, hi)
            } else {
                (lo - 1.0, hi + 1.0)
            }
        }
        None => (0.0, 1.0),
    };

    let y_hi = match records.duration_range() {
        Some((_, max)) if max > 0.0 => max * (1.0 + Y_HEADROOM),
        _ => 1.0,
    };

    let span = (x_hi - x_lo) as i64;
    let x_labels = [x_lo, (x_lo + x_hi) / 2.0, x_hi]
        .iter()
        .map(|secs| {
            epoch_seconds_to_utc(*secs)
                .map(|dt| format_axis_label(dt, tz, span))
                .unwrap_or_default()
        })
        .collect();

    let y_labels = [0.0, y_hi / 2.0, y_hi]
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect();

    Axes {
        x_bounds: [x_lo, x_hi],
        y_bounds: [0.0, y_hi],
        x_labels,
        y_labels,
    }
}

/// Draws solve-time charts for a record set.
pub struct Plotter<'a> {
    records: &'a RecordSet,
    theme: &'a Theme,
    tz: Tz,
}

impl<'a> Plotter<'a> {
    pub fn new(records: &'a RecordSet, theme: &'a Theme, tz: Tz) -> Self {
        Self { records, theme, tz }
    }

    /// One series per scramble type, in order of first appearance.
    pub fn series(&self) -> Vec<Series> {
        self.records
            .scramble_types()
            .into_iter()
            .enumerate()
            .map(|(i, name)| Series {
                name: name.to_string(),
                style: self.theme.series_style(i),
                segments: line_segments(&self.records.by_scramble_type(name)),
            })
            .collect()
    }

    /// Draw a single chart with one line per scramble type.
    pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
        if self.records.is_empty() {
            render_no_data(frame, area, self.theme);
            return;
        }

        let axes = compute_axes(self.records, self.tz);
        let series = self.series();
        self.render_chart(frame, area, "Solve times", &series, &axes, true);
    }

    /// Draw one chart per scramble type, stacked in rows.
    pub fn render_facets(&self, frame: &mut Frame, area: Rect) {
        if self.records.is_empty() {
            render_no_data(frame, area, self.theme);
            return;
        }

        let axes = compute_axes(self.records, self.tz);
        let series = self.series();
        let rows = series.len() as u32;
        let constraints: Vec<Constraint> = series
            .iter()
            .map(|_| Constraint::Ratio(1, rows))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (s, chunk) in series.iter().zip(chunks.iter()) {
            let title = format!("Scramble Type = {}", s.name);
            self.render_chart(
                frame,
                *chunk,
                &title,
                std::slice::from_ref(s),
                &axes,
                false,
            );
        }
    }

    fn render_chart(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        series: &[Series],
        axes: &Axes,
        show_legend: bool,
    ) {
        let mut datasets: Vec<Dataset> = Vec::new();
        for s in series {
            // Keep all-DNF types in the legend.
            if s.segments.is_empty() {
                datasets.push(Dataset::default().name(s.name.clone()).style(s.style));
            }
            for (i, segment) in s.segments.iter().enumerate() {
                // A lone point has no neighbour to draw a line to.
                let graph_type = if segment.len() == 1 {
                    GraphType::Scatter
                } else {
                    GraphType::Line
                };
                let mut dataset = Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(graph_type)
                    .style(s.style)
                    .data(segment.as_slice());
                if i == 0 {
                    dataset = dataset.name(s.name.clone());
                }
                datasets.push(dataset);
            }
        }

        let x_axis = Axis::default()
            .title(Span::styled("Datetime", self.theme.axis_title))
            .style(self.theme.axis)
            .bounds(axes.x_bounds)
            .labels(axis_labels(&axes.x_labels));
        let y_axis = Axis::default()
            .title(Span::styled("Duration [s]", self.theme.axis_title))
            .style(self.theme.axis)
            .bounds(axes.y_bounds)
            .labels(axis_labels(&axes.y_labels));

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.chart_border)
                    .title(Span::styled(format!(" {} ", title), self.theme.header)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(show_legend.then_some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

        frame.render_widget(chart, area);
    }
}

fn axis_labels(labels: &[String]) -> Vec<Span<'static>> {
    labels.iter().map(|l| Span::raw(l.clone())).collect()
}

/// Render a "no data" placeholder when there are no solves to chart.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No solves to plot", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" csTimer Visualizer "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn record(secs: i64, duration: f64, scramble_type: &str) -> SolveRecord {
        SolveRecord {
            duration_secs: duration,
            scramble: "R U R' U'".to_string(),
            was_plus_two: false,
            datetime: Utc.timestamp_opt(secs, 0).unwrap(),
            scramble_type: scramble_type.to_string(),
        }
    }

    fn sample_set() -> RecordSet {
        RecordSet::from_unsorted(vec![
            record(1_700_000_000, 12.0, "333"),
            record(1_700_000_600, 11.5, "333"),
            record(1_700_001_200, f64::NAN, "333"),
            record(1_700_001_800, 10.9, "333"),
            record(1_700_000_300, 4.2, "222so"),
            record(1_700_000_900, 3.8, "222so"),
        ])
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    // ── line_segments ─────────────────────────────────────────────────────────

    #[test]
    fn test_line_segments_split_at_dnf() {
        let records = [
            record(10, 1.0, "333"),
            record(20, 2.0, "333"),
            record(30, f64::NAN, "333"),
            record(40, 4.0, "333"),
        ];
        let refs: Vec<&SolveRecord> = records.iter().collect();

        let segments = line_segments(&refs);
        assert_eq!(
            segments,
            vec![vec![(10.0, 1.0), (20.0, 2.0)], vec![(40.0, 4.0)]]
        );
    }

    #[test]
    fn test_line_segments_leading_and_repeated_dnf() {
        let records = [
            record(10, f64::NAN, "333"),
            record(20, f64::NAN, "333"),
            record(30, 3.0, "333"),
        ];
        let refs: Vec<&SolveRecord> = records.iter().collect();
        assert_eq!(line_segments(&refs), vec![vec![(30.0, 3.0)]]);
    }

    #[test]
    fn test_line_segments_all_dnf() {
        let records = [record(10, f64::NAN, "333")];
        let refs: Vec<&SolveRecord> = records.iter().collect();
        assert!(line_segments(&refs).is_empty());
    }

    // ── compute_axes ──────────────────────────────────────────────────────────

    #[test]
    fn test_compute_axes_bounds() {
        let axes = compute_axes(&sample_set(), Tz::UTC);
        assert_eq!(axes.x_bounds, [1_700_000_000.0, 1_700_001_800.0]);
        assert_eq!(axes.y_bounds[0], 0.0);
        assert!((axes.y_bounds[1] - 12.6).abs() < 1e-9);
        assert_eq!(axes.x_labels, vec!["22:13", "22:28", "22:43"]);
        assert_eq!(axes.y_labels, vec!["0.0", "6.3", "12.6"]);
    }

    #[test]
    fn test_compute_axes_single_instant_is_padded() {
        let set = RecordSet::from_unsorted(vec![record(100, 5.0, "333")]);
        let axes = compute_axes(&set, Tz::UTC);
        assert_eq!(axes.x_bounds, [99.0, 101.0]);
    }

    #[test]
    fn test_compute_axes_all_dnf() {
        let set = RecordSet::from_unsorted(vec![record(100, f64::NAN, "333")]);
        let axes = compute_axes(&set, Tz::UTC);
        assert_eq!(axes.y_bounds, [0.0, 1.0]);
    }

    // ── Plotter::series ───────────────────────────────────────────────────────

    #[test]
    fn test_series_one_per_scramble_type() {
        let set = sample_set();
        let theme = Theme::dark();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        let series = plotter.series();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["333", "222so"]);
        assert_eq!(series[0].style, theme.series_style(0));
        assert_eq!(series[1].style, theme.series_style(1));
        // The DNF splits the 3x3 line in two.
        assert_eq!(series[0].segments.len(), 2);
        assert_eq!(series[1].segments.len(), 1);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_overlay_shows_legend() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let set = sample_set();
        let theme = Theme::dark();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_overlay(frame, area);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Solve times"));
        assert!(text.contains("333"));
        assert!(text.contains("222so"));
    }

    #[test]
    fn test_render_overlay_legend_lists_all_dnf_type() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut records: Vec<SolveRecord> = sample_set().iter().cloned().collect();
        records.push(record(1_700_000_450, f64::NAN, "clock"));
        let set = RecordSet::from_unsorted(records);
        let theme = Theme::dark();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        assert!(plotter.series()[2].segments.is_empty());

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_overlay(frame, area);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("clock"));
    }

    #[test]
    fn test_render_facets_titles_each_type() {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let set = sample_set();
        let theme = Theme::light();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_facets(frame, area);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Scramble Type = 333"));
        assert!(text.contains("Scramble Type = 222so"));
    }

    #[test]
    fn test_render_empty_set_shows_placeholder() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let set = RecordSet::default();
        let theme = Theme::dark();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_overlay(frame, area);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No solves to plot"));
    }

    #[test]
    fn test_render_facets_small_area_does_not_panic() {
        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        let set = sample_set();
        let theme = Theme::classic();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_facets(frame, area);
            })
            .unwrap();
    }

    #[test]
    fn test_render_overlay_all_dnf_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let set = RecordSet::from_unsorted(vec![record(100, f64::NAN, "333")]);
        let theme = Theme::dark();
        let plotter = Plotter::new(&set, &theme, Tz::UTC);

        terminal
            .draw(|frame| {
                let area = frame.area();
                plotter.render_overlay(frame, area);
            })
            .unwrap();
    }
}
