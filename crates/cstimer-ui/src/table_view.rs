//! Solve table view for the cstimer-viz TUI.
//!
//! Renders the most recent solves that fit in the area as a bordered
//! [`ratatui::widgets::Table`], followed by a highlighted summary row.

use chrono_tz::Tz;
use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use cstimer_core::formatting::{format_optional_time, format_solve_with_penalty};
use cstimer_core::models::{RecordSet, SolveRecord};

use crate::themes::Theme;

/// Rows taken up by the border, the header and the summary row.
const TABLE_CHROME_ROWS: u16 = 4;

/// The tail of `records` that fits into `height` terminal rows.
pub fn visible_records(records: &RecordSet, height: u16) -> &[SolveRecord] {
    let capacity = height.saturating_sub(TABLE_CHROME_ROWS) as usize;
    let all = records.records();
    &all[all.len().saturating_sub(capacity)..]
}

/// Render the solve table into `area`.
pub fn render_records_table(
    frame: &mut Frame,
    area: Rect,
    records: &RecordSet,
    tz: Tz,
    theme: &Theme,
) {
    let header_cells = ["Datetime", "Duration [s]", "Scramble Type", "Scramble"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = visible_records(records, area.height)
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let time_style = if record.is_dnf() {
                theme.dnf
            } else if record.was_plus_two {
                theme.plus_two
            } else {
                style
            };
            let local = record.datetime.with_timezone(&tz);
            Row::new(vec![
                Cell::from(local.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(format_solve_with_penalty(
                    record.duration_secs,
                    record.was_plus_two,
                ))
                .style(time_style),
                Cell::from(record.scramble_type.clone()),
                Cell::from(record.scramble.clone()),
            ])
            .style(style)
        })
        .collect();

    let summary = records.summary();
    let total_row = Row::new(vec![
        Cell::from(format!("{} solves", summary.count)),
        Cell::from(format!(
            "best {} / mean {}",
            format_optional_time(summary.best),
            format_optional_time(summary.mean)
        )),
        Cell::from(format!(
            "{} DNF, {} +2",
            summary.dnf_count, summary.plus_two_count
        )),
        Cell::from(""),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(20),
        Constraint::Length(28),
        Constraint::Length(16),
        Constraint::Min(10),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.separator)
                .title(" Solves "),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_records(n: i64) -> RecordSet {
        RecordSet::from_unsorted(
            (0..n)
                .map(|i| SolveRecord {
                    duration_secs: if i == 1 { f64::NAN } else { 10.0 + i as f64 },
                    scramble: format!("scramble-{}", i),
                    was_plus_two: i == 2,
                    datetime: Utc.timestamp_opt(1_700_000_000 + i * 60, 0).unwrap(),
                    scramble_type: "333".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_visible_records_takes_tail() {
        let set = make_records(10);
        let visible = visible_records(&set, 7);
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].scramble, "scramble-7");
        assert_eq!(visible[2].scramble, "scramble-9");
    }

    #[test]
    fn test_visible_records_all_fit() {
        let set = make_records(3);
        assert_eq!(visible_records(&set, 50).len(), 3);
    }

    #[test]
    fn test_visible_records_too_short_area() {
        let set = make_records(3);
        assert!(visible_records(&set, 2).is_empty());
    }

    #[test]
    fn test_render_records_table_shows_summary() {
        let backend = TestBackend::new(120, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let set = make_records(4);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_records_table(frame, area, &set, Tz::UTC, &theme);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("4 solves"));
        assert!(text.contains("1 DNF, 1 +2"));
        assert!(text.contains("DNF"));
        assert!(text.contains("12.000+"));
        assert!(text.contains("2023-11-14 22:13:20"));
    }

    #[test]
    fn test_render_records_table_empty_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();
        let set = RecordSet::default();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_records_table(frame, area, &set, Tz::UTC, &theme);
            })
            .unwrap();
    }
}
