/// Format a solve duration the way timers display it.
///
/// * `NaN` → `"DNF"`
/// * `< 60` seconds → `"5.230"`
/// * `≥ 60` seconds → `"1:05.230"`
///
/// # Examples
///
/// ```
/// use cstimer_core::formatting::format_solve_time;
///
/// assert_eq!(format_solve_time(5.23), "5.230");
/// assert_eq!(format_solve_time(65.23), "1:05.230");
/// assert_eq!(format_solve_time(f64::NAN), "DNF");
/// ```
pub fn format_solve_time(secs: f64) -> String {
    if secs.is_nan() {
        return "DNF".to_string();
    }
    let total_millis = (secs * 1_000.0).round() as u64;
    let minutes = total_millis / 60_000;
    let millis = total_millis % 60_000;
    if minutes == 0 {
        format!("{}.{:03}", millis / 1_000, millis % 1_000)
    } else {
        format!("{}:{:02}.{:03}", minutes, millis / 1_000, millis % 1_000)
    }
}

/// Like [`format_solve_time`] but suffixes `+` on penalised solves.
pub fn format_solve_with_penalty(secs: f64, was_plus_two: bool) -> String {
    let base = format_solve_time(secs);
    if was_plus_two && !secs.is_nan() {
        format!("{}+", base)
    } else {
        base
    }
}

/// Format an optional statistic, showing `"-"` when absent.
pub fn format_optional_time(secs: Option<f64>) -> String {
    secs.map(format_solve_time).unwrap_or_else(|| "-".to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
