use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

const SECONDS_PER_DAY: i64 = 86_400;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Parse an IANA timezone name, falling back to UTC with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!(
            "unrecognised timezone \"{}\", falling back to UTC",
            tz_name
        );
        Tz::UTC
    })
}

// ── Epoch conversion ──────────────────────────────────────────────────────────

/// Convert Unix epoch seconds into a UTC timestamp.
///
/// Fractional seconds are kept at millisecond resolution. Returns `None` for
/// non-finite values or values outside chrono's representable range.
pub fn epoch_seconds_to_utc(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let millis = (secs * 1_000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

// ── Axis labels ───────────────────────────────────────────────────────────────

/// Format a timestamp for a chart axis, choosing the granularity from the
/// total span the axis covers.
///
/// | Span          | Format             |
/// |---------------|--------------------|
/// | < 1 day       | `14:05`            |
/// | < 1 year      | `11-14 22:13`      |
/// | ≥ 1 year      | `2023-11-14`       |
pub fn format_axis_label(dt: DateTime<Utc>, tz: Tz, span_secs: i64) -> String {
    let local = dt.with_timezone(&tz);
    let fmt = if span_secs < SECONDS_PER_DAY {
        "%H:%M"
    } else if span_secs < 365 * SECONDS_PER_DAY {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    local.format(fmt).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
