use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use cstimer_core::models::RecordSet;
use cstimer_core::settings::ParseOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto a tracing filter directive.
///
/// Unrecognised names are passed through so that full `EnvFilter`
/// directives (e.g. `cstimer_data=debug`) also work.
pub fn normalise_log_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to `log_file` when given (appending, no ANSI colours), otherwise
/// to stderr. Falls back to `"warn"` if the level string is not recognised.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(normalise_log_level(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}

// ── Record loading ─────────────────────────────────────────────────────────────

/// Load records from a single export or a folder of exports, depending on
/// what `path` points at.
pub fn load_records(path: &Path, options: &ParseOptions) -> anyhow::Result<RecordSet> {
    let records = if path.is_dir() {
        tracing::info!("Loading session logs from folder {}", path.display());
        cstimer_data::parse_folder_with(path, options)
    } else {
        tracing::info!("Loading session log {}", path.display());
        cstimer_data::parse_single_file_with(path, options)
    };
    records.with_context(|| format!("loading solves from {}", path.display()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_export(dir: &Path, name: &str, epoch: i64) -> PathBuf {
        let content = json!({
            "session1": [[[0, 7000], "R U", "", epoch]],
            "properties": {
                "sessionData": json!({"1": {"opt": {"scrType": "333"}}}).to_string(),
                "scrFlt": "[]",
            },
        })
        .to_string();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_normalise_log_level() {
        assert_eq!(normalise_log_level("DEBUG"), "debug");
        assert_eq!(normalise_log_level("info"), "info");
        assert_eq!(normalise_log_level("WARNING"), "warn");
        assert_eq!(normalise_log_level("CRITICAL"), "error");
        assert_eq!(normalise_log_level("cstimer_data=trace"), "cstimer_data=trace");
    }

    #[test]
    fn test_load_records_single_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_export(tmp.path(), "a.txt", 1_700_000_000);

        let records = load_records(&path, &ParseOptions::default()).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records.records()[0].scramble_type, "333");
    }

    #[test]
    fn test_load_records_folder() {
        let tmp = TempDir::new().expect("tempdir");
        write_export(tmp.path(), "a.txt", 1_700_000_000);
        write_export(tmp.path(), "b.txt", 1_700_000_100);

        let records = load_records(tmp.path(), &ParseOptions::default()).expect("load");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_records_missing_file_keeps_cause() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_records(&tmp.path().join("gone.txt"), &ParseOptions::default())
            .expect_err("missing file must fail");

        let cause = err
            .downcast_ref::<cstimer_core::CsTimerError>()
            .expect("library error is preserved");
        assert!(cause.is_not_found());
        assert!(format!("{:#}", err).contains("loading solves from"));
    }
}
