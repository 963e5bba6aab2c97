use clap::Parser;
use std::path::PathBuf;

/// Scramble type assigned to sessions whose options block is missing.
pub const DEFAULT_SCRAMBLE_TYPE: &str = "3x3";

/// File extension (without the dot) that marks a csTimer session export.
pub const SESSION_LOG_EXTENSION: &str = "txt";

// ── ParseOptions ───────────────────────────────────────────────────────────────

/// Knobs for turning a session log into records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Scramble type used when a session carries no `opt.scrType`.
    pub default_scramble_type: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_scramble_type: DEFAULT_SCRAMBLE_TYPE.to_string(),
        }
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Plot solve times from csTimer session exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cstimer-viz",
    about = "Plot solve times from csTimer session exports",
    version
)]
pub struct Settings {
    /// Session log file, or a folder of .txt session logs
    pub path: PathBuf,

    /// Initial view
    #[arg(long, default_value = "overlay", value_parser = ["overlay", "facets", "table"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Timezone for axis labels (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Scramble type for sessions without one
    #[arg(long, default_value = DEFAULT_SCRAMBLE_TYPE)]
    pub default_scramble_type: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse process arguments and resolve `"auto"` values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list, so
    /// tests need not spawn subprocesses.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        Self::resolve_auto_values(Settings::parse_from(args))
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_scramble_type: self.default_scramble_type.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
