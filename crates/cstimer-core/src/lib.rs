//! Shared types for cstimer-viz.
//!
//! Holds the error taxonomy, the solve record / record set model, parse
//! options and CLI settings, plus time and display helpers used by the data
//! and UI layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{CsTimerError, Result};
pub use models::{RecordSet, SolveRecord, SolveSummary};
pub use settings::{ParseOptions, DEFAULT_SCRAMBLE_TYPE};
