//! Terminal UI layer for cstimer-viz.
//!
//! Provides themes, solve-time line charts (overlaid or faceted by scramble
//! type), a solve table view, and the application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod plotter;
pub mod table_view;
pub mod themes;

pub use cstimer_core as core;
