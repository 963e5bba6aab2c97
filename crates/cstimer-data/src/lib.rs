//! Log parsing layer for cstimer-viz.
//!
//! Reads csTimer session exports, decodes their string-embedded JSON fields
//! and flattens every solve into a [`cstimer_core::models::RecordSet`].

pub mod document;
pub mod reader;

pub use cstimer_core as core;
pub use reader::{
    find_session_files, parse_folder, parse_folder_with, parse_single_file, parse_single_file_with,
};
