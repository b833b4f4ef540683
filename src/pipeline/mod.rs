//! Pipeline entry points.
//!
//! - `select_and_render`: pick announceable records and render their text
//! - `run_once`: fetch the registry page and publish what is new

pub mod run;
pub mod select;

pub use run::{RunSummary, process_document, run_once};
pub use select::{
    Announcement, Selection, SelectionPolicy, SkipReason, render_message, select_and_render,
};
