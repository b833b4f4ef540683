//! Service layer for partywatch.
//!
//! This module contains the business logic for:
//! - Party record extraction (`RecordExtractor`)
//! - Announcement publishing (`Publisher`)

mod extract;
mod publisher;

pub use extract::RecordExtractor;
pub use publisher::{DryRunPublisher, Publisher, WebhookPublisher, build_publisher};
