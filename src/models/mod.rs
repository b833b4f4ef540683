// src/models/mod.rs

//! Domain models for partywatch.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod party;
mod state;

// Re-export all public types
pub use config::{
    AnnounceConfig, Config, HttpConfig, OrderPolicy, PublisherConfig, PublisherKind,
    SourceConfig, StateConfig,
};
pub use party::{EmblemImage, PartyEvent, PartyRecord};
pub use state::{Credential, NotificationState};
