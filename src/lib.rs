// src/lib.rs

//! partywatch library
//!
//! Watches the Electoral Commission's list of current party registration
//! applications and announces each new or renamed party once.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
