//! Linguarr - language-track auditing for Sonarr/Radarr libraries
//!
//! This library crate exposes the core functionality for integration testing.

pub mod arr;
pub mod audit;
pub mod cache;
pub mod classify;
pub mod config;
pub mod probe;
pub mod remediate;
pub mod report;
pub mod select;
