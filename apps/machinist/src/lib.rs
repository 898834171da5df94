//! # Machinist
//!
//! The application layer around `machinist-core`: TOML configuration, the
//! clap CLI and the axum HTTP API.

pub mod api;
pub mod cli;
pub mod config;
