//! DRAUGHTSHEETS: Fantasy football draft board aggregator
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod provider;
pub mod engine;
pub mod presentation;
pub mod server;
