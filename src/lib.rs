//! pgBackRest backup status exporter.
//!
//! This crate invokes the `pgbackrest` command-line tool, interprets its
//! JSON `info` payload, and republishes backup/archive status as Prometheus
//! metrics. It can be used as a library by other Rust projects, or run as a
//! standalone binary with the `pgbackrest-exporter` executable.
//!
//! # Architecture
//!
//! - **Collector**: builds the tool invocation, classifies the exit status,
//!   decodes the payload and applies stanza include/exclude filtering
//! - **Metrics**: process-wide Prometheus gauge surface, reset and
//!   repopulated as one unit every collection cycle
//! - **Server**: scrape endpoint that triggers one cycle per request
//! - **Config**: YAML configuration with CLI/environment overrides

pub mod collector;
pub mod config;
pub mod metrics;
pub mod server;
