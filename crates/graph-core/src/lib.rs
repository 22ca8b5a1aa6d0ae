//! Core types, graph storage, and configuration for the code graph indexer.
//!
//! This crate provides the foundational data structures used across every
//! other crate in the workspace:
//! - [`types`] — Symbols, edges, files, and error types
//! - [`store`] — The [`GraphStore`](store::GraphStore) trait for graph persistence
//! - [`sqlite`] — SQLite-backed implementation of `GraphStore`
//! - [`sqlite_bulk`] — bulk-ingest pragma pairing
//! - [`paths`] — workspace-root / common-prefix helpers
//! - [`config`] — configuration loading from `.codegraph/config.json`
//! - [`hash`] — SHA-256 content hashing for dirty detection
//! - [`time`] — dependency-free ISO-8601 timestamps

pub mod config;
pub mod hash;
pub mod paths;
pub mod sqlite;
pub mod sqlite_bulk;
pub mod store;
pub mod time;
pub mod types;
