//! Secure Sense - sensor telemetry ingestion and aggregation API
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod query;
pub mod routes;
