//! Product Cost Manager (PCM) Library
//!
//! Material catalog storage and recipe cost aggregation.

pub mod build_info;
pub mod config;
pub mod cost;
pub mod db;
pub mod ingest;
pub mod mcp;
pub mod models;
pub mod tools;
