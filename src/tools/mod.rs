//! PCM Tools module
//!
//! MCP tool implementations for the Product Cost Manager.

pub mod catalog;
pub mod materials;
pub mod products;
pub mod search;
pub mod status;
