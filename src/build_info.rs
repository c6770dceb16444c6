//! Build information
//!
//! `build.rs` stamps each compilation with `PCM_BUILD_NUMBER` and
//! `PCM_BUILD_TIMESTAMP`; both fall back to placeholders when absent.

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUILD_NUMBER: u64 = match option_env!("PCM_BUILD_NUMBER") {
    Some(raw) => match build_number_from(raw) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// ISO 8601, UTC
pub const BUILD_TIMESTAMP: &str = match option_env!("PCM_BUILD_TIMESTAMP") {
    Some(raw) => raw,
    None => "unknown",
};

/// Decimal digits only; empty input or overflow yields `None`
const fn build_number_from(raw: &str) -> Option<u64> {
    let digits = raw.as_bytes();
    if digits.is_empty() {
        return None;
    }

    let mut value: u64 = 0;
    let mut i = 0;
    while i < digits.len() {
        let d = digits[i];
        if !d.is_ascii_digit() {
            return None;
        }
        value = match value.checked_mul(10) {
            Some(v) => match v.checked_add((d - b'0') as u64) {
                Some(v) => v,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(value)
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
        }
    }
}

/// Startup banner on stderr, since stdout carries the MCP stream
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Product Cost Manager (PCM)");
    eprintln!("  Version: {} | Build: {}", info.version, info.build_number);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("===============================================");
}
