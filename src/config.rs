//! Runtime configuration
//!
//! Everything is read from the environment; there is no config file.

use std::path::PathBuf;

/// Page size used when the full material catalog is loaded
pub const DEFAULT_CATALOG_PAGE_SIZE: i64 = 100;

const MAX_CATALOG_PAGE_SIZE: i64 = 1000;

/// Get the database path from `PCM_DATABASE_PATH` or use `<project>/data/pcm.db`
pub fn database_path() -> PathBuf {
    std::env::var("PCM_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("pcm.db");
            path
        })
}

/// Page size for full-catalog loads, from `PCM_CATALOG_PAGE_SIZE`
pub fn catalog_page_size() -> i64 {
    parse_page_size(std::env::var("PCM_CATALOG_PAGE_SIZE").ok().as_deref())
}

fn parse_page_size(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.clamp(1, MAX_CATALOG_PAGE_SIZE))
        .unwrap_or(DEFAULT_CATALOG_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size(None), DEFAULT_CATALOG_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("250")), 250);
        assert_eq!(parse_page_size(Some(" 20 ")), 20);
        assert_eq!(parse_page_size(Some("0")), 1);
        assert_eq!(parse_page_size(Some("99999")), MAX_CATALOG_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("lots")), DEFAULT_CATALOG_PAGE_SIZE);
    }
}
