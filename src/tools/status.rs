//! PCM Status Tool
//!
//! Provides runtime status information about the PCM service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Cost lookup instructions for AI assistants
pub const COST_INSTRUCTIONS: &str = r#"
# PCM Cost Lookup Instructions

## Overview

- **Materials** are bought in packages. Each has a `dk_id` (catalog id), a
  package amount in `g`, `ml` or `piece`, and a package price.
- **Products** have a recipe: a list of `(dk_id, quantity)` lines, with the
  quantity in the material's unit.
- **Unit price** = package price / package amount, rounded to 4 decimals.
- **Item cost** = quantity x unit price, shown rounded to 2 decimals.
- **Total cost** = sum of unrounded item costs, rounded to 2 decimals once.
  Packaging counts toward the total like any other material.

## Workflow

1. `search_catalog(keyword)` finds products and materials by name. Every
   product hit includes `total_cost`, priced against the whole catalog.
2. `get_product_cost(id)` gives the itemized breakdown for one product.
3. `get_material(dk_id)` shows a material with its unit price.

## Reading a breakdown

Recipe lines are skipped, and left out of `total_cost`, when:
- the line has no usable `dk_id`,
- no material with that `dk_id` exists (listed in `missing_material_ids`),
- the material's package amount is zero.

`unresolved_lines` counts them. A non-zero value means the total is
understated; tell the user which materials are missing.

## Loading data

`import_catalog(file_path)` loads a JSON export shaped like
`{"materials": [...], "products": [...]}` using the document-store field
names (`dk_id`, `spec_amount`, `spec_unit`, `spec_price`,
`recipe[].material_dk_id`, `recipe[].amount`). Invalid records are skipped
and reported; the rest are imported in one transaction.
"#;

#[derive(Debug, Clone, Serialize)]
pub struct PcmStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self) -> PcmStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        PcmStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/pcm.db"));
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }
}
