//! Catalog ingestion
//!
//! Reads JSON catalog exports and converts them into validated create
//! payloads for the record store.

pub mod record;

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use record::{
    parse_material_id, parse_quantity, ParsedProduct, RawMaterial, RawProduct, RawRecipeItem,
};

/// Ingestion error types
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

/// A catalog export: `{ "materials": [...], "products": [...] }`.
///
/// Entries stay untyped so one malformed record does not reject the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub materials: Vec<Value>,
    #[serde(default)]
    pub products: Vec<Value>,
}

impl CatalogFile {
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Parse one material entry
pub fn parse_material(value: &Value) -> Result<crate::models::MaterialCreate, IngestError> {
    let raw: RawMaterial = serde_json::from_value(value.clone())?;
    raw.into_create()
}

/// Parse one product entry; bad recipe lines are dropped, not fatal
pub fn parse_product(value: &Value) -> Result<ParsedProduct, IngestError> {
    let raw: RawProduct = serde_json::from_value(value.clone())?;
    raw.into_create()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_file_defaults() {
        let file = CatalogFile::from_json("{}").unwrap();
        assert!(file.materials.is_empty());
        assert!(file.products.is_empty());
    }

    #[test]
    fn test_catalog_file_rejects_bad_json() {
        assert!(matches!(CatalogFile::from_json("[1, 2"), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_parse_entries() {
        let file = CatalogFile::from_json(
            r#"{
                "materials": [
                    {"dk_id": 1, "name": "Sugar", "category": "material", "spec_amount": 1000, "spec_unit": "g", "spec_price": 8},
                    {"dk_id": 2, "name": "Lid"}
                ],
                "products": [
                    {"name": "Lemon Tea", "recipe": [{"material_dk_id": 1, "amount": 15}]}
                ]
            }"#,
        )
        .unwrap();

        assert!(parse_material(&file.materials[0]).is_ok());
        assert!(matches!(parse_material(&file.materials[1]), Err(IngestError::Json(_))));
        let parsed = parse_product(&file.products[0]).unwrap();
        assert_eq!(parsed.product.recipe.map(|r| r.len()), Some(1));
        assert!(parsed.dropped_lines.is_empty());
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            CatalogFile::from_path("/nonexistent/catalog.json"),
            Err(IngestError::Io(_))
        ));
    }
}
