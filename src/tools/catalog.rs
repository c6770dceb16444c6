//! Catalog import tool
//!
//! Loads a JSON catalog export into the record store in one transaction.

use serde::Serialize;

use crate::db::Database;
use crate::ingest::{parse_material, parse_product, CatalogFile};
use crate::models::{MaterialRecord, Product};

/// Response for import_catalog
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub materials_imported: i64,
    /// Imported but unreachable from recipes until they get a dk_id
    pub materials_without_id: i64,
    pub products_imported: i64,
    /// Recipe lines dropped from otherwise valid products
    pub recipe_lines_dropped: i64,
    pub skipped: i64,
    pub errors: Vec<String>,
}

/// Import every valid record; invalid ones are skipped and reported
pub fn import_catalog(db: &Database, catalog: &CatalogFile) -> Result<ImportSummary, String> {
    let mut summary = ImportSummary::default();

    let mut materials = Vec::with_capacity(catalog.materials.len());
    for (index, value) in catalog.materials.iter().enumerate() {
        match parse_material(value) {
            Ok(data) => materials.push(data),
            Err(e) => {
                tracing::warn!(index, "Skipping material: {}", e);
                summary.errors.push(format!("materials[{}]: {}", index, e));
                summary.skipped += 1;
            }
        }
    }

    let mut products = Vec::with_capacity(catalog.products.len());
    for (index, value) in catalog.products.iter().enumerate() {
        match parse_product(value) {
            Ok(parsed) => {
                for message in parsed.dropped_lines {
                    summary.errors.push(format!("products[{}]: {}", index, message));
                    summary.recipe_lines_dropped += 1;
                }
                products.push(parsed.product);
            }
            Err(e) => {
                tracing::warn!(index, "Skipping product: {}", e);
                summary.errors.push(format!("products[{}]: {}", index, e));
                summary.skipped += 1;
            }
        }
    }

    db.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        for data in &materials {
            MaterialRecord::create(&tx, data)?;
            summary.materials_imported += 1;
            if data.dk_id.is_none() {
                summary.materials_without_id += 1;
            }
        }
        for data in &products {
            Product::create(&tx, data)?;
            summary.products_imported += 1;
        }
        tx.commit()?;
        Ok(())
    })
    .map_err(|e| format!("Import failed: {}", e))?;

    tracing::info!(
        materials = summary.materials_imported,
        products = summary.products_imported,
        skipped = summary.skipped,
        "Catalog imported"
    );

    Ok(summary)
}

/// Read a catalog file from disk and import it
pub fn import_catalog_file(db: &Database, file_path: &str) -> Result<ImportSummary, String> {
    let catalog = CatalogFile::from_path(file_path)
        .map_err(|e| format!("Failed to load '{}': {}", file_path, e))?;
    import_catalog(db, &catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::MaterialId;
    use crate::tools::products::get_product_cost;

    const CATALOG: &str = r#"{
        "materials": [
            {"_id": "a1", "dk_id": 1, "name": "Black Tea", "category": "material", "spec_amount": 500, "spec_unit": "g", "spec_price": 40},
            {"_id": "a2", "dk_id": "2", "name": "Cup 500ml", "category": "packaging", "spec_amount": 50, "spec_unit": "piece", "spec_price": 20},
            {"_id": "a3", "name": "Mystery", "category": "material", "spec_amount": 1, "spec_unit": "g", "spec_price": 1},
            {"_id": "a4", "dk_id": 4, "name": "Bad Unit", "category": "material", "spec_amount": 1, "spec_unit": "tbsp", "spec_price": 1}
        ],
        "products": [
            {"_id": "p1", "name": "Black Tea", "price_normal": 12, "recipe": [
                {"material_dk_id": 1, "amount": 8},
                {"material_dk_id": "2", "amount": 1},
                {"material_dk_id": null, "amount": 3}
            ]},
            {"_id": "p2", "name": "No Recipe"},
            {"_id": "p3", "recipe": []}
        ]
    }"#;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_import_catalog() {
        let db = setup();
        let catalog = CatalogFile::from_json(CATALOG).unwrap();
        let summary = import_catalog(&db, &catalog).unwrap();

        assert_eq!(summary.materials_imported, 3);
        assert_eq!(summary.materials_without_id, 1);
        assert_eq!(summary.products_imported, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.recipe_lines_dropped, 0);
        assert_eq!(summary.errors.len(), 2);

        let stored = db
            .with_conn(|conn| MaterialRecord::get_by_dk_id(conn, MaterialId(2)))
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Cup 500ml");
    }

    #[test]
    fn test_imported_product_is_priced() {
        let db = setup();
        import_catalog(&db, &CatalogFile::from_json(CATALOG).unwrap()).unwrap();

        let first_id = db
            .with_conn(|conn| Ok(Product::search(conn, "black tea", 10)?[0].id))
            .unwrap();
        let cost = get_product_cost(&db, first_id).unwrap().unwrap();

        // 8 * 0.08 + 1 * 0.4
        assert_eq!(cost.total_cost, 1.04);
        assert_eq!(cost.details.len(), 2);
        assert_eq!(cost.unresolved_lines, 1);
    }

    #[test]
    fn test_bad_recipe_line_keeps_product() {
        let db = setup();
        let catalog = CatalogFile::from_json(
            r#"{
                "materials": [
                    {"dk_id": 1, "name": "Green Tea", "category": "material", "spec_amount": 500, "spec_unit": "g", "spec_price": 40},
                    {"dk_id": 2, "name": "Honey", "category": "material", "spec_amount": 1000, "spec_unit": "g", "spec_price": 50}
                ],
                "products": [
                    {"name": "Honey Green Tea", "recipe": [
                        {"material_dk_id": 1, "amount": 8},
                        {"material_dk_id": 2, "amount": "5"},
                        {"material_dk_id": 2, "amount": null}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let summary = import_catalog(&db, &catalog).unwrap();
        assert_eq!(summary.products_imported, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.recipe_lines_dropped, 1);
        assert_eq!(summary.errors.len(), 1);

        let id = db
            .with_conn(|conn| Ok(Product::search(conn, "honey green", 10)?[0].id))
            .unwrap();
        let cost = get_product_cost(&db, id).unwrap().unwrap();
        // 8 * 0.08 + 5 * 0.05
        assert_eq!(cost.total_cost, 0.89);
        assert_eq!(cost.recipe_lines, 2);
    }

    #[test]
    fn test_import_missing_file() {
        let db = setup();
        assert!(import_catalog_file(&db, "/nonexistent/catalog.json").is_err());
    }
}
