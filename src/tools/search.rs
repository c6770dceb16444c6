//! Catalog search tool
//!
//! Keyword search over products and materials. Product costs are computed
//! against the full material catalog, not just the materials that matched.

use rusqlite::Connection;
use serde::Serialize;

use crate::cost::{calculate_product_cost, LookupTable};
use crate::db::{Database, DbResult};
use crate::models::{MaterialRecord, Product};
use super::materials::MaterialSummary;

/// Maximum hits returned per collection
const SEARCH_LIMIT: i64 = 100;

/// A product search hit with its computed cost
#[derive(Debug, Serialize)]
pub struct ProductHit {
    pub id: i64,
    pub name: String,
    pub price_normal: Option<f64>,
    pub price_special: Option<f64>,
    pub total_cost: f64,
}

/// Response for search_catalog
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub keyword: String,
    pub products: Vec<ProductHit>,
    pub materials: Vec<MaterialSummary>,
    /// Material records loaded to price the product hits
    pub catalog_size: usize,
}

/// Load every material record, `page_size` rows at a time.
///
/// Stops at the first page shorter than `page_size`.
pub fn load_full_catalog(conn: &Connection, page_size: i64) -> DbResult<Vec<MaterialRecord>> {
    let page_size = page_size.max(1);
    let mut all = Vec::new();
    let mut offset = 0;

    loop {
        let batch = MaterialRecord::list_page(conn, page_size, offset)?;
        let fetched = batch.len() as i64;
        all.extend(batch);

        if fetched < page_size {
            break;
        }
        offset += page_size;
    }

    Ok(all)
}

/// Search products and materials by name
pub fn search_catalog(db: &Database, keyword: &str, page_size: i64) -> Result<SearchResponse, String> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err("Search keyword cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let products = Product::search(&conn, keyword, SEARCH_LIMIT)
        .map_err(|e| format!("Failed to search products: {}", e))?;
    let materials = MaterialRecord::search(&conn, keyword, SEARCH_LIMIT)
        .map_err(|e| format!("Failed to search materials: {}", e))?;

    let catalog = load_full_catalog(&conn, page_size)
        .map_err(|e| format!("Failed to load material catalog: {}", e))?;
    let catalog_size = catalog.len();
    let table = LookupTable::build(catalog);

    tracing::info!(
        keyword,
        catalog_size,
        indexed = table.len(),
        "Loaded material catalog for cost calculation"
    );

    let products = products
        .iter()
        .map(|product| ProductHit {
            id: product.id,
            name: product.name.clone(),
            price_normal: product.price_normal,
            price_special: product.price_special,
            total_cost: calculate_product_cost(product, &table).total_cost,
        })
        .collect();

    Ok(SearchResponse {
        keyword: keyword.to_string(),
        products,
        materials: materials.iter().map(MaterialSummary::from).collect(),
        catalog_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{MaterialCategory, MaterialCreate, MaterialId, PackageUnit, ProductCreate, RecipeItem};

    fn material(dk_id: i64, name: &str, amount: f64, price: f64) -> MaterialCreate {
        MaterialCreate {
            dk_id: Some(MaterialId(dk_id)),
            name: name.to_string(),
            category: MaterialCategory::RawMaterial,
            package_amount: amount,
            package_unit: PackageUnit::Gram,
            package_price: price,
        }
    }

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            MaterialRecord::create(conn, &material(1, "Jasmine Tea Leaves", 500.0, 60.0))?;
            MaterialRecord::create(conn, &material(2, "Cane Sugar", 1000.0, 10.0))?;
            Product::create(
                conn,
                &ProductCreate {
                    name: "Jasmine Milk Tea".to_string(),
                    price_normal: Some(18.0),
                    price_special: Some(15.0),
                    recipe: Some(vec![
                        RecipeItem { material_id: Some(MaterialId(1)), quantity: 10.0 },
                        RecipeItem { material_id: Some(MaterialId(2)), quantity: 30.0 },
                    ]),
                },
            )?;
            Ok(())
        })
        .unwrap();
        db
    }

    #[test]
    fn test_empty_keyword_is_rejected() {
        let db = setup();
        assert!(search_catalog(&db, "   ", 100).is_err());
    }

    #[test]
    fn test_product_cost_uses_full_catalog() {
        let db = setup();
        // "sugar" is not in the keyword, yet it must be priced
        let result = search_catalog(&db, "JASMINE", 100).unwrap();

        assert_eq!(result.products.len(), 1);
        assert_eq!(result.materials.len(), 1);
        // 10 * 0.12 + 30 * 0.01
        assert_eq!(result.products[0].total_cost, 1.5);
        assert_eq!(result.catalog_size, 2);
        assert_eq!(result.materials[0].unit_price, Some(0.12));
    }

    #[test]
    fn test_small_pages_still_load_everything() {
        let db = setup();
        db.with_conn(|conn| {
            for i in 10..15 {
                MaterialRecord::create(conn, &material(i, "Filler", 1.0, 1.0))?;
            }
            Ok(())
        })
        .unwrap();

        let result = search_catalog(&db, "milk tea", 2).unwrap();
        assert_eq!(result.catalog_size, 7);
        assert_eq!(result.products[0].total_cost, 1.5);
        assert!(result.materials.is_empty());
    }

    #[test]
    fn test_material_without_dk_id_still_priced() {
        let db = setup();
        db.with_conn(|conn| {
            let mut straw = material(0, "Paper Straw", 100.0, 5.0);
            straw.dk_id = None;
            MaterialRecord::create(conn, &straw)?;
            Ok(())
        })
        .unwrap();

        let result = search_catalog(&db, "straw", 100).unwrap();
        assert_eq!(result.materials.len(), 1);
        assert_eq!(result.materials[0].dk_id, None);
        assert_eq!(result.materials[0].unit_price, Some(0.05));
    }

    #[test]
    fn test_search_folds_accented_names() {
        let db = setup();
        db.with_conn(|conn| {
            MaterialRecord::create(conn, &material(3, "Éclair Crème", 200.0, 30.0))?;
            Product::create(
                conn,
                &ProductCreate {
                    name: "Crème Brûlée Latte".to_string(),
                    recipe: Some(vec![RecipeItem { material_id: Some(MaterialId(3)), quantity: 20.0 }]),
                    ..Default::default()
                },
            )?;
            Ok(())
        })
        .unwrap();

        let result = search_catalog(&db, "éclair crème", 100).unwrap();
        assert_eq!(result.materials.len(), 1);

        let result = search_catalog(&db, "CRÈME BRÛLÉE", 100).unwrap();
        assert_eq!(result.products.len(), 1);
        // 20 * 0.15
        assert_eq!(result.products[0].total_cost, 3.0);
    }

    #[test]
    fn test_load_full_catalog_exact_page_boundary() {
        let db = setup();
        let all = db.with_conn(|conn| load_full_catalog(conn, 2)).unwrap();
        assert_eq!(all.len(), 2);

        let all = db.with_conn(|conn| load_full_catalog(conn, 1)).unwrap();
        assert_eq!(all.len(), 2);
    }
}
