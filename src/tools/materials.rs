//! Material MCP Tools
//!
//! Tools for adding, viewing, and listing catalog materials.

use serde::Serialize;

use crate::cost::package_unit_price;
use crate::db::Database;
use crate::models::{MaterialCategory, MaterialCreate, MaterialId, MaterialRecord, PackageUnit};

/// Summary of a material for list/search results
#[derive(Debug, Serialize)]
pub struct MaterialSummary {
    pub dk_id: Option<MaterialId>,
    pub name: String,
    pub category: MaterialCategory,
    pub package_amount: f64,
    pub package_unit: PackageUnit,
    pub package_price: f64,
    /// `None` for a zero package amount
    pub unit_price: Option<f64>,
}

impl From<&MaterialRecord> for MaterialSummary {
    fn from(record: &MaterialRecord) -> Self {
        Self {
            dk_id: record.dk_id,
            name: record.name.clone(),
            category: record.category,
            package_amount: record.package_amount,
            package_unit: record.package_unit,
            package_price: record.package_price,
            unit_price: record_unit_price(record),
        }
    }
}

fn record_unit_price(record: &MaterialRecord) -> Option<f64> {
    let price = package_unit_price(record.package_price, record.package_amount);
    if price.is_none() {
        tracing::debug!(row_id = record.row_id, "Unit price unavailable: package amount is zero");
    }
    price
}

/// Full material detail
#[derive(Debug, Serialize)]
pub struct MaterialDetail {
    pub row_id: i64,
    #[serde(flatten)]
    pub summary: MaterialSummary,
    pub used_in_products: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Response for add_material
#[derive(Debug, Serialize)]
pub struct AddMaterialResponse {
    pub row_id: i64,
    pub dk_id: Option<MaterialId>,
    pub name: String,
    pub unit_price: Option<f64>,
    pub created_at: String,
}

/// Response for list_materials
#[derive(Debug, Serialize)]
pub struct ListMaterialsResponse {
    pub items: Vec<MaterialSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Add a new material
pub fn add_material(db: &Database, data: MaterialCreate) -> Result<AddMaterialResponse, String> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err("Material name cannot be empty".to_string());
    }
    if !data.package_amount.is_finite() || data.package_amount <= 0.0 {
        return Err("package_amount must be greater than 0".to_string());
    }
    if !data.package_price.is_finite() || data.package_price < 0.0 {
        return Err("package_price cannot be negative".to_string());
    }

    let data = MaterialCreate { name, ..data };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let record = MaterialRecord::create(&conn, &data)
        .map_err(|e| format!("Failed to create material: {}", e))?;

    tracing::info!(row_id = record.row_id, dk_id = ?record.dk_id, "Material added");

    Ok(AddMaterialResponse {
        row_id: record.row_id,
        dk_id: record.dk_id,
        unit_price: record_unit_price(&record),
        name: record.name,
        created_at: record.created_at,
    })
}

/// Get a material by catalog id
pub fn get_material(db: &Database, dk_id: i64) -> Result<Option<MaterialDetail>, String> {
    let dk_id = MaterialId(dk_id);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(record) = MaterialRecord::get_by_dk_id(&conn, dk_id)
        .map_err(|e| format!("Failed to get material: {}", e))?
    else {
        return Ok(None);
    };

    let used_in_products = MaterialRecord::get_usage_count(&conn, dk_id)
        .map_err(|e| format!("Failed to count usage: {}", e))?;

    Ok(Some(MaterialDetail {
        row_id: record.row_id,
        summary: MaterialSummary::from(&record),
        used_in_products,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }))
}

/// List materials in catalog order
pub fn list_materials(db: &Database, limit: i64, offset: i64) -> Result<ListMaterialsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let records = MaterialRecord::list_page(&conn, limit, offset)
        .map_err(|e| format!("Failed to list materials: {}", e))?;
    let total = MaterialRecord::count(&conn)
        .map_err(|e| format!("Failed to count materials: {}", e))?;

    Ok(ListMaterialsResponse {
        items: records.iter().map(MaterialSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn cup(dk_id: Option<i64>, amount: f64) -> MaterialCreate {
        MaterialCreate {
            dk_id: dk_id.map(MaterialId),
            name: "  Paper Cup ".to_string(),
            category: MaterialCategory::Packaging,
            package_amount: amount,
            package_unit: PackageUnit::Piece,
            package_price: 25.0,
        }
    }

    #[test]
    fn test_add_material_validates() {
        let db = setup();
        assert!(add_material(&db, cup(Some(1), 0.0)).is_err());
        let mut blank = cup(Some(1), 50.0);
        blank.name = "   ".to_string();
        assert!(add_material(&db, blank).is_err());

        let added = add_material(&db, cup(Some(1), 50.0)).unwrap();
        assert_eq!(added.name, "Paper Cup");
        assert_eq!(added.unit_price, Some(0.5));
    }

    #[test]
    fn test_get_material() {
        let db = setup();
        add_material(&db, cup(Some(4), 100.0)).unwrap();

        let detail = get_material(&db, 4).unwrap().unwrap();
        assert_eq!(detail.summary.unit_price, Some(0.25));
        assert_eq!(detail.used_in_products, 0);
        assert!(get_material(&db, 5).unwrap().is_none());
    }

    #[test]
    fn test_summary_without_dk_id_has_unit_price() {
        let db = setup();
        let added = add_material(&db, cup(None, 100.0)).unwrap();
        assert_eq!(added.unit_price, Some(0.25));

        let listed = list_materials(&db, 10, 0).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].dk_id, None);
        assert_eq!(listed.items[0].unit_price, Some(0.25));
    }

    #[test]
    fn test_list_materials_clamps_limit() {
        let db = setup();
        let listed = list_materials(&db, 0, -5).unwrap();
        assert_eq!(listed.limit, 1);
        assert_eq!(listed.offset, 0);
        assert!(listed.items.is_empty());
    }
}
