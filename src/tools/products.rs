//! Product MCP Tools
//!
//! Tools for adding products and viewing their cost breakdown.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::cost::{calculate_product_cost, CostDetail, LookupTable};
use crate::db::Database;
use crate::models::{MaterialId, MaterialRecord, Product, ProductCreate};

/// Response for add_product
#[derive(Debug, Serialize)]
pub struct AddProductResponse {
    pub id: i64,
    pub name: String,
    pub recipe_lines: usize,
    pub created_at: String,
}

/// Product with its computed cost
#[derive(Debug, Serialize)]
pub struct ProductCostResponse {
    pub id: i64,
    pub name: String,
    pub price_normal: Option<f64>,
    pub price_special: Option<f64>,
    pub recipe_lines: usize,
    pub total_cost: f64,
    pub details: Vec<CostDetail>,
    /// Recipe lines that could not be priced and are excluded from `total_cost`
    pub unresolved_lines: usize,
    /// Referenced catalog ids with no material on record
    pub missing_material_ids: Vec<MaterialId>,
}

/// Response for delete_product
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Add a product with its recipe
pub fn add_product(db: &Database, data: ProductCreate) -> Result<AddProductResponse, String> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err("Product name cannot be empty".to_string());
    }
    if let Some(recipe) = &data.recipe {
        for (index, item) in recipe.iter().enumerate() {
            if !item.quantity.is_finite() || item.quantity < 0.0 {
                return Err(format!("Recipe line {}: quantity cannot be negative", index));
            }
        }
    }
    let data = ProductCreate { name, ..data };

    let product = db
        .with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let product = Product::create(&tx, &data)?;
            tx.commit()?;
            Ok(product)
        })
        .map_err(|e| format!("Failed to create product: {}", e))?;

    tracing::info!(id = product.id, name = %product.name, "Product added");

    Ok(AddProductResponse {
        id: product.id,
        recipe_lines: product.recipe.as_ref().map_or(0, Vec::len),
        name: product.name,
        created_at: product.created_at,
    })
}

/// Load a product and price its recipe.
///
/// Only the materials the recipe references are fetched.
pub fn get_product_cost(db: &Database, id: i64) -> Result<Option<ProductCostResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(product) = Product::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get product: {}", e))?
    else {
        return Ok(None);
    };

    let referenced: BTreeSet<MaterialId> = product
        .recipe
        .iter()
        .flatten()
        .filter_map(|item| item.material_id)
        .collect();
    let referenced: Vec<MaterialId> = referenced.into_iter().collect();

    let records = MaterialRecord::get_by_dk_ids(&conn, &referenced)
        .map_err(|e| format!("Failed to load materials: {}", e))?;
    let table = LookupTable::build(records);

    tracing::debug!(
        product = %product.name,
        requested = referenced.len(),
        found = table.len(),
        "Materials loaded for cost calculation"
    );

    let cost = calculate_product_cost(&product, &table);
    let recipe_lines = product.recipe.as_ref().map_or(0, Vec::len);
    let missing_material_ids = referenced
        .into_iter()
        .filter(|id| !table.contains(*id))
        .collect();

    Ok(Some(ProductCostResponse {
        id: product.id,
        name: product.name,
        price_normal: product.price_normal,
        price_special: product.price_special,
        recipe_lines,
        total_cost: cost.total_cost,
        unresolved_lines: recipe_lines - cost.details.len(),
        details: cost.details,
        missing_material_ids,
    }))
}

/// Delete a product and its recipe
pub fn delete_product(db: &Database, id: i64) -> Result<DeleteProductResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = Product::delete(&conn, id).map_err(|e| format!("Failed to delete product: {}", e))?;

    if !deleted {
        return Err(format!("Product not found: {}", id));
    }

    Ok(DeleteProductResponse {
        success: true,
        deleted_id: id,
    })
}
