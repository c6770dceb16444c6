//! Unit price and product cost calculation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Material, MaterialCategory, MaterialId, PackageUnit, Product};
use super::lookup::LookupTable;
use super::rounding::{round_cost, round_unit_price};

/// Cost calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("material {material_id} has a package amount of zero")]
    DivisionByZero { material_id: MaterialId },
}

/// One priced recipe line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDetail {
    pub material_name: String,
    pub quantity: f64,
    pub unit: PackageUnit,
    /// Rounded to 4 decimals
    pub unit_price: f64,
    /// Rounded to 2 decimals
    pub item_cost: f64,
    pub category: MaterialCategory,
}

/// Total cost and itemized breakdown for one product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInfo {
    pub total_cost: f64,
    pub details: Vec<CostDetail>,
}

/// Price of one unit (g, ml or piece) of a material, rounded to 4 decimals
pub fn calculate_unit_price(material: &Material) -> Result<f64, CostError> {
    package_unit_price(material.package_price, material.package_amount).ok_or(
        CostError::DivisionByZero {
            material_id: material.id,
        },
    )
}

/// Unit price from raw package figures; `None` for a zero amount
pub fn package_unit_price(package_price: f64, package_amount: f64) -> Option<f64> {
    if package_amount == 0.0 {
        return None;
    }
    Some(round_unit_price(package_price / package_amount))
}

/// Calculate a product's total cost and per-line breakdown.
///
/// Lines with no material id, an unknown material, or a zero package amount
/// are skipped with a warning and contribute nothing. The total is the sum
/// of unrounded line costs, rounded once.
pub fn calculate_product_cost(product: &Product, table: &LookupTable) -> CostInfo {
    let Some(recipe) = product.recipe.as_deref() else {
        return CostInfo::default();
    };

    let mut total = 0.0;
    let mut details = Vec::with_capacity(recipe.len());

    for (index, item) in recipe.iter().enumerate() {
        let Some(material_id) = item.material_id else {
            tracing::warn!(
                product = %product.name,
                recipe_index = index,
                "Invalid material id on recipe line"
            );
            continue;
        };

        let Some(material) = table.get(material_id) else {
            tracing::warn!(
                product = %product.name,
                recipe_index = index,
                material_id = %material_id,
                "Material not found"
            );
            continue;
        };

        let unit_price = match calculate_unit_price(material) {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(
                    product = %product.name,
                    recipe_index = index,
                    "Unit price unavailable: {}",
                    e
                );
                continue;
            }
        };

        let item_cost = item.quantity * unit_price;
        total += item_cost;

        details.push(CostDetail {
            material_name: material.name.clone(),
            quantity: item.quantity,
            unit: material.package_unit,
            unit_price,
            item_cost: round_cost(item_cost),
            category: material.category,
        });
    }

    CostInfo {
        total_cost: round_cost(total),
        details,
    }
}

/// Same as [`calculate_product_cost`], with a missing product costing nothing
pub fn calculate_optional_product_cost(product: Option<&Product>, table: &LookupTable) -> CostInfo {
    product
        .map(|p| calculate_product_cost(p, table))
        .unwrap_or_default()
}
