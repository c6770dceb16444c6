//! Raw catalog records
//!
//! Shapes of the document-store export. Identifiers arrive loosely typed
//! (numbers, numeric strings, null) and are converted to `MaterialId` here,
//! so nothing downstream re-parses them.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    MaterialCategory, MaterialCreate, MaterialId, PackageUnit, ProductCreate, RecipeItem,
};
use super::IngestError;

/// Parse a loosely typed identifier.
///
/// Accepts integers, integral finite floats and numeric strings. Anything
/// else (null, fractions, NaN, text, booleans) yields `None`.
pub fn parse_material_id(value: &Value) -> Option<MaterialId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64))
            .map(MaterialId),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_f64))
                .map(MaterialId)
        }
        _ => None,
    }
}

/// Parse a loosely typed recipe quantity.
///
/// Accepts numbers and numeric strings that are finite and non-negative.
pub fn parse_quantity(value: &Value) -> Option<f64> {
    let quantity = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (quantity.is_finite() && quantity >= 0.0).then_some(quantity)
}

fn integral_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// A material as exported from the document store
#[derive(Debug, Clone, Deserialize)]
pub struct RawMaterial {
    #[serde(default)]
    pub dk_id: Value,
    pub name: String,
    pub category: String,
    pub spec_amount: f64,
    pub spec_unit: String,
    pub spec_price: f64,
}

impl RawMaterial {
    /// Validate and convert. A missing `dk_id` is allowed; the lookup table
    /// skips such records later.
    pub fn into_create(self) -> Result<MaterialCreate, IngestError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(IngestError::Invalid("material name cannot be empty".to_string()));
        }

        let category = MaterialCategory::from_str(&self.category).ok_or_else(|| {
            IngestError::Invalid(format!("material '{}': unknown category '{}'", name, self.category))
        })?;
        let package_unit = PackageUnit::from_str(&self.spec_unit).ok_or_else(|| {
            IngestError::Invalid(format!("material '{}': unknown unit '{}'", name, self.spec_unit))
        })?;

        if !self.spec_amount.is_finite() || self.spec_amount < 0.0 {
            return Err(IngestError::Invalid(format!(
                "material '{}': spec_amount must be a non-negative number",
                name
            )));
        }
        if !self.spec_price.is_finite() || self.spec_price < 0.0 {
            return Err(IngestError::Invalid(format!(
                "material '{}': spec_price must be a non-negative number",
                name
            )));
        }

        Ok(MaterialCreate {
            dk_id: parse_material_id(&self.dk_id),
            name: name.to_string(),
            category,
            package_amount: self.spec_amount,
            package_unit,
            package_price: self.spec_price,
        })
    }
}

/// A recipe line as exported
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecipeItem {
    #[serde(default)]
    pub material_dk_id: Value,
    #[serde(default)]
    pub amount: Value,
}

/// A product as exported
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub name: String,
    #[serde(default)]
    pub price_normal: Option<f64>,
    #[serde(default)]
    pub price_special: Option<f64>,
    /// Kept untyped: a missing or non-array recipe means "no recipe"
    #[serde(default)]
    pub recipe: Value,
}

/// A converted product plus the recipe lines that had to be dropped
#[derive(Debug, Clone)]
pub struct ParsedProduct {
    pub product: ProductCreate,
    /// One message per dropped recipe line
    pub dropped_lines: Vec<String>,
}

impl RawProduct {
    /// Validate and convert.
    ///
    /// Only an empty name rejects the product. A recipe line that is not an
    /// object or has no usable amount is dropped on its own and reported in
    /// `dropped_lines`.
    pub fn into_create(self) -> Result<ParsedProduct, IngestError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(IngestError::Invalid("product name cannot be empty".to_string()));
        }

        let mut dropped_lines = Vec::new();
        let recipe = match self.recipe {
            Value::Array(lines) => {
                let mut items = Vec::with_capacity(lines.len());
                for (index, line) in lines.into_iter().enumerate() {
                    let raw: RawRecipeItem = match serde_json::from_value(line) {
                        Ok(raw) => raw,
                        Err(e) => {
                            tracing::warn!(product = %name, recipe_index = index, "Dropping recipe line: {}", e);
                            dropped_lines.push(format!("product '{}': recipe line {}: {}", name, index, e));
                            continue;
                        }
                    };

                    let Some(quantity) = parse_quantity(&raw.amount) else {
                        tracing::warn!(
                            product = %name,
                            recipe_index = index,
                            raw_amount = %raw.amount,
                            "Dropping recipe line without a usable amount"
                        );
                        dropped_lines.push(format!(
                            "product '{}': recipe line {}: amount must be a non-negative number, got {}",
                            name, index, raw.amount
                        ));
                        continue;
                    };

                    let material_id = parse_material_id(&raw.material_dk_id);
                    if material_id.is_none() {
                        tracing::warn!(
                            product = %name,
                            recipe_index = index,
                            raw_id = %raw.material_dk_id,
                            "Recipe line has no usable material_dk_id"
                        );
                    }

                    items.push(RecipeItem {
                        material_id,
                        quantity,
                    });
                }
                Some(items)
            }
            _ => None,
        };

        Ok(ParsedProduct {
            product: ProductCreate {
                name: name.to_string(),
                price_normal: self.price_normal,
                price_special: self.price_special,
                recipe,
            },
            dropped_lines,
        })
    }
}
