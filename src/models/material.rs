//! Material model
//!
//! A purchased good priced per package. `MaterialRecord` is the row as stored;
//! `Material` is the validated form the cost engine works with.

use std::fmt;

use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::NameMatcher;

/// Catalog identifier that recipe lines use to reference a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub i64);

impl MaterialId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MaterialId {
    fn from(id: i64) -> Self {
        MaterialId(id)
    }
}

/// Material category. Both count toward product cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    #[serde(rename = "material", alias = "raw_material")]
    RawMaterial,
    #[serde(rename = "packaging")]
    Packaging,
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::RawMaterial => "material",
            MaterialCategory::Packaging => "packaging",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "material" | "raw_material" | "raw" => Some(MaterialCategory::RawMaterial),
            "packaging" => Some(MaterialCategory::Packaging),
            _ => None,
        }
    }
}

/// Unit that a package amount and recipe quantities are measured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageUnit {
    #[serde(rename = "g", alias = "gram")]
    Gram,
    #[serde(rename = "ml", alias = "milliliter")]
    Milliliter,
    #[serde(rename = "piece")]
    Piece,
}

impl PackageUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageUnit::Gram => "g",
            PackageUnit::Milliliter => "ml",
            PackageUnit::Piece => "piece",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(PackageUnit::Gram),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(PackageUnit::Milliliter)
            }
            "piece" | "pieces" | "pc" | "pcs" => Some(PackageUnit::Piece),
            _ => None,
        }
    }
}

impl fmt::Display for PackageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A material row as held by the record store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub row_id: i64,
    pub dk_id: Option<MaterialId>,
    pub name: String,
    pub category: MaterialCategory,
    pub package_amount: f64,
    pub package_unit: PackageUnit,
    pub package_price: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// A material that carries its catalog identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub category: MaterialCategory,
    pub package_amount: f64,
    pub package_unit: PackageUnit,
    pub package_price: f64,
}

/// Data for creating a new material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialCreate {
    pub dk_id: Option<MaterialId>,
    pub name: String,
    pub category: MaterialCategory,
    pub package_amount: f64,
    pub package_unit: PackageUnit,
    pub package_price: f64,
}

/// Gives the record back when it has no identifier
impl TryFrom<MaterialRecord> for Material {
    type Error = MaterialRecord;

    fn try_from(record: MaterialRecord) -> Result<Self, Self::Error> {
        match record.dk_id {
            Some(id) => Ok(Material {
                id,
                name: record.name,
                category: record.category,
                package_amount: record.package_amount,
                package_unit: record.package_unit,
                package_price: record.package_price,
            }),
            None => Err(record),
        }
    }
}

fn conversion_error(column: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unrecognized value '{}'", value).into(),
    )
}

impl MaterialRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        let unit: String = row.get("spec_unit")?;

        Ok(Self {
            row_id: row.get("id")?,
            dk_id: row.get::<_, Option<i64>>("dk_id")?.map(MaterialId),
            name: row.get("name")?,
            category: MaterialCategory::from_str(&category)
                .ok_or_else(|| conversion_error(3, category))?,
            package_amount: row.get("spec_amount")?,
            package_unit: PackageUnit::from_str(&unit)
                .ok_or_else(|| conversion_error(5, unit))?,
            package_price: row.get("spec_price")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new material
    pub fn create(conn: &Connection, data: &MaterialCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO materials (dk_id, name, category, spec_amount, spec_unit, spec_price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.dk_id.map(MaterialId::get),
                data.name,
                data.category.as_str(),
                data.package_amount,
                data.package_unit.as_str(),
                data.package_price,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_row_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a material by its storage row id
    pub fn get_by_row_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM materials WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a material by catalog id.
    ///
    /// With duplicate ids the most recently inserted row wins, matching
    /// how the lookup table resolves them.
    pub fn get_by_dk_id(conn: &Connection, dk_id: MaterialId) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM materials WHERE dk_id = ?1 ORDER BY id DESC LIMIT 1",
        )?;

        match stmt.query_row([dk_id.get()], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get every row whose catalog id is in `dk_ids`, in insertion order
    pub fn get_by_dk_ids(conn: &Connection, dk_ids: &[MaterialId]) -> DbResult<Vec<Self>> {
        if dk_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=dk_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT * FROM materials WHERE dk_id IN ({}) ORDER BY id",
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(dk_ids.iter().map(|id| id.get())), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Case-insensitive substring search on name
    pub fn search(conn: &Connection, keyword: &str, limit: i64) -> DbResult<Vec<Self>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let matcher = NameMatcher::new(keyword);
        let mut stmt = conn.prepare("SELECT * FROM materials ORDER BY name ASC")?;

        let mut records = Vec::new();
        for row in stmt.query_map([], Self::from_row)? {
            if records.len() >= limit {
                break;
            }
            let record = row?;
            if matcher.matches(&record.name) {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// One page of the catalog in insertion order
    pub fn list_page(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM materials ORDER BY id LIMIT ?1 OFFSET ?2")?;

        let records = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of products whose recipe references this catalog id
    pub fn get_usage_count(conn: &Connection, dk_id: MaterialId) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT product_id) FROM recipe_items WHERE material_dk_id = ?1",
            [dk_id.get()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
