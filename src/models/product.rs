//! Product model
//!
//! A sellable item with its bill of materials (recipe).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{MaterialId, NameMatcher};

/// One line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    /// `None` when the source record's identifier was missing or not numeric
    pub material_id: Option<MaterialId>,
    /// Quantity in the referenced material's unit
    pub quantity: f64,
}

/// A product with its recipe loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price_normal: Option<f64>,
    pub price_special: Option<f64>,
    /// `None` when the product has no usable recipe
    pub recipe: Option<Vec<RecipeItem>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price_normal: Option<f64>,
    pub price_special: Option<f64>,
    pub recipe: Option<Vec<RecipeItem>>,
}

impl Product {
    /// Create from a database row. The recipe is loaded separately.
    fn from_row(row: &Row) -> rusqlite::Result<(Self, bool)> {
        let product = Self {
            id: row.get("id")?,
            name: row.get("name")?,
            price_normal: row.get("price_normal")?,
            price_special: row.get("price_special")?,
            recipe: None,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        };
        let has_recipe = row.get::<_, i32>("has_recipe")? != 0;
        Ok((product, has_recipe))
    }

    fn with_recipe(conn: &Connection, (mut product, has_recipe): (Self, bool)) -> DbResult<Self> {
        if has_recipe {
            product.recipe = Some(Self::get_recipe(conn, product.id)?);
        }
        Ok(product)
    }

    /// Insert a product and its recipe lines.
    ///
    /// Not transactional on its own; callers that need atomicity pass a
    /// `Transaction` (it derefs to `Connection`).
    pub fn create(conn: &Connection, data: &ProductCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO products (name, price_normal, price_special, has_recipe)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                data.name,
                data.price_normal,
                data.price_special,
                data.recipe.is_some() as i32,
            ],
        )?;

        let id = conn.last_insert_rowid();

        if let Some(recipe) = &data.recipe {
            let mut stmt = conn.prepare(
                r#"
                INSERT INTO recipe_items (product_id, position, material_dk_id, amount)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for (position, item) in recipe.iter().enumerate() {
                stmt.execute(params![
                    id,
                    position as i64,
                    item.material_id.map(MaterialId::get),
                    item.quantity,
                ])?;
            }
        }

        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a product by ID, recipe included
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products WHERE id = ?1")?;

        let row = match stmt.query_row([id], Self::from_row) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Self::with_recipe(conn, row)?))
    }

    /// Recipe lines in stored order
    pub fn get_recipe(conn: &Connection, product_id: i64) -> DbResult<Vec<RecipeItem>> {
        let mut stmt = conn.prepare(
            "SELECT material_dk_id, amount FROM recipe_items WHERE product_id = ?1 ORDER BY position",
        )?;

        let items = stmt
            .query_map([product_id], |row| {
                Ok(RecipeItem {
                    material_id: row.get::<_, Option<i64>>(0)?.map(MaterialId),
                    quantity: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Case-insensitive substring search on name
    pub fn search(conn: &Connection, keyword: &str, limit: i64) -> DbResult<Vec<Self>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let matcher = NameMatcher::new(keyword);
        let mut stmt = conn.prepare("SELECT * FROM products ORDER BY name ASC")?;

        let mut rows = Vec::new();
        for row in stmt.query_map([], Self::from_row)? {
            if rows.len() >= limit {
                break;
            }
            let row = row?;
            if matcher.matches(&row.0.name) {
                rows.push(row);
            }
        }

        rows.into_iter()
            .map(|row| Self::with_recipe(conn, row))
            .collect()
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a product; recipe lines cascade.
    /// Returns Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn latte() -> ProductCreate {
        ProductCreate {
            name: "Oat Latte".to_string(),
            price_normal: Some(28.0),
            price_special: None,
            recipe: Some(vec![
                RecipeItem { material_id: Some(MaterialId(2)), quantity: 200.0 },
                RecipeItem { material_id: None, quantity: 5.0 },
                RecipeItem { material_id: Some(MaterialId(1)), quantity: 18.0 },
            ]),
        }
    }

    #[test]
    fn test_create_preserves_recipe_order() {
        let conn = setup();
        let product = Product::create(&conn, &latte()).unwrap();

        let recipe = product.recipe.unwrap();
        assert_eq!(recipe.len(), 3);
        assert_eq!(recipe[0].material_id, Some(MaterialId(2)));
        assert_eq!(recipe[1].material_id, None);
        assert_eq!(recipe[2].quantity, 18.0);
        assert_eq!(product.price_normal, Some(28.0));
    }

    #[test]
    fn test_product_without_recipe_loads_none() {
        let conn = setup();
        let data = ProductCreate { name: "Gift Card".to_string(), ..Default::default() };
        let product = Product::create(&conn, &data).unwrap();
        assert!(product.recipe.is_none());

        let data = ProductCreate {
            name: "Empty".to_string(),
            recipe: Some(Vec::new()),
            ..Default::default()
        };
        let product = Product::create(&conn, &data).unwrap();
        assert_eq!(product.recipe, Some(Vec::new()));
    }

    #[test]
    fn test_search_and_delete() {
        let conn = setup();
        let product = Product::create(&conn, &latte()).unwrap();
        Product::create(&conn, &ProductCreate { name: "Black Tea".to_string(), ..Default::default() }).unwrap();

        let hits = Product::search(&conn, "latte", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].recipe.as_ref().map(Vec::len), Some(3));

        assert!(Product::delete(&conn, product.id).unwrap());
        assert!(!Product::delete(&conn, product.id).unwrap());
        assert_eq!(Product::count(&conn).unwrap(), 1);
        assert!(Product::get_recipe(&conn, product.id).unwrap().is_empty());
    }
}
