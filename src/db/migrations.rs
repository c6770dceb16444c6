//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MATERIALS
        -- Purchased goods, priced per package
        -- ============================================
        CREATE TABLE materials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dk_id INTEGER,                       -- catalog identifier used by recipes; may be missing
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('material', 'packaging')),
            spec_amount REAL NOT NULL,           -- quantity in one package
            spec_unit TEXT NOT NULL CHECK(spec_unit IN ('g', 'ml', 'piece')),
            spec_price REAL NOT NULL,            -- price of one package

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- dk_id is deliberately not UNIQUE: duplicates resolve last-write-wins at lookup time
        CREATE INDEX idx_materials_dk_id ON materials(dk_id);
        CREATE INDEX idx_materials_name ON materials(name);

        -- ============================================
        -- PRODUCTS
        -- ============================================
        CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price_normal REAL,
            price_special REAL,
            has_recipe INTEGER NOT NULL DEFAULT 1,  -- 0 when the source record had no usable recipe

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_products_name ON products(name);

        -- ============================================
        -- RECIPE ITEMS
        -- Bill of materials; no FK to materials, lines may dangle
        -- ============================================
        CREATE TABLE recipe_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,           -- recipe order
            material_dk_id INTEGER,              -- NULL when the source id was missing or invalid
            amount REAL NOT NULL,

            UNIQUE(product_id, position)
        );

        CREATE INDEX idx_recipe_items_product ON recipe_items(product_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
