//! Data models
//!
//! Rust structs representing catalog records and their storage.

mod material;
mod product;

pub use material::{
    Material, MaterialCategory, MaterialCreate, MaterialId, MaterialRecord, PackageUnit,
};
pub use product::{Product, ProductCreate, RecipeItem};

/// Case-insensitive substring match on names.
///
/// Folds case with `str::to_lowercase`, so non-ASCII letters match too,
/// which SQLite's `LIKE` and `LOWER()` do not handle.
#[derive(Debug, Clone)]
pub(crate) struct NameMatcher {
    needle: String,
}

impl NameMatcher {
    pub(crate) fn new(keyword: &str) -> Self {
        Self {
            needle: keyword.to_lowercase(),
        }
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
    }
}
