//! Material lookup table
//!
//! Index from catalog id to material, built once per computation batch.

use std::collections::HashMap;

use crate::models::{Material, MaterialId, MaterialRecord};

/// Materials keyed by catalog id
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    materials: HashMap<MaterialId, Material>,
}

impl LookupTable {
    /// Build from raw records.
    ///
    /// Records without an id are skipped with a warning. A later record with
    /// an id already seen replaces the earlier one.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MaterialRecord>,
    {
        let records = records.into_iter();
        let mut materials = HashMap::with_capacity(records.size_hint().0);

        for record in records {
            match Material::try_from(record) {
                Ok(material) => {
                    materials.insert(material.id, material);
                }
                Err(record) => {
                    tracing::warn!(
                        row_id = record.row_id,
                        name = %record.name,
                        "Skipping material without dk_id"
                    );
                }
            }
        }

        Self { materials }
    }

    /// Build from borrowed records, leaving the input untouched
    pub fn from_records(records: &[MaterialRecord]) -> Self {
        Self::build(records.iter().cloned())
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.materials.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MaterialId, &Material)> {
        self.materials.iter()
    }
}

impl FromIterator<MaterialRecord> for LookupTable {
    fn from_iter<T: IntoIterator<Item = MaterialRecord>>(iter: T) -> Self {
        Self::build(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialCategory, PackageUnit};

    fn record(row_id: i64, dk_id: Option<i64>, name: &str, price: f64) -> MaterialRecord {
        MaterialRecord {
            row_id,
            dk_id: dk_id.map(MaterialId),
            name: name.to_string(),
            category: MaterialCategory::RawMaterial,
            package_amount: 500.0,
            package_unit: PackageUnit::Gram,
            package_price: price,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_build_empty() {
        let table = LookupTable::build(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_build_keys_by_dk_id() {
        let table = LookupTable::build(vec![
            record(1, Some(10), "Sugar", 5.0),
            record(2, Some(20), "Milk", 8.0),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(MaterialId(10)).map(|m| m.name.as_str()), Some("Sugar"));
        assert_eq!(table.get(MaterialId(20)).map(|m| m.name.as_str()), Some("Milk"));
        assert!(!table.contains(MaterialId(1)));
    }

    #[test]
    fn test_build_skips_records_without_id() {
        let table = LookupTable::build(vec![
            record(1, None, "Orphan", 1.0),
            record(2, Some(3), "Cup", 0.5),
        ]);

        assert_eq!(table.len(), 1);
        assert!(table.iter().all(|(_, m)| m.name != "Orphan"));
    }

    #[test]
    fn test_build_last_duplicate_wins() {
        let table = LookupTable::build(vec![
            record(1, Some(4), "Cream (old)", 10.0),
            record(2, Some(4), "Cream", 12.0),
        ]);

        assert_eq!(table.len(), 1);
        let cream = table.get(MaterialId(4)).unwrap();
        assert_eq!(cream.name, "Cream");
        assert_eq!(cream.package_price, 12.0);
    }

    #[test]
    fn test_from_records_leaves_input_intact() {
        let records = vec![record(1, Some(1), "Tea", 30.0), record(2, None, "Loose", 1.0)];
        let table = LookupTable::from_records(&records);

        assert_eq!(table.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].dk_id, None);
    }

    #[test]
    fn test_collect_into_table() {
        let table: LookupTable = vec![record(1, Some(8), "Lid", 0.1)].into_iter().collect();
        assert!(table.contains(MaterialId(8)));
    }
}
