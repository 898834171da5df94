//! # Material Candidate Selector
//!
//! Stage one: shortlist materials that survive the operating temperature and
//! aerospace-grade requirements.
//!
//! Ranking favors thermal margin first, then price:
//! 1. `max_operating_temp_c` descending
//! 2. `cost_per_kg` ascending
//! 3. `name` ascending (total order, so output never depends on catalog order)

use crate::catalog::{Catalog, MaterialQuery};
use crate::decimal::Decimal;
use crate::primitives::MATERIAL_SHORTLIST_LIMIT;
use crate::types::{MaterialRecord, MachinistError};
use std::cmp::Ordering;

/// Selects and ranks material candidates from a catalog.
pub struct MaterialSelector<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> MaterialSelector<'a, C> {
    #[must_use]
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Up to [`MATERIAL_SHORTLIST_LIMIT`] materials rated for at least
    /// `min_temperature` whose aerospace grade equals `aerospace_required`.
    ///
    /// An empty vector means nothing qualified; it is not an error.
    pub fn select(
        &self,
        min_temperature: Decimal,
        aerospace_required: bool,
    ) -> Result<Vec<MaterialRecord>, MachinistError> {
        let query = MaterialQuery {
            min_temperature,
            aerospace_grade: aerospace_required,
        };
        let mut candidates = self.catalog.query_materials(&query)?;
        candidates.sort_by(rank_order);
        candidates.truncate(MATERIAL_SHORTLIST_LIMIT);
        Ok(candidates)
    }
}

/// Ordering used to rank material candidates.
#[must_use]
pub fn rank_order(a: &MaterialRecord, b: &MaterialRecord) -> Ordering {
    b.max_operating_temp_c
        .cmp(&a.max_operating_temp_c)
        .then_with(|| a.cost_per_kg.cmp(&b.cost_per_kg))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, MemoryCatalog};

    fn material(name: &str, temp: i64, cost: &str) -> MaterialRecord {
        MaterialRecord {
            name: name.to_string(),
            category: "Superalloy".to_string(),
            grade: String::new(),
            machinability_rating: Decimal::ZERO,
            tensile_strength_mpa: Decimal::ZERO,
            yield_strength_mpa: Decimal::ZERO,
            max_operating_temp_c: Decimal::from_int(temp),
            aerospace_grade: true,
            cost_per_kg: Decimal::parse(cost).expect("dec"),
        }
    }

    fn catalog(materials: Vec<MaterialRecord>) -> MemoryCatalog {
        MemoryCatalog::from_snapshot(CatalogSnapshot {
            materials,
            machines: vec![],
        })
    }

    #[test]
    fn shortlist_is_capped() {
        let materials = (0..8)
            .map(|i| material(&format!("M{i}"), 600 + i, "10"))
            .collect();
        let catalog = catalog(materials);

        let selected = MaterialSelector::new(&catalog)
            .select(Decimal::from_int(0), true)
            .expect("select");

        assert_eq!(selected.len(), MATERIAL_SHORTLIST_LIMIT);
        assert_eq!(selected[0].name, "M7");
        assert_eq!(selected[4].name, "M3");
    }

    #[test]
    fn equal_temperature_prefers_cheaper() {
        let catalog = catalog(vec![
            material("Dear", 650, "40"),
            material("Cheap", 650, "35.5"),
        ]);

        let selected = MaterialSelector::new(&catalog)
            .select(Decimal::from_int(650), true)
            .expect("select");

        let names: Vec<_> = selected.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cheap", "Dear"]);
    }

    #[test]
    fn nothing_qualifying_is_empty_not_error() {
        let catalog = catalog(vec![material("Inconel 718", 700, "40")]);

        let selected = MaterialSelector::new(&catalog)
            .select(Decimal::from_int(701), true)
            .expect("select");
        assert!(selected.is_empty());

        let selected = MaterialSelector::new(&catalog)
            .select(Decimal::from_int(0), false)
            .expect("select");
        assert!(selected.is_empty());
    }

    #[test]
    fn works_through_trait_object() {
        let catalog = catalog(vec![material("Inconel 718", 700, "40")]);
        let dynamic: &dyn Catalog = &catalog;

        let selected = MaterialSelector::new(dynamic)
            .select(Decimal::from_int(600), true)
            .expect("select");
        assert_eq!(selected.len(), 1);
    }
}
