//! # Selection Scenarios
//!
//! End-to-end runs of both selection stages over small catalogs.
//!
//! ## Groups
//! - Materials: filtering, ranking, shortlist limit
//! - Machines: hard filter, soft filters, no-match reporting
//! - Pipeline: material category feeding machine selection, sanitized output

use machinist_core::{
    Catalog, CatalogSnapshot, Decimal, FilterStage, MachineRequirements, MachineRow,
    MachineSelection, MachineSelector, MaterialRecord, MaterialSelector, MemoryCatalog,
    PlainSelection, sanitize,
};

fn dec(text: &str) -> Decimal {
    Decimal::parse(text).expect("decimal")
}

fn material(name: &str, category: &str, temp: &str, aerospace: bool, cost: &str) -> MaterialRecord {
    MaterialRecord {
        name: name.to_string(),
        category: category.to_string(),
        grade: String::new(),
        machinability_rating: dec("0.2"),
        tensile_strength_mpa: dec("1000"),
        yield_strength_mpa: dec("800"),
        max_operating_temp_c: dec(temp),
        aerospace_grade: aerospace,
        cost_per_kg: dec(cost),
    }
}

struct MachineFixture<'a> {
    id: &'a str,
    categories: &'a str,
    tolerance: &'a str,
    geometry: &'a [&'a str],
    finish: &'a str,
    features: &'a [&'a str],
    status: &'a str,
}

impl MachineFixture<'_> {
    fn row(&self) -> MachineRow {
        MachineRow {
            id: self.id.to_string(),
            supported_material_categories: self.categories.to_string(),
            max_tolerance_mm: dec(self.tolerance),
            geometry_capability: self.geometry.iter().map(|s| s.to_string()).collect(),
            surface_finish_capability: Some(self.finish.to_string()),
            special_features: self.features.iter().map(|s| s.to_string()).collect(),
            status: self.status.to_string(),
        }
    }
}

const FIVE_AXIS: MachineFixture<'static> = MachineFixture {
    id: "DMU-50",
    categories: "Superalloy, Titanium",
    tolerance: "0.02",
    geometry: &["freeform"],
    finish: "mirror",
    features: &["5-axis"],
    status: "available",
};

fn catalog(materials: Vec<MaterialRecord>, machines: Vec<MachineRow>) -> MemoryCatalog {
    MemoryCatalog::from_snapshot(CatalogSnapshot {
        materials,
        machines,
    })
}

// =============================================================================
// MATERIALS
// =============================================================================

mod materials {
    use super::*;

    /// Aerospace materials ranked by temperature, then price.
    #[test]
    fn ranked_by_temperature_then_cost() {
        let catalog = catalog(
            vec![
                material("Waspaloy", "Superalloy", "650", true, "40"),
                material("Rene 41", "Superalloy", "650", true, "35"),
                material("Inconel 718", "Superalloy", "700", true, "60"),
                material("Hastelloy X", "Superalloy", "800", false, "30"),
            ],
            vec![],
        );

        let selected = MaterialSelector::new(&catalog)
            .select(dec("600"), true)
            .expect("select");

        let names: Vec<_> = selected.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Inconel 718", "Rene 41", "Waspaloy"]);
    }

    /// Every returned material satisfies both hard filters.
    #[test]
    fn results_satisfy_hard_filters() {
        let catalog = catalog(
            vec![
                material("A", "Steel", "300", false, "2"),
                material("B", "Steel", "450", false, "3"),
                material("C", "Titanium", "450", true, "30"),
                material("D", "Steel", "449.99", false, "1"),
            ],
            vec![],
        );

        let selected = MaterialSelector::new(&catalog)
            .select(dec("450"), false)
            .expect("select");

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "B");
    }

    /// Nothing qualifying is an empty list.
    #[test]
    fn no_candidates_is_empty() {
        let catalog = catalog(vec![], vec![]);
        let selected = MaterialSelector::new(&catalog)
            .select(dec("100"), true)
            .expect("select");
        assert!(selected.is_empty());
    }
}

// =============================================================================
// MACHINES
// =============================================================================

mod machines {
    use super::*;

    /// Too loose for 0.01mm, complex geometry met by freeform.
    #[test]
    fn tolerance_excludes_then_includes() {
        let catalog = catalog(vec![], vec![FIVE_AXIS.row()]);
        let selector = MachineSelector::new(&catalog);

        let strict = MachineRequirements::new("Superalloy", dec("0.01"))
            .with_geometry("complex")
            .with_surface_finish("high")
            .with_features(["5-axis"]);
        let selection = selector.select(&strict).expect("select");
        let MachineSelection::NoMatch(no_match) = selection else {
            unreachable!("0.02mm machine must not meet 0.01mm");
        };
        assert_eq!(no_match.eliminated_by, FilterStage::Catalog);
        assert_eq!(no_match.requirements, strict);

        let relaxed = MachineRequirements {
            required_tolerance: dec("0.05"),
            ..strict
        };
        let selection = selector.select(&relaxed).expect("select");
        assert_eq!(selection.machines().len(), 1);
        assert_eq!(selection.machines()[0].id, "DMU-50");
    }

    /// Equal tolerance is accepted exactly.
    #[test]
    fn tolerance_boundary_is_exact() {
        let catalog = catalog(vec![], vec![FIVE_AXIS.row()]);
        let selection = MachineSelector::new(&catalog)
            .select(&MachineRequirements::new("Titanium", dec("0.020")))
            .expect("select");
        assert!(selection.is_found());
    }

    /// Prismatic-only machines cannot do complex parts but can do simple ones.
    #[test]
    fn geometry_mapping() {
        let prismatic = MachineFixture {
            id: "VF-2",
            geometry: &["prismatic"],
            ..FIVE_AXIS
        };
        let catalog = catalog(vec![], vec![prismatic.row()]);
        let selector = MachineSelector::new(&catalog);

        let complex = MachineRequirements::new("Superalloy", dec("0.05")).with_geometry("complex");
        let selection = selector.select(&complex).expect("select");
        let MachineSelection::NoMatch(no_match) = selection else {
            unreachable!("prismatic must not satisfy complex");
        };
        assert_eq!(no_match.eliminated_by, FilterStage::Geometry);
        assert_eq!(no_match.catalog_candidates, 1);

        let simple = MachineRequirements::new("Superalloy", dec("0.05")).with_geometry("Simple");
        assert!(selector.select(&simple).expect("select").is_found());
    }

    /// Unavailable machines never appear, whatever else matches.
    #[test]
    fn unavailable_excluded() {
        let down = MachineFixture {
            id: "NLX-2500",
            status: "maintenance",
            ..FIVE_AXIS
        };
        let catalog = catalog(vec![], vec![down.row(), FIVE_AXIS.row()]);

        let selection = MachineSelector::new(&catalog)
            .select(&MachineRequirements::new("Superalloy", dec("1")))
            .expect("select");

        let ids: Vec<_> = selection.machines().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["DMU-50"]);
    }

    /// Missing any one feature excludes the machine.
    #[test]
    fn features_contained() {
        let catalog = catalog(vec![], vec![FIVE_AXIS.row()]);
        let selector = MachineSelector::new(&catalog);

        let req =
            MachineRequirements::new("Superalloy", dec("0.05")).with_features(["5-axis", "probing"]);
        let selection = selector.select(&req).expect("select");
        let MachineSelection::NoMatch(no_match) = selection else {
            unreachable!("probing is missing");
        };
        assert_eq!(no_match.eliminated_by, FilterStage::Features);
        assert!(no_match.to_string().contains("features=[5-axis, probing]"));
    }

    /// An alloy name in place of a category matches nothing.
    #[test]
    fn alloy_name_is_silent_no_match() {
        let catalog = catalog(vec![], vec![FIVE_AXIS.row()]);
        let selection = MachineSelector::new(&catalog)
            .select(&MachineRequirements::new("Inconel 718", dec("0.05")))
            .expect("select");

        let MachineSelection::NoMatch(no_match) = selection else {
            unreachable!("alloy names are not categories");
        };
        assert_eq!(no_match.eliminated_by, FilterStage::Catalog);
        assert_eq!(no_match.catalog_candidates, 0);
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

mod pipeline {
    use super::*;

    /// The first-ranked material's category drives the machine search.
    #[test]
    fn material_category_feeds_machine_stage() {
        let catalog = catalog(
            vec![
                material("Ti-6Al-4V", "Titanium", "400", true, "35"),
                material("Inconel 718", "Superalloy", "700", true, "60"),
            ],
            vec![FIVE_AXIS.row()],
        );
        let dynamic: &dyn Catalog = &catalog;

        let materials = MaterialSelector::new(dynamic)
            .select(dec("350"), true)
            .expect("materials");
        let chosen = &materials[0];
        assert_eq!(chosen.category, "Superalloy");

        let selection = MachineSelector::new(dynamic)
            .select(
                &MachineRequirements::new(chosen.category.clone(), dec("0.05"))
                    .with_surface_finish("very high"),
            )
            .expect("machines");

        let PlainSelection::Found { machines } = sanitize(&selection) else {
            unreachable!("the five-axis machine cuts superalloys");
        };
        assert_eq!(machines[0].max_tolerance_mm, 0.02);

        let plain = sanitize(&materials);
        assert_eq!(plain[0].max_operating_temp_c, 700.0);
        assert_eq!(plain[1].cost_per_kg, 35.0);
    }
}
