//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ExportFormat;
use crate::api::{self, AppState};
use crate::config::AppConfig;
use machinist_core::{
    Catalog, CatalogBackend, CatalogConfig, CatalogSnapshot, CatalogStore, Decimal,
    MachineRequirements, MachineSelector, MachinistError, MaterialSelector, PlainSelection,
    is_snapshot, sanitize, snapshot_fingerprint, snapshot_from_bytes, snapshot_to_bytes,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for seed/snapshot import (64 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MachinistError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MachinistError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MachinistError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path, rejecting anything that is not a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MachinistError> {
    let canonical = path.canonicalize().map_err(|e| {
        MachinistError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MachinistError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against its canonical parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, MachinistError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        MachinistError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(MachinistError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| MachinistError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SEED FILES
// =============================================================================

/// Decode a seed file: binary snapshot (by magic bytes), TOML (by
/// extension) or JSON.
pub fn decode_seed(path: &Path, data: &[u8]) -> Result<CatalogSnapshot, MachinistError> {
    if is_snapshot(data) {
        return snapshot_from_bytes(data);
    }

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        let text = std::str::from_utf8(data)
            .map_err(|e| MachinistError::SerializationError(format!("Seed is not UTF-8: {}", e)))?;
        toml::from_str(text)
            .map_err(|e| MachinistError::SerializationError(format!("Invalid TOML seed: {}", e)))
    } else {
        serde_json::from_slice(data)
            .map_err(|e| MachinistError::SerializationError(format!("Invalid JSON seed: {}", e)))
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig) -> Result<(), MachinistError> {
    let store = CatalogStore::open(&config.catalog)?;
    let counts = store.counts()?;

    println!("Machinist Selection Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Backend:  {}", config.catalog.backend);
    println!("  Catalog:  {:?}", config.catalog.path);
    println!("  Rows:     {} materials, {} machines", counts.materials, counts.machines);
    println!();
    println!("Endpoints:");
    println!("  GET  /health    - Health check");
    println!("  GET  /status    - Catalog status");
    println!("  POST /materials - Material selection");
    println!("  POST /machines  - Machine selection");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(AppState::new(store), &config.server).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog status.
pub fn cmd_status(catalog: &CatalogConfig, json_mode: bool) -> Result<(), MachinistError> {
    let store = CatalogStore::open(catalog)?;
    let snapshot = store.snapshot()?;
    let counts = snapshot.counts();
    let fingerprint = snapshot_fingerprint(&snapshot)?;

    if json_mode {
        print_json(&serde_json::json!({
            "catalog": catalog.path.to_string_lossy(),
            "backend": catalog.backend.to_string(),
            "materials": counts.materials,
            "machines": counts.machines,
            "fingerprint": fingerprint,
        }));
        return Ok(());
    }

    println!("Machinist Catalog Status");
    println!("========================");
    println!("Catalog:     {:?}", catalog.path);
    println!("Backend:     {}", catalog.backend);
    println!();
    println!("Materials:   {}", counts.materials);
    println!("Machines:    {}", counts.machines);
    println!("Fingerprint: {}", fingerprint);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty catalog.
pub fn cmd_init(catalog: &CatalogConfig, force: bool) -> Result<(), MachinistError> {
    if catalog.path.exists() {
        if !force {
            return Err(MachinistError::IoError(
                "Catalog already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(&catalog.path)
            .map_err(|e| MachinistError::IoError(format!("Remove existing catalog: {}", e)))?;
    }

    CatalogStore::create(catalog)?;
    println!(
        "Initialized new {} catalog at {:?}",
        catalog.backend, catalog.path
    );
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Upsert rows from a seed file or snapshot.
pub fn cmd_import(
    catalog: &CatalogConfig,
    json_mode: bool,
    file: &Path,
) -> Result<(), MachinistError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| MachinistError::IoError(format!("Read file: {}", e)))?;
    let seed = decode_seed(&validated_path, &data)?;
    let incoming = seed.counts();

    tracing::info!(
        event = "import",
        file = %validated_path.display(),
        materials = incoming.materials,
        machines = incoming.machines,
        "Importing catalog rows"
    );

    let mut store = match catalog.backend {
        CatalogBackend::Redb => CatalogStore::create(catalog)?,
        CatalogBackend::File if catalog.path.exists() => CatalogStore::open(catalog)?,
        CatalogBackend::File => CatalogStore::create(catalog)?,
    };
    let counts = store.import(seed)?;

    if json_mode {
        print_json(&serde_json::json!({
            "imported": { "materials": incoming.materials, "machines": incoming.machines },
            "catalog": { "materials": counts.materials, "machines": counts.machines },
        }));
        return Ok(());
    }

    println!(
        "Imported {} materials, {} machines from {:?}",
        incoming.materials, incoming.machines, validated_path
    );
    println!(
        "Catalog now has {} materials, {} machines",
        counts.materials, counts.machines
    );
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write the catalog to a file.
pub fn cmd_export(
    catalog: &CatalogConfig,
    output: &Path,
    format: ExportFormat,
) -> Result<(), MachinistError> {
    let validated_output = validate_output_path(output)?;
    let snapshot = CatalogStore::open(catalog)?.snapshot()?;

    let data = match format {
        ExportFormat::Snapshot => {
            println!("Fingerprint: {}", snapshot_fingerprint(&snapshot)?);
            snapshot_to_bytes(&snapshot)?
        }
        ExportFormat::Json => serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| MachinistError::SerializationError(e.to_string()))?,
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| MachinistError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

// =============================================================================
// MATERIALS COMMAND
// =============================================================================

/// Run material selection and print the shortlist.
pub fn cmd_materials(
    catalog: &CatalogConfig,
    json_mode: bool,
    min_temp: &str,
    aerospace: bool,
) -> Result<(), MachinistError> {
    let min_temperature =
        Decimal::extract(min_temp).map_err(|e| MachinistError::from_decimal("min_temperature", e))?;

    let store = CatalogStore::open(catalog)?;
    let materials = MaterialSelector::new(&store).select(min_temperature, aerospace)?;
    let plain = sanitize(&materials);

    tracing::info!(
        event = "select_materials",
        min_temperature = %min_temperature,
        aerospace_required = aerospace,
        count = plain.len(),
        "Material selection complete"
    );

    if json_mode {
        print_json(&serde_json::json!({ "materials": plain }));
        return Ok(());
    }

    if plain.is_empty() {
        println!(
            "No materials rated for {}°C with aerospace_grade={}",
            min_temperature, aerospace
        );
        return Ok(());
    }

    println!(
        "{:<24} {:<14} {:>10} {:>10} {:>8}",
        "Material", "Category", "Max °C", "$/kg", "Mach."
    );
    for m in &plain {
        println!(
            "{:<24} {:<14} {:>10} {:>10} {:>8}",
            m.name, m.category, m.max_operating_temp_c, m.cost_per_kg, m.machinability_rating
        );
    }
    println!();
    println!("Pass the Category (not the material name) to `machinist machines`.");
    Ok(())
}

// =============================================================================
// MACHINES COMMAND
// =============================================================================

/// Arguments of the `machines` command.
#[derive(Debug, Clone)]
pub struct MachinesArgs {
    pub category: String,
    pub tolerance: String,
    pub geometry: Option<String>,
    pub finish: Option<String>,
    pub features: Vec<String>,
}

impl MachinesArgs {
    pub fn to_requirements(&self) -> Result<MachineRequirements, MachinistError> {
        let tolerance = Decimal::extract(&self.tolerance)
            .map_err(|e| MachinistError::from_decimal("required_tolerance", e))?;
        Ok(MachineRequirements {
            material_category: self.category.clone(),
            required_tolerance: tolerance,
            geometry_complexity: self.geometry.clone(),
            surface_finish: self.finish.clone(),
            required_features: (!self.features.is_empty())
                .then(|| self.features.iter().cloned().collect()),
        })
    }
}

/// Run machine selection and print the result.
pub fn cmd_machines(
    catalog: &CatalogConfig,
    json_mode: bool,
    args: MachinesArgs,
) -> Result<(), MachinistError> {
    let requirements = args.to_requirements()?;

    let store = CatalogStore::open(catalog)?;
    let selection = MachineSelector::new(&store).select(&requirements)?;
    let plain = sanitize(&selection);

    if json_mode {
        print_json(&serde_json::json!({ "selection": plain }));
        return Ok(());
    }

    match plain {
        PlainSelection::Found { machines } => {
            tracing::info!(
                event = "select_machines",
                material_category = %requirements.material_category,
                count = machines.len(),
                "Machine selection complete"
            );
            println!(
                "{:<16} {:>10} {:<10} {:<28} {}",
                "Machine", "Tol. mm", "Finish", "Geometry", "Features"
            );
            for m in &machines {
                println!(
                    "{:<16} {:>10} {:<10} {:<28} {}",
                    m.id,
                    m.max_tolerance_mm,
                    m.surface_finish_capability,
                    join(&m.geometry_capability),
                    join(&m.special_features)
                );
            }
        }
        PlainSelection::NoMatch(no_match) => {
            tracing::info!(
                event = "select_machines",
                material_category = %requirements.material_category,
                eliminated_by = no_match.eliminated_by.as_str(),
                "Machine selection found no match"
            );
            println!("{}", no_match.message);
        }
    }
    Ok(())
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// TESTS
// =============================================================================
