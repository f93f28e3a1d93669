//! # File I/O Module
//!
//! Model and combination file operations:
//! - **Atomic saves**: write to `.tmp`, sync, rename to prevent corruption
//! - **Version validation**: model files must match the schema version
//!
//! ## File Format
//!
//! Models are saved as `.combo.json` files. Generated combinations are
//! written one file per situation, named after [`Situation::key`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use combo_core::codes::DesignCode;
//! use combo_core::file_io::{load_model, save_model};
//! use combo_core::model::CombinationModel;
//! use std::path::Path;
//!
//! let model = CombinationModel::starter(DesignCode::Ec0Bridges);
//! save_model(&model, Path::new("bridge.combo.json"))?;
//! let loaded = load_model(Path::new("bridge.combo.json"))?;
//! assert_eq!(loaded.actions.len(), 3);
//! # Ok::<(), combo_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::combinations::{CombinationSet, CombinationWriter, OutputFormat, Situation};
use crate::errors::{CalcError, CalcResult};
use crate::model::{CombinationModel, SCHEMA_VERSION};

/// Write bytes to `path` through a synced temporary file and a rename.
///
/// This prevents a half-written file if the process is interrupted.
pub fn write_atomic(path: &Path, contents: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// `<file name>.tmp` next to the target
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save a model as pretty JSON with atomic write semantics.
///
/// # Example
///
/// ```rust,no_run
/// use combo_core::file_io::save_model;
/// use combo_core::model::CombinationModel;
/// use std::path::Path;
///
/// let model = CombinationModel::new("Engineer", "25-001", "Viaduct");
/// save_model(&model, Path::new("viaduct.combo.json"))?;
/// # Ok::<(), combo_core::errors::CalcError>(())
/// ```
pub fn save_model(model: &CombinationModel, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(model).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;
    write_atomic(path, json.as_bytes())
}

/// Load a model from a file.
///
/// # Returns
///
/// * `Ok(CombinationModel)` - Successfully loaded model
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_model(path: &Path) -> CalcResult<CombinationModel> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let model: CombinationModel = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&model.meta.version)?;

    log::debug!("loaded model {} ({} actions)", path.display(), model.actions.len());
    Ok(model)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor version is not readable
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

/// File name of a situation's combinations, e.g. `sls_frequent.txt`
pub fn combination_file_name(situation: Situation, format: OutputFormat) -> String {
    format!("{}.{}", situation.key(), format.extension())
}

/// Render a combination set and write it atomically.
pub fn write_combinations(
    set: &CombinationSet,
    writer: &CombinationWriter,
    format: OutputFormat,
    offset: usize,
    path: &Path,
) -> CalcResult<()> {
    let text = writer.render(set, format, offset)?;
    write_atomic(path, text.as_bytes())?;
    log::info!("wrote {} {} combinations to {}", set.len(), set.situation, path.display());
    Ok(())
}

/// Write each set into `dir` (created if missing), numbering rows
/// continuously from `offset` across sets. Returns the written paths.
pub fn write_combination_files(
    sets: &[CombinationSet],
    writer: &CombinationWriter,
    format: OutputFormat,
    offset: usize,
    dir: &Path,
) -> CalcResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| {
        CalcError::file_error("create directory", dir.display().to_string(), e.to_string())
    })?;

    let mut paths = Vec::with_capacity(sets.len());
    let mut next_id = offset;
    for set in sets {
        let path = dir.join(combination_file_name(set.situation, format));
        write_combinations(set, writer, format, next_id, &path)?;
        next_id += set.len();
        paths.push(path);
    }
    Ok(paths)
}
