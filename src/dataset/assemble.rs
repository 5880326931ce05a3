//! Building samples from a tree of STL files and label JSON files.
//!
//! Within any directory, every `.stl` pairs with every `.json`. A `.gcode`
//! file in the same directory that parses successfully overrides the label
//! estimates.

use super::{Dataset, OrientationSample, SampleKey};
use crate::error::{OrientError, Result};
use crate::features::{extract_from_path, Extraction, VectorSource};
use crate::gcode::parse_gcode_file;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Label JSON written next to each oriented STL.
///
/// Missing sections read as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelFile {
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    rotation_info: Option<RotationInfo>,
    #[serde(default)]
    estimated_values: EstimatedValues,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RotationInfo {
    #[serde(default)]
    angles_degrees: Option<AnglesDegrees>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct AnglesDegrees {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct EstimatedValues {
    #[serde(default)]
    time_minutes: f64,
    #[serde(default)]
    filament_length_m: f64,
}

impl LabelFile {
    /// Reads and parses a label file.
    ///
    /// # Errors
    ///
    /// Returns I/O or JSON errors.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Model name, `"unknown"` when absent.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or("unknown")
    }

    /// Explicit rotation angles, if the file carries them.
    #[must_use]
    pub fn angles(&self) -> Option<[f64; 3]> {
        self.rotation_info
            .as_ref()
            .and_then(|r| r.angles_degrees)
            .map(|a| [a.x, a.y, a.z])
    }

    /// Estimated print time in minutes.
    #[must_use]
    pub fn time_minutes(&self) -> f64 {
        self.estimated_values.time_minutes
    }

    /// Estimated filament length in metres.
    #[must_use]
    pub fn filament_length_m(&self) -> f64 {
        self.estimated_values.filament_length_m
    }
}

/// Angles implied by a conventional orientation directory name.
///
/// `default` is flat on the bed, `flat` is tipped 90° about X, `optimal` is
/// (45, 30, 0). Anything else is (0, 0, 0).
#[must_use]
pub fn angles_for_orientation_name(name: &str) -> [f64; 3] {
    match name.to_ascii_lowercase().as_str() {
        "flat" => [90.0, 0.0, 0.0],
        "optimal" => [45.0, 30.0, 0.0],
        _ => [0.0, 0.0, 0.0],
    }
}

/// Counts from one assembly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Samples already in the dataset before the run
    pub existing: usize,
    /// Malformed records dropped from the existing file
    pub rejected: usize,
    /// New samples appended
    pub added: usize,
    /// Pairs skipped as duplicates or unreadable labels
    pub skipped: usize,
    /// Added samples whose vector is a fallback
    pub fallback: usize,
    /// Samples after the run
    pub total: usize,
}

/// Finds every (STL, label JSON) pair under `root`, sorted by path.
///
/// # Errors
///
/// Returns `MissingArtifact` if `root` is not a directory, or I/O errors from
/// the walk.
pub fn discover_pairs<P: AsRef<Path>>(root: P) -> Result<Vec<(PathBuf, PathBuf)>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(OrientError::missing(root, "label directory"));
    }
    let mut pairs = Vec::new();
    walk(root, &mut pairs)?;
    pairs.sort();
    Ok(pairs)
}

fn walk(dir: &Path, pairs: &mut Vec<(PathBuf, PathBuf)>) -> Result<()> {
    let mut stls = Vec::new();
    let mut jsons = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, pairs)?;
        } else if file_type.is_symlink() && path.is_dir() {
            log::debug!("not following directory link {}", path.display());
        } else if has_extension(&path, "stl") {
            stls.push(path);
        } else if has_extension(&path, "json") {
            jsons.push(path);
        }
    }

    for stl in &stls {
        for json in &jsons {
            pairs.push((stl.clone(), json.clone()));
        }
    }
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// First `.gcode` file in `dir` by name.
fn sibling_gcode(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, "gcode"))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Targets for one pair: label values, overridden by a parsed sibling
/// G-code file when it has them.
fn targets_for(label: &LabelFile, dir: &Path) -> (f64, f64) {
    let mut filament = label.filament_length_m();
    let mut time = label.time_minutes();

    if let Some(gcode) = sibling_gcode(dir) {
        let estimate = parse_gcode_file(&gcode);
        if estimate.success {
            if estimate.filament_length_m > 0.0 {
                filament = estimate.filament_length_m;
            }
            if estimate.time_minutes > 0.0 {
                time = estimate.time_minutes;
            }
        }
    }

    (filament, time)
}

/// Adds every new (STL, angles) sample found under `root` to `dataset`.
///
/// Pairs whose label cannot be read, or whose key is already present, are
/// skipped. Each STL is measured once however many labels it pairs with.
///
/// # Errors
///
/// Returns the errors of [`discover_pairs`].
pub fn assemble<P: AsRef<Path>>(root: P, dataset: &mut Dataset) -> Result<AssemblyReport> {
    let pairs = discover_pairs(root)?;
    log::info!("found {} STL/label pairs", pairs.len());

    let mut report = AssemblyReport {
        existing: dataset.len(),
        rejected: dataset.rejected(),
        ..AssemblyReport::default()
    };
    let mut extractions: HashMap<PathBuf, Extraction> = HashMap::new();

    for (stl_path, json_path) in pairs {
        let label = match LabelFile::read(&json_path) {
            Ok(label) => label,
            Err(e) => {
                log::warn!("skipping {}: {e}", json_path.display());
                report.skipped += 1;
                continue;
            }
        };

        let dir = stl_path.parent().unwrap_or_else(|| Path::new("."));
        let angles = label.angles().unwrap_or_else(|| {
            let orientation = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            angles_for_orientation_name(&orientation)
        });

        let stl_key = stl_path.to_string_lossy().into_owned();
        if dataset.contains(&SampleKey::new(&stl_key, angles)) {
            log::debug!("already present: {stl_key} {angles:?}");
            report.skipped += 1;
            continue;
        }

        let (filament_length_m, time_minutes) = targets_for(&label, dir);
        if !(filament_length_m >= 0.0 && time_minutes >= 0.0)
            || !filament_length_m.is_finite()
            || !time_minutes.is_finite()
        {
            log::warn!("skipping {}: invalid targets", json_path.display());
            report.skipped += 1;
            continue;
        }

        let extraction = *extractions
            .entry(stl_path.clone())
            .or_insert_with(|| extract_from_path(&stl_path));

        let sample = OrientationSample {
            model_name: label.model_name().to_string(),
            stl_path: stl_key,
            json_path: json_path.to_string_lossy().into_owned(),
            stl_vector: extraction.vector,
            angle_x: angles[0],
            angle_y: angles[1],
            angle_z: angles[2],
            filament_length_m,
            time_minutes,
            features: Some(extraction.vector.to_named()),
            vector_source: Some(extraction.source),
        };

        if dataset.insert(sample) {
            report.added += 1;
            if extraction.source == VectorSource::Fallback {
                report.fallback += 1;
            }
            log::info!(
                "added {} at [{}, {}, {}]: {filament_length_m} m, {time_minutes} min",
                stl_path.display(),
                angles[0],
                angles[1],
                angles[2]
            );
        } else {
            report.skipped += 1;
        }
    }

    report.total = dataset.len();
    Ok(report)
}
