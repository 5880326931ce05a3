//! Training samples and the persisted dataset collection.
//!
//! The dataset file is a single JSON array. Records are read as raw
//! [`serde_json::Value`]s and cleaned: anything missing a required field is
//! dropped and the vector is coerced to ten slots. The collection is
//! append-only and deduplicated by (STL path, angle_x, angle_y, angle_z).

mod assemble;

pub use assemble::{
    angles_for_orientation_name, assemble, discover_pairs, AssemblyReport, LabelFile,
};

use crate::error::{OrientError, Result};
use crate::features::{coerce, FeatureVector, VectorSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Fields a record needs to be used for training.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "stl_vector",
    "angle_x",
    "angle_y",
    "angle_z",
    "filament_length_m",
    "time_minutes",
];

/// One (model, orientation) training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Model name from the label file
    #[serde(default)]
    pub model_name: String,
    /// Source mesh path, part of the dedup key
    #[serde(default)]
    pub stl_path: String,
    /// Label file the targets came from
    #[serde(default)]
    pub json_path: String,
    /// Geometric descriptor
    pub stl_vector: FeatureVector,
    /// Rotation about X in degrees
    pub angle_x: f64,
    /// Rotation about Y in degrees
    pub angle_y: f64,
    /// Rotation about Z in degrees
    pub angle_z: f64,
    /// Filament length in metres
    pub filament_length_m: f64,
    /// Print time in minutes
    pub time_minutes: f64,
    /// Named copy of the vector slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Map<String, Value>>,
    /// Whether the vector was measured or substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_source: Option<VectorSource>,
}

impl OrientationSample {
    /// Rotation angles (x, y, z) in degrees.
    #[must_use]
    pub fn angles(&self) -> [f64; 3] {
        [self.angle_x, self.angle_y, self.angle_z]
    }

    /// Dedup key of this sample.
    #[must_use]
    pub fn key(&self) -> SampleKey {
        SampleKey::new(&self.stl_path, self.angles())
    }

    /// The 13-column model input row.
    #[must_use]
    pub fn model_input(&self) -> Vec<f32> {
        self.stl_vector.with_angles(self.angles())
    }

    /// Parses one raw record, returning `None` when it is not trainable.
    ///
    /// All [`REQUIRED_FIELDS`] must be present and numeric (the vector an
    /// array of numbers) and both targets finite and non-negative. The vector
    /// is coerced to ten slots.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        let object = record.as_object()?;
        let number = |field: &str| object.get(field).and_then(Value::as_f64);

        let raw_vector: Vec<f64> = object
            .get("stl_vector")?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect::<Option<_>>()?;

        let filament_length_m = number("filament_length_m")?;
        let time_minutes = number("time_minutes")?;
        if !(filament_length_m.is_finite() && filament_length_m >= 0.0)
            || !(time_minutes.is_finite() && time_minutes >= 0.0)
        {
            return None;
        }

        let text = |field: &str| {
            object
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            model_name: text("model_name"),
            stl_path: text("stl_path"),
            json_path: text("json_path"),
            stl_vector: coerce(&raw_vector),
            angle_x: number("angle_x")?,
            angle_y: number("angle_y")?,
            angle_z: number("angle_z")?,
            filament_length_m,
            time_minutes,
            features: object.get("features").and_then(Value::as_object).cloned(),
            vector_source: object
                .get("vector_source")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        })
    }
}

/// Exact identity of a sample: source path plus the three angles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleKey {
    stl_path: String,
    angle_bits: [u64; 3],
}

impl SampleKey {
    /// Builds a key. `-0.0` and `0.0` are the same angle.
    #[must_use]
    pub fn new(stl_path: &str, angles: [f64; 3]) -> Self {
        Self {
            stl_path: stl_path.to_string(),
            angle_bits: angles.map(|a| (a + 0.0).to_bits()),
        }
    }
}

/// Cleans raw records, returning the trainable samples and the number
/// dropped.
#[must_use]
pub fn clean_records(records: &[Value]) -> (Vec<OrientationSample>, usize) {
    let samples: Vec<OrientationSample> = records
        .iter()
        .filter_map(OrientationSample::from_record)
        .collect();
    let rejected = records.len() - samples.len();
    (samples, rejected)
}

/// Where [`Dataset::load_or_default`] copies an unreadable dataset file:
/// the same path with `.bak` appended.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Append-only, deduplicated collection of samples.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<OrientationSample>,
    keys: HashSet<SampleKey>,
    rejected: usize,
    duplicates: usize,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from raw records, dropping malformed ones and
    /// repeated keys (first occurrence wins).
    #[must_use]
    pub fn from_records(records: &[Value]) -> Self {
        let (samples, rejected) = clean_records(records);
        let mut dataset = Self {
            rejected,
            ..Self::default()
        };
        for sample in samples {
            if !dataset.insert(sample) {
                dataset.duplicates += 1;
            }
        }
        dataset
    }

    /// Reads a dataset file for training.
    ///
    /// # Errors
    ///
    /// Returns `MissingArtifact` when the file does not exist, and I/O or
    /// serialization errors when it cannot be read as a JSON array.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OrientError::missing(path, "training dataset"));
        }
        let file = std::fs::File::open(path)?;
        let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;
        let dataset = Self::from_records(&records);
        log::info!(
            "loaded {} samples from {} ({} malformed, {} duplicate)",
            dataset.len(),
            path.display(),
            dataset.rejected,
            dataset.duplicates
        );
        Ok(dataset)
    }

    /// Reads a dataset file for appending. A missing file is an empty
    /// dataset. An unreadable one is copied to [`backup_path`] and then
    /// treated as empty, so the next [`Dataset::save`] cannot destroy it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the backup copy cannot be written.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no dataset at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        match Self::open(path) {
            Ok(dataset) => Ok(dataset),
            Err(e) => {
                let backup = backup_path(path);
                std::fs::copy(path, &backup)?;
                log::warn!(
                    "cannot read dataset {}: {e}; kept a copy at {}, starting empty",
                    path.display(),
                    backup.display()
                );
                Ok(Self::new())
            }
        }
    }

    /// Writes the whole collection as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns I/O or serialization errors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.samples)?;
        writer.flush()?;
        log::info!("saved {} samples to {}", self.len(), path.display());
        Ok(())
    }

    /// True if a sample with this key is stored.
    #[must_use]
    pub fn contains(&self, key: &SampleKey) -> bool {
        self.keys.contains(key)
    }

    /// Appends a sample unless its key is already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, sample: OrientationSample) -> bool {
        if !self.keys.insert(sample.key()) {
            return false;
        }
        self.samples.push(sample);
        true
    }

    /// Appends every sample with a new key; returns how many were added.
    pub fn merge<I>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = OrientationSample>,
    {
        samples
            .into_iter()
            .map(|sample| self.insert(sample))
            .filter(|&added| added)
            .count()
    }

    /// Stored samples in insertion order.
    #[must_use]
    pub fn samples(&self) -> &[OrientationSample] {
        &self.samples
    }

    /// Number of stored samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no samples are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Malformed records dropped while loading.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Records dropped while loading because their key repeated.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Samples whose vector is a fallback substitute.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.vector_source == Some(VectorSource::Fallback))
            .count()
    }
}

#[cfg(test)]
mod tests;
