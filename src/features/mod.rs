//! Fixed-length geometric descriptors of a mesh.
//!
//! Every mesh maps to exactly [`FEATURE_LEN`] numbers:
//!
//! | slot | meaning |
//! |------|---------|
//! | 0-2  | bounding-box width, depth, height |
//! | 3    | enclosed volume |
//! | 4    | surface area |
//! | 5-6  | vertex and face counts |
//! | 7-9  | area-weighted centroid |
//!
//! Extraction from a path never fails. Files that cannot be measured get a
//! pseudo-random fallback vector seeded by the file name, and the result is
//! flagged as [`VectorSource::Fallback`].

use crate::error::{OrientError, Result};
use crate::mesh::{self, Mesh};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Number of geometric slots in a [`FeatureVector`].
pub const FEATURE_LEN: usize = 10;

/// Slot names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_LEN] = [
    "width",
    "depth",
    "height",
    "volume",
    "surface_area",
    "num_vertices",
    "num_faces",
    "center_x",
    "center_y",
    "center_z",
];

/// Scale applied to the standard-normal fallback draws.
const FALLBACK_SCALE: f64 = 10.0;

/// Ten-slot geometric descriptor.
///
/// Serializes as a plain JSON array of 10 numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_LEN]);

impl FeatureVector {
    /// Wraps ten values.
    #[must_use]
    pub fn new(values: [f64; FEATURE_LEN]) -> Self {
        Self(values)
    }

    /// Values in slot order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Bounding-box extents (width, depth, height).
    #[must_use]
    pub fn dimensions(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.0[3]
    }

    /// Surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.0[4]
    }

    /// Area-weighted centroid.
    #[must_use]
    pub fn centroid(&self) -> [f64; 3] {
        [self.0[7], self.0[8], self.0[9]]
    }

    /// True when every slot is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// The 13-column model input: the ten slots followed by the rotation
    /// angles in degrees.
    #[must_use]
    pub fn with_angles(&self, angles: [f64; 3]) -> Vec<f32> {
        self.0
            .iter()
            .chain(angles.iter())
            .map(|&v| v as f32)
            .collect()
    }

    /// Slot values keyed by [`FEATURE_NAMES`].
    #[must_use]
    pub fn to_named(&self) -> serde_json::Map<String, serde_json::Value> {
        FEATURE_NAMES
            .iter()
            .zip(self.0.iter())
            .map(|(name, value)| ((*name).to_string(), serde_json::json!(value)))
            .collect()
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = OrientError;

    /// Strict conversion; use [`coerce`] for lenient ingestion.
    fn try_from(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_LEN] = values.try_into().map_err(|_| {
            OrientError::dimension_mismatch("feature vector length", FEATURE_LEN, values.len())
        })?;
        Ok(Self(array))
    }
}

/// Truncates or right-pads with zeros to exactly [`FEATURE_LEN`] values.
///
/// # Examples
///
/// ```
/// use print_orient::features::coerce;
///
/// let short = coerce(&[1.0, 2.0]);
/// assert_eq!(short.as_slice()[..3], [1.0, 2.0, 0.0]);
///
/// let long = coerce(&[1.0; 12]);
/// assert_eq!(long.as_slice().len(), 10);
/// ```
#[must_use]
pub fn coerce(values: &[f64]) -> FeatureVector {
    let mut array = [0.0; FEATURE_LEN];
    for (slot, value) in array.iter_mut().zip(values) {
        *slot = *value;
    }
    FeatureVector(array)
}

/// How a vector was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorSource {
    /// Measured from mesh geometry.
    Measured,
    /// Seeded pseudo-random substitute.
    Fallback,
}

impl fmt::Display for VectorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorSource::Measured => write!(f, "measured"),
            VectorSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A feature vector together with its provenance flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// The ten-slot descriptor
    pub vector: FeatureVector,
    /// Measured or fallback
    pub source: VectorSource,
}

impl Extraction {
    /// True for measured vectors.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.source == VectorSource::Measured
    }
}

/// Measures a loaded mesh.
///
/// # Errors
///
/// Returns `GeometryExtraction` if any slot comes out non-finite.
pub fn extract(mesh: &Mesh) -> Result<FeatureVector> {
    let dims = mesh.dimensions();
    let centroid = mesh.centroid();
    let vector = FeatureVector([
        dims.x,
        dims.y,
        dims.z,
        mesh.volume(),
        mesh.surface_area(),
        mesh.num_vertices() as f64,
        mesh.num_faces() as f64,
        centroid.x,
        centroid.y,
        centroid.z,
    ]);

    if !vector.is_finite() {
        return Err(OrientError::GeometryExtraction {
            message: format!("non-finite measurement in {:?}", vector.as_slice()),
        });
    }
    Ok(vector)
}

/// Loads and measures the STL at `path`, substituting the fallback vector on
/// any failure.
#[must_use]
pub fn extract_from_path<P: AsRef<Path>>(path: P) -> Extraction {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let measured = if mesh::is_placeholder_stl(path) {
        Err(OrientError::GeometryExtraction {
            message: "placeholder file".to_string(),
        })
    } else {
        Mesh::from_stl(path).and_then(|m| extract(&m))
    };

    match measured {
        Ok(vector) => {
            log::info!(
                "measured {file_name}: {:.1}x{:.1}x{:.1}",
                vector.0[0],
                vector.0[1],
                vector.0[2]
            );
            Extraction {
                vector,
                source: VectorSource::Measured,
            }
        }
        Err(e) => {
            log::warn!("using fallback vector for {}: {e}", path.display());
            Extraction {
                vector: fallback_vector(&file_name),
                source: VectorSource::Fallback,
            }
        }
    }
}

/// Deterministic substitute vector for a file name.
///
/// Ten standard-normal draws scaled by 10, seeded by a stable hash of the
/// name. The same name yields the bit-identical vector in every process.
#[must_use]
pub fn fallback_vector(file_name: &str) -> FeatureVector {
    let mut rng = StdRng::seed_from_u64(stable_hash(file_name));
    let mut array = [0.0; FEATURE_LEN];
    for slot in &mut array {
        *slot = standard_normal(&mut rng) * FALLBACK_SCALE;
    }
    FeatureVector(array)
}

/// FNV-1a over the UTF-8 bytes; unlike `DefaultHasher` it is fixed across
/// processes and releases.
fn stable_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Sample standard normal using Box-Muller transform
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
