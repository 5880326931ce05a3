//! Printability measures: overhangs, bed contact and a support estimate.
//!
//! A face's overhang angle is the tilt of its normal away from the Z axis,
//! folded into `[0, 90]` degrees. Horizontal faces score 0 whatever their
//! winding, vertical walls score 90. Faces tilted past
//! [`CRITICAL_OVERHANG_DEG`] are critical.

use super::{triangle_area, Mesh};
use serde::{Deserialize, Serialize};

/// Faces tilted past this angle count as critical overhangs.
pub const CRITICAL_OVERHANG_DEG: f64 = 45.0;

/// Vertices within this distance of the lowest Z lie on the bed (mm).
pub const BED_CONTACT_TOLERANCE_MM: f64 = 0.1;

/// Critical area above which supports are needed (mm²).
pub const SUPPORT_AREA_THRESHOLD_MM2: f64 = 10.0;

/// Nominal support column height per unit of critical area (mm).
pub const SUPPORT_HEIGHT_MM: f64 = 2.0;

/// Overhang statistics at one critical angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverhangSummary {
    /// Largest face tilt in degrees (0 for a mesh with only degenerate faces)
    pub max_angle_deg: f64,
    /// Faces tilted past the critical angle
    pub critical_faces: usize,
    /// Total area of those faces (mm²)
    pub critical_area_mm2: f64,
}

impl OverhangSummary {
    /// True when the steepest face is past `angle_deg` and the critical area
    /// exceeds `area_mm2`.
    #[must_use]
    pub fn requires_supports(&self, angle_deg: f64, area_mm2: f64) -> bool {
        self.max_angle_deg > angle_deg && self.critical_area_mm2 > area_mm2
    }

    /// Rough support volume (mm³): the critical area raised by
    /// [`SUPPORT_HEIGHT_MM`], inflated by 1% per critical face.
    #[must_use]
    pub fn support_volume_mm3(&self) -> f64 {
        let base = self.critical_area_mm2 * SUPPORT_HEIGHT_MM;
        base * (1.0 + self.critical_faces as f64 / 100.0)
    }
}

/// Support-related measures of a mesh at the default thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportAnalysis {
    /// Overhangs at [`CRITICAL_OVERHANG_DEG`]
    pub overhangs: OverhangSummary,
    /// Area of faces lying on the bed (mm²)
    pub contact_area_mm2: f64,
    /// Whether the part needs supports as placed
    pub requires_supports: bool,
    /// Rough support volume (mm³)
    pub support_volume_mm3: f64,
}

/// Geometry summary of a mesh as placed, with its support analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshAnalysis {
    /// Bounding-box width, depth and height (mm)
    pub dimensions_mm: [f64; 3],
    /// Enclosed volume (cm³)
    pub volume_cm3: f64,
    /// Surface area (cm²)
    pub surface_area_cm2: f64,
    /// Area-weighted surface centroid (mm)
    pub centroid_mm: [f64; 3],
    /// Overhangs, bed contact and supports
    pub supports: SupportAnalysis,
}

impl Mesh {
    /// Tilt of each non-degenerate face normal from the Z axis, in degrees.
    fn face_tilts(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.triangles().filter_map(|t| {
            let [a, b, c] = t;
            let normal = (b - a).cross(&(c - a));
            let norm = normal.norm();
            if norm > 0.0 {
                let cos = (normal.z / norm).abs().min(1.0);
                Some((cos.acos().to_degrees(), triangle_area(&t)))
            } else {
                None
            }
        })
    }

    /// Overhang statistics for faces tilted more than `critical_angle_deg`.
    ///
    /// # Examples
    ///
    /// ```
    /// use print_orient::mesh::Mesh;
    ///
    /// // One vertical triangle of area 0.5.
    /// let wall = Mesh::from_triangles(&[
    ///     [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    /// ]).unwrap();
    /// let overhangs = wall.overhangs(45.0);
    /// assert!((overhangs.max_angle_deg - 90.0).abs() < 1e-9);
    /// assert_eq!(overhangs.critical_faces, 1);
    /// ```
    #[must_use]
    pub fn overhangs(&self, critical_angle_deg: f64) -> OverhangSummary {
        let mut summary = OverhangSummary {
            max_angle_deg: 0.0,
            critical_faces: 0,
            critical_area_mm2: 0.0,
        };
        for (angle, area) in self.face_tilts() {
            summary.max_angle_deg = summary.max_angle_deg.max(angle);
            if angle > critical_angle_deg {
                summary.critical_faces += 1;
                summary.critical_area_mm2 += area;
            }
        }
        summary
    }

    /// Area of the faces whose three vertices all lie within `tolerance` of
    /// the lowest Z.
    #[must_use]
    pub fn bed_contact_area(&self, tolerance: f64) -> f64 {
        let min_z = self.bounds().0.z;
        self.triangles()
            .filter(|t| t.iter().all(|v| (v.z - min_z).abs() < tolerance))
            .map(|t| triangle_area(&t))
            .sum()
    }

    /// Overhangs, bed contact and support estimate at the default thresholds.
    #[must_use]
    pub fn support_analysis(&self) -> SupportAnalysis {
        let overhangs = self.overhangs(CRITICAL_OVERHANG_DEG);
        SupportAnalysis {
            overhangs,
            contact_area_mm2: self.bed_contact_area(BED_CONTACT_TOLERANCE_MM),
            requires_supports: overhangs
                .requires_supports(CRITICAL_OVERHANG_DEG, SUPPORT_AREA_THRESHOLD_MM2),
            support_volume_mm3: overhangs.support_volume_mm3(),
        }
    }

    /// Bounding box, volume, area and centroid with the support analysis.
    #[must_use]
    pub fn analyze(&self) -> MeshAnalysis {
        let dimensions = self.dimensions();
        let centroid = self.centroid();
        MeshAnalysis {
            dimensions_mm: [dimensions.x, dimensions.y, dimensions.z],
            volume_cm3: self.volume() / 1000.0,
            surface_area_cm2: self.surface_area() / 100.0,
            centroid_mm: [centroid.x, centroid.y, centroid.z],
            supports: self.support_analysis(),
        }
    }
}
