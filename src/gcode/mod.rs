//! Print-time and material estimates from slicer G-code comments.
//!
//! Only header comments are read. Recognized markers:
//!
//! - `;TIME:` as `HH:MM:SS` or plain seconds
//! - `;Filament used:` as `<n>m` (metres) or `<n>mm3` / `<n>mm³` (volume)
//! - `;LAYER_COUNT:` / `;Layer count:`
//! - `;Print time:` as `<n> min` or `<h>h <m>m`
//!
//! A file without any of these yields an unsuccessful, zero-valued estimate
//! rather than an error.

use crate::metrics::round_to;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Header bytes inspected per file.
pub const MAX_HEADER_BYTES: u64 = 50_000;

/// Files shorter than this are treated as empty stubs.
pub const MIN_GCODE_BYTES: u64 = 100;

/// Filament radius in cm (1.75 mm diameter).
const FILAMENT_RADIUS_CM: f64 = 0.0875;

/// PLA density in g/cm³.
const PLA_DENSITY_G_CM3: f64 = 1.25;

/// Grams per mm³ of PLA.
const PLA_G_PER_MM3: f64 = 0.00125;

/// Values recovered from one G-code file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintEstimate {
    /// Estimated print time in minutes
    pub time_minutes: f64,
    /// Estimated material in grams
    pub material_g: f64,
    /// Layer count (0 when absent)
    pub layer_count: u32,
    /// Filament length in metres
    pub filament_length_m: f64,
    /// True when a time or material marker was found
    pub success: bool,
    /// Which markers contributed, or why nothing was parsed
    pub notes: Vec<String>,
}

impl PrintEstimate {
    fn empty(reason: &str) -> Self {
        Self {
            notes: vec![reason.to_string()],
            ..Self::default()
        }
    }
}

/// Parses G-code header text.
///
/// # Examples
///
/// ```
/// use print_orient::gcode::parse_gcode;
///
/// let estimate = parse_gcode(";TIME:01:30:00\n;Filament used: 2.5m\n");
/// assert!(estimate.success);
/// assert!((estimate.time_minutes - 90.0).abs() < 1e-9);
/// assert!((estimate.filament_length_m - 2.5).abs() < 1e-9);
/// ```
#[must_use]
pub fn parse_gcode(text: &str) -> PrintEstimate {
    let mut estimate = PrintEstimate::default();

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(";TIME:") {
            parse_time_marker(rest.trim(), &mut estimate);
        } else if line.contains(";Filament used:") {
            parse_filament_marker(line, &mut estimate);
        } else if line.contains(";LAYER_COUNT:") || line.contains(";Layer count:") {
            if let Some(layers) = first_integer(line) {
                estimate.layer_count = layers;
                estimate.notes.push("layers from layer count".to_string());
            }
        } else if line.contains(";Print time:") {
            parse_print_time_marker(line, &mut estimate);
        }
    }

    estimate
}

/// Reads at most the first [`MAX_HEADER_BYTES`] of a file and parses them.
///
/// Missing, tiny and unreadable files produce unsuccessful estimates whose
/// notes say why.
#[must_use]
pub fn parse_gcode_file<P: AsRef<Path>>(path: P) -> PrintEstimate {
    let path = path.as_ref();
    let size = match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(_) => return PrintEstimate::empty("file not found"),
    };
    if size < MIN_GCODE_BYTES {
        return PrintEstimate::empty("file too small");
    }

    let mut header = Vec::new();
    let read = std::fs::File::open(path)
        .and_then(|file| file.take(MAX_HEADER_BYTES).read_to_end(&mut header));
    if let Err(e) = read {
        log::warn!("cannot read {}: {e}", path.display());
        return PrintEstimate::empty(&format!("read error: {e}"));
    }

    let estimate = parse_gcode(&String::from_utf8_lossy(&header));
    if estimate.success {
        log::debug!(
            "{}: {:.0} min, {:.1} g",
            path.display(),
            estimate.time_minutes,
            estimate.material_g
        );
    } else {
        log::warn!("no estimates found in {}", path.display());
    }
    estimate
}

fn parse_time_marker(value: &str, estimate: &mut PrintEstimate) {
    if value.contains(':') {
        let parts: Vec<&str> = value.split(':').collect();
        if let [h, m, s] = parts.as_slice() {
            if let (Ok(h), Ok(m), Ok(s)) = (
                h.trim().parse::<u32>(),
                m.trim().parse::<u32>(),
                s.trim().parse::<u32>(),
            ) {
                estimate.time_minutes = f64::from(h) * 60.0 + f64::from(m) + f64::from(s) / 60.0;
                estimate.success = true;
                estimate.notes.push("time from TIME:HH:MM:SS".to_string());
            }
        }
    } else if let Ok(seconds) = value.parse::<f64>() {
        // Whole seconds only.
        estimate.time_minutes = seconds.trunc() / 60.0;
        estimate.success = true;
        estimate.notes.push("time from TIME seconds".to_string());
    }
}

fn parse_filament_marker(line: &str, estimate: &mut PrintEstimate) {
    let Some((value, unit)) = number_with_unit(line) else {
        return;
    };

    if unit.starts_with("mm") {
        estimate.material_g = value * PLA_G_PER_MM3;
        estimate.success = true;
        estimate.notes.push("material from filament volume".to_string());
    } else if unit.starts_with('m') {
        estimate.filament_length_m = value;
        let volume_cm3 = value * 100.0 * std::f64::consts::PI * FILAMENT_RADIUS_CM.powi(2);
        estimate.material_g = round_to(volume_cm3 * PLA_DENSITY_G_CM3, 2);
        estimate.success = true;
        estimate.notes.push("material from filament length".to_string());
    }
}

fn parse_print_time_marker(line: &str, estimate: &mut PrintEstimate) {
    let lower = line.to_ascii_lowercase();

    if let Some(minutes) = integer_before(&lower, "min") {
        estimate.time_minutes = f64::from(minutes);
        estimate.success = true;
        estimate.notes.push("time from Print time minutes".to_string());
    }

    // `<h>h ... <m>m` overrides the plain minutes form.
    if let Some(h_pos) = hours_marker(&lower) {
        let hours = digits_ending_at(&lower, h_pos);
        let minutes = first_integer_before_m(&lower[h_pos + 1..]);
        if let (Some(h), Some(m)) = (hours, minutes) {
            estimate.time_minutes = f64::from(h) * 60.0 + f64::from(m);
            estimate.success = true;
            estimate.notes.push("time from Print time hours/minutes".to_string());
        }
    }
}

/// First `<number><spaces><letters>` in the text as (number, unit).
fn number_with_unit(text: &str) -> Option<(f64, &str)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() || bytes[i] == b'.' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let number = &text[start..i];
            let rest = text[i..].trim_start();
            if let Ok(value) = number.parse::<f64>() {
                if rest.starts_with('m') {
                    return Some((value, rest));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Integer immediately followed (after optional spaces) by `unit`.
fn integer_before(text: &str, unit: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if text[i..].trim_start().starts_with(unit) {
                return text[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Byte index of the first `h` preceded by digits (spaces allowed between).
fn hours_marker(text: &str) -> Option<usize> {
    text.char_indices()
        .filter(|&(_, c)| c == 'h')
        .map(|(pos, _)| pos)
        .find(|&pos| digits_ending_at(text, pos).is_some())
}

/// Digits that end just before `pos`, skipping spaces.
fn digits_ending_at(text: &str, pos: usize) -> Option<u32> {
    let head = text[..pos].trim_end();
    let start = head
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(0, |(p, c)| p + c.len_utf8());
    head[start..].parse().ok()
}

fn first_integer_before_m(text: &str) -> Option<u32> {
    integer_before(text, "m")
}
