//! Tests for dataset cleaning, dedup and assembly.

use super::*;
use crate::mesh::fixtures::{ascii_stl, box_triangles};
use serde_json::json;

fn record(path: &str, angles: [f64; 3], filament: f64, time: f64) -> Value {
    json!({
        "model_name": "bracket",
        "stl_path": path,
        "json_path": "labels/bracket.json",
        "stl_vector": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "angle_x": angles[0],
        "angle_y": angles[1],
        "angle_z": angles[2],
        "filament_length_m": filament,
        "time_minutes": time,
    })
}

fn write_label(dir: &Path, name: &str, angles: [f64; 3], filament: f64, time: f64) {
    let label = json!({
        "model_name": "cube",
        "rotation_info": {"angles_degrees": {"x": angles[0], "y": angles[1], "z": angles[2]}},
        "estimated_values": {"time_minutes": time, "filament_length_m": filament},
    });
    std::fs::write(dir.join(name), label.to_string()).expect("write label");
}

fn write_cube(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), ascii_stl("cube", &box_triangles(10.0, 10.0, 10.0)))
        .expect("write stl");
}

#[test]
fn test_clean_drops_records_missing_fields() {
    let mut missing_time = record("a.stl", [0.0, 0.0, 0.0], 1.0, 10.0);
    missing_time
        .as_object_mut()
        .expect("object")
        .remove("time_minutes");
    let mut bad_vector = record("b.stl", [0.0, 0.0, 0.0], 1.0, 10.0);
    bad_vector["stl_vector"] = json!([1.0, "two"]);

    let records = vec![
        record("a.stl", [0.0, 0.0, 0.0], 1.0, 10.0),
        missing_time,
        bad_vector,
        json!("not an object"),
        record("c.stl", [90.0, 0.0, 0.0], 2.0, 20.0),
    ];

    let (samples, rejected) = clean_records(&records);
    assert_eq!(rejected, 3);
    assert_eq!(samples.len(), records.len() - rejected);
}

#[test]
fn test_clean_rejects_negative_targets() {
    let (samples, rejected) = clean_records(&[record("a.stl", [0.0; 3], -1.0, 10.0)]);
    assert!(samples.is_empty());
    assert_eq!(rejected, 1);
}

#[test]
fn test_clean_coerces_vector_length() {
    let mut short = record("a.stl", [0.0; 3], 1.0, 10.0);
    short["stl_vector"] = json!([1.0, 2.0, 3.0]);
    let mut long = record("b.stl", [0.0; 3], 1.0, 10.0);
    long["stl_vector"] = Value::from(vec![1.0; 12]);

    let (samples, rejected) = clean_records(&[short, long]);
    assert_eq!(rejected, 0);
    assert_eq!(samples[0].stl_vector.as_slice()[3..], [0.0; 7]);
    assert_eq!(samples[1].stl_vector.as_slice(), &[1.0; 10]);
}

#[test]
fn test_from_record_keeps_provenance_and_extras() {
    let mut value = record("parts/a.stl", [45.0, 0.0, 0.0], 1.5, 12.0);
    value["vector_source"] = json!("fallback");
    value["features"] = json!({"width": 1.0});

    let sample = OrientationSample::from_record(&value).expect("valid");
    assert_eq!(sample.model_name, "bracket");
    assert_eq!(sample.stl_path, "parts/a.stl");
    assert_eq!(sample.angles(), [45.0, 0.0, 0.0]);
    assert_eq!(sample.vector_source, Some(VectorSource::Fallback));
    assert!(sample.features.is_some());
    assert_eq!(sample.model_input().len(), 13);
}

#[test]
fn test_dedup_by_path_and_angles() {
    let records = vec![
        record("a.stl", [0.0, 0.0, 0.0], 1.0, 10.0),
        record("a.stl", [0.0, 0.0, 0.0], 9.0, 90.0),
        record("a.stl", [90.0, 0.0, 0.0], 1.0, 10.0),
        record("b.stl", [0.0, 0.0, 0.0], 1.0, 10.0),
    ];
    let dataset = Dataset::from_records(&records);
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.duplicates(), 1);
    // First occurrence wins.
    assert!((dataset.samples()[0].filament_length_m - 1.0).abs() < 1e-12);
}

#[test]
fn test_negative_zero_angle_is_same_key() {
    assert_eq!(
        SampleKey::new("a.stl", [0.0, 0.0, 0.0]),
        SampleKey::new("a.stl", [-0.0, 0.0, 0.0])
    );
}

#[test]
fn test_merge_is_append_only_and_idempotent() {
    let initial = Dataset::from_records(&[record("a.stl", [0.0; 3], 1.0, 10.0)]);
    let mut dataset = initial.clone();

    let batch: Vec<OrientationSample> = clean_records(&[
        record("a.stl", [0.0; 3], 5.0, 50.0),
        record("a.stl", [0.0, 90.0, 0.0], 2.0, 20.0),
    ])
    .0;

    assert_eq!(dataset.merge(batch.clone()), 1);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.samples()[0], initial.samples()[0]);

    assert_eq!(dataset.merge(batch), 0);
    assert_eq!(dataset.len(), 2);
}

#[test]
fn test_save_and_open_roundtrip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("dataset.json");

    let dataset = Dataset::from_records(&[
        record("a.stl", [0.0; 3], 1.0, 10.0),
        record("b.stl", [45.0, 45.0, 0.0], 2.0, 20.0),
    ]);
    dataset.save(&path).expect("save");

    let reopened = Dataset::open(&path).expect("open");
    assert_eq!(reopened.samples(), dataset.samples());
}

#[test]
fn test_open_missing_is_missing_artifact() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = Dataset::open(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, OrientError::MissingArtifact { .. }));
}

#[test]
fn test_load_or_default_starts_empty_without_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let dataset = Dataset::load_or_default(dir.path().join("absent.json")).expect("load");
    assert!(dataset.is_empty());
    assert!(!dir.path().join("absent.json.bak").exists());
}

#[test]
fn test_load_or_default_backs_up_corrupt_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let corrupt = dir.path().join("dataset.json");
    std::fs::write(&corrupt, "[{").expect("write");

    let mut dataset = Dataset::load_or_default(&corrupt).expect("load");
    assert!(dataset.is_empty());

    let backup = backup_path(&corrupt);
    assert_eq!(backup, dir.path().join("dataset.json.bak"));
    assert_eq!(std::fs::read_to_string(&backup).expect("backup"), "[{");

    // Saving over the unreadable file leaves the copy untouched.
    let sample = OrientationSample::from_record(&record("a.stl", [0.0; 3], 1.0, 10.0));
    dataset.insert(sample.expect("valid record"));
    dataset.save(&corrupt).expect("save");
    assert_eq!(Dataset::open(&corrupt).expect("open").len(), 1);
    assert_eq!(std::fs::read_to_string(&backup).expect("backup"), "[{");
}

#[test]
fn test_saved_vectors_reload_bit_for_bit() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dataset.json");

    let mut dataset = Dataset::new();
    for i in 0..200 {
        let mut sample = OrientationSample::from_record(&record(
            &format!("part{i}.stl"),
            [0.0; 3],
            0.1 * f64::from(i),
            3999.9999999999995,
        ))
        .expect("valid");
        sample.stl_vector = crate::features::fallback_vector(&format!("part{i}.stl"));
        dataset.insert(sample);
    }
    dataset.save(&path).expect("save");

    let reopened = Dataset::open(&path).expect("open");
    assert_eq!(reopened.len(), 200);
    for (saved, loaded) in dataset.samples().iter().zip(reopened.samples()) {
        let bits = |s: &OrientationSample| {
            let mut bits: Vec<u64> =
                s.stl_vector.as_slice().iter().map(|v| v.to_bits()).collect();
            bits.push(s.filament_length_m.to_bits());
            bits.push(s.time_minutes.to_bits());
            bits
        };
        assert_eq!(bits(saved), bits(loaded), "{}", saved.stl_path);
    }
}

#[test]
fn test_label_file_defaults() {
    let label: LabelFile = serde_json::from_str("{}").expect("empty object");
    assert_eq!(label.model_name(), "unknown");
    assert_eq!(label.angles(), None);
    assert_eq!(label.time_minutes(), 0.0);
    assert_eq!(label.filament_length_m(), 0.0);
}

#[test]
fn test_orientation_names() {
    assert_eq!(angles_for_orientation_name("default"), [0.0, 0.0, 0.0]);
    assert_eq!(angles_for_orientation_name("Flat"), [90.0, 0.0, 0.0]);
    assert_eq!(angles_for_orientation_name("optimal"), [45.0, 30.0, 0.0]);
    assert_eq!(angles_for_orientation_name("sideways"), [0.0, 0.0, 0.0]);
}

#[test]
fn test_discover_pairs_cross_product_per_directory() {
    let root = tempfile::tempdir().expect("temp dir");
    let a = root.path().join("cube").join("default");
    let b = root.path().join("cube").join("flat");
    std::fs::create_dir_all(&a).expect("mkdir");
    std::fs::create_dir_all(&b).expect("mkdir");

    write_cube(&a, "cube.stl");
    write_label(&a, "one.json", [0.0; 3], 1.0, 10.0);
    write_label(&a, "two.json", [0.0, 0.0, 90.0], 1.0, 10.0);
    write_cube(&b, "cube.stl");
    write_label(&b, "print_info.json", [90.0, 0.0, 0.0], 1.0, 10.0);
    // A label without a mesh pairs with nothing.
    write_label(root.path(), "stray.json", [0.0; 3], 1.0, 10.0);

    let pairs = discover_pairs(root.path()).expect("walk");
    assert_eq!(pairs.len(), 3);
    assert!(pairs.windows(2).all(|w| w[0] <= w[1]));
}

#[cfg(unix)]
#[test]
fn test_discover_pairs_skips_directory_links() {
    let root = tempfile::tempdir().expect("temp dir");
    let dir = root.path().join("cube").join("default");
    std::fs::create_dir_all(&dir).expect("mkdir");
    write_cube(&dir, "cube.stl");
    write_label(&dir, "label.json", [0.0; 3], 1.0, 10.0);

    // A link back to the root would recurse forever if followed.
    std::os::unix::fs::symlink(root.path(), dir.join("loop")).expect("symlink");

    let pairs = discover_pairs(root.path()).expect("walk");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].0, dir.join("cube.stl"));
}

#[test]
fn test_discover_pairs_missing_root() {
    assert!(matches!(
        discover_pairs("/no/such/labels").unwrap_err(),
        OrientError::MissingArtifact { .. }
    ));
}

#[test]
fn test_assemble_twice_is_idempotent() {
    let root = tempfile::tempdir().expect("temp dir");
    let orient = root.path().join("cube").join("default");
    std::fs::create_dir_all(&orient).expect("mkdir");
    write_cube(&orient, "cube.stl");
    write_label(&orient, "a.json", [0.0; 3], 1.2, 30.0);
    write_label(&orient, "b.json", [0.0, 90.0, 0.0], 1.4, 35.0);

    let mut dataset = Dataset::new();
    let first = assemble(root.path(), &mut dataset).expect("assemble");
    assert_eq!(first.existing, 0);
    assert_eq!(first.added, 2);
    assert_eq!(first.fallback, 0);
    assert_eq!(first.total, 2);

    let second = assemble(root.path(), &mut dataset).expect("assemble again");
    assert_eq!(second.existing, 2);
    assert_eq!(second.added, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.total, 2);

    let sample = &dataset.samples()[0];
    assert_eq!(sample.vector_source, Some(VectorSource::Measured));
    assert!((sample.stl_vector.volume() - 1000.0).abs() < 1e-3);
}

#[test]
fn test_assemble_placeholder_counts_fallback_and_bad_label_skipped() {
    let root = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        root.path().join("part.stl"),
        format!("# placeholder\n{}", ".".repeat(200)),
    )
    .expect("write");
    write_label(root.path(), "good.json", [45.0, 0.0, 0.0], 2.0, 40.0);
    std::fs::write(root.path().join("broken.json"), "{not json").expect("write");

    let mut dataset = Dataset::new();
    let report = assemble(root.path(), &mut dataset).expect("assemble");
    assert_eq!(report.added, 1);
    assert_eq!(report.fallback, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(dataset.fallback_count(), 1);
}

#[test]
fn test_assemble_angles_from_directory_name() {
    let root = tempfile::tempdir().expect("temp dir");
    let orient = root.path().join("flat");
    std::fs::create_dir_all(&orient).expect("mkdir");
    write_cube(&orient, "cube.stl");
    std::fs::write(
        orient.join("print_info.json"),
        json!({"estimated_values": {"time_minutes": 12.0}}).to_string(),
    )
    .expect("write");

    let mut dataset = Dataset::new();
    assemble(root.path(), &mut dataset).expect("assemble");
    assert_eq!(dataset.samples()[0].angles(), [90.0, 0.0, 0.0]);
    assert!((dataset.samples()[0].time_minutes - 12.0).abs() < 1e-12);
}

#[test]
fn test_assemble_gcode_overrides_label_estimates() {
    let root = tempfile::tempdir().expect("temp dir");
    write_cube(root.path(), "cube.stl");
    write_label(root.path(), "label.json", [0.0; 3], 1.0, 10.0);
    let mut gcode = String::from(";FLAVOR:Marlin\n;TIME:3600\n;Filament used: 3.25m\n");
    gcode.push_str(&"G1 X1 Y1 E0.1\n".repeat(20));
    std::fs::write(root.path().join("cube.gcode"), gcode).expect("write");

    let mut dataset = Dataset::new();
    assemble(root.path(), &mut dataset).expect("assemble");
    let sample = &dataset.samples()[0];
    assert!((sample.time_minutes - 60.0).abs() < 1e-9);
    assert!((sample.filament_length_m - 3.25).abs() < 1e-9);
}
