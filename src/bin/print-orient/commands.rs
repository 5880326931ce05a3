//! Subcommand implementations.

use crate::error::{CliError, Result};
use crate::output;
use colored::Colorize;
use print_orient::cost_model::{CostModel, CostModelConfig, TrainedCostModel};
use print_orient::dataset::{self, Dataset};
use print_orient::features::{extract_from_path, FEATURE_NAMES};
use print_orient::gcode::parse_gcode_file;
use print_orient::mesh::Mesh;
use print_orient::recommend::{default_report_name, OrientationRecommender, RecommendationReport};
use std::path::{Path, PathBuf};

fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::FileNotFound(path.to_path_buf()))
    }
}

/// Measure an STL and print its feature vector.
pub(crate) fn vectorize(stl: &Path, json: bool) -> Result<()> {
    require_file(stl)?;
    let extraction = extract_from_path(stl);

    if json {
        return output::json(&extraction);
    }

    output::section(&format!("Feature vector: {}", stl.display()));
    for (name, value) in FEATURE_NAMES.iter().zip(extraction.vector.as_slice()) {
        output::kv(name, format!("{value:.4}"));
    }
    output::kv("source", extraction.source);
    if !extraction.is_measured() {
        output::warning("mesh could not be measured; values are a deterministic substitute");
    }
    Ok(())
}

/// Print geometry and support needs of a mesh as placed.
pub(crate) fn analyze(stl: &Path, json: bool) -> Result<()> {
    require_file(stl)?;
    let analysis = Mesh::from_stl(stl)?.analyze();

    if json {
        return output::json(&analysis);
    }

    let [w, d, h] = analysis.dimensions_mm;
    let supports = &analysis.supports;
    output::section(&format!("Mesh analysis: {}", stl.display()));
    output::kv("size", format!("{w:.1} x {d:.1} x {h:.1} mm"));
    output::kv("volume", format!("{:.2} cm³", analysis.volume_cm3));
    output::kv("surface area", format!("{:.2} cm²", analysis.surface_area_cm2));
    output::kv("bed contact", format!("{:.1} mm²", supports.contact_area_mm2));
    output::kv(
        "max overhang",
        format!("{:.1}°", supports.overhangs.max_angle_deg),
    );
    output::kv(
        "critical faces",
        format!(
            "{} ({:.1} mm²)",
            supports.overhangs.critical_faces, supports.overhangs.critical_area_mm2
        ),
    );
    if supports.requires_supports {
        output::warning(&format!(
            "needs supports, about {:.0} mm³",
            supports.support_volume_mm3
        ));
    } else {
        output::success("prints without supports");
    }
    Ok(())
}

/// Print the estimate recovered from a G-code file.
pub(crate) fn parse_gcode(file: &Path, json: bool) -> Result<()> {
    let estimate = parse_gcode_file(file);

    if json {
        return output::json(&estimate);
    }

    output::section(&format!("G-code: {}", file.display()));
    output::kv("time_minutes", format!("{:.2}", estimate.time_minutes));
    output::kv("filament_length_m", format!("{:.3}", estimate.filament_length_m));
    output::kv("material_g", format!("{:.2}", estimate.material_g));
    output::kv("layer_count", estimate.layer_count);
    output::kv("notes", estimate.notes.join("; "));
    if estimate.success {
        output::success("estimate recovered");
        Ok(())
    } else {
        Err(CliError::InvalidFormat(format!(
            "no print estimate in {}",
            file.display()
        )))
    }
}

/// Append samples found under a label tree to a dataset file.
pub(crate) fn assemble(root: &Path, dataset_path: &Path, json: bool) -> Result<()> {
    require_dir(root)?;
    let mut data = Dataset::load_or_default(dataset_path)?;
    let report = dataset::assemble(root, &mut data)?;
    data.save(dataset_path)?;

    if json {
        return output::json(&report);
    }

    output::section("Dataset assembly");
    output::kv("dataset", dataset_path.display());
    output::kv("existing", report.existing);
    output::kv("rejected", report.rejected);
    output::kv("added", report.added);
    output::kv("skipped", report.skipped);
    output::kv("fallback vectors", report.fallback);
    output::kv("total", report.total);
    if report.fallback > 0 {
        output::warning(&format!(
            "{} new samples use substitute vectors",
            report.fallback
        ));
    }
    output::success(&format!("{} samples saved", report.total));
    Ok(())
}

/// Hyperparameters taken from `train` flags.
pub(crate) struct TrainOptions {
    pub(crate) n_estimators: usize,
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) test_size: f32,
    pub(crate) seed: u64,
    pub(crate) min_samples: usize,
}

impl From<TrainOptions> for CostModelConfig {
    fn from(o: TrainOptions) -> Self {
        CostModelConfig::default()
            .with_n_estimators(o.n_estimators)
            .with_max_depth(o.max_depth)
            .with_min_samples_split(o.min_samples_split)
            .with_test_size(o.test_size)
            .with_random_state(o.seed)
            .with_min_samples(o.min_samples)
    }
}

/// Train and persist the cost model.
pub(crate) fn train(
    dataset_path: &Path,
    out_dir: &Path,
    options: TrainOptions,
    json: bool,
) -> Result<()> {
    let data = Dataset::open(dataset_path)?;
    if data.rejected() > 0 || data.duplicates() > 0 {
        log::warn!(
            "{} malformed and {} duplicate records ignored",
            data.rejected(),
            data.duplicates()
        );
    }

    let model = CostModel::new(options.into()).fit(data.samples())?;
    model.save(out_dir)?;

    let Some(report) = model.report() else {
        return Ok(());
    };
    if json {
        return output::json(report);
    }

    output::section("Training");
    output::kv("samples", report.n_samples);
    output::kv("train / test", format!("{} / {}", report.n_train, report.n_test));
    output::kv("fallback samples", report.fallback_samples);
    output::kv(
        "filament R²",
        format!(
            "{:.3} train, {:.3} test",
            report.filament_r2_train, report.filament_r2_test
        ),
    );
    output::kv(
        "time R²",
        format!(
            "{:.3} train, {:.3} test",
            report.time_r2_train, report.time_r2_test
        ),
    );
    output::kv(
        "test error",
        format!(
            "filament MAE {:.3} m (RMSE {:.3}), time MAE {:.1} min (RMSE {:.1})",
            report.filament_mae_test,
            report.filament_rmse_test,
            report.time_mae_test,
            report.time_rmse_test
        ),
    );
    if report.fallback_samples > 0 {
        output::warning("some samples were trained on substitute vectors");
    }
    output::success(&format!("models saved to {}", out_dir.display()));
    Ok(())
}

/// Rank candidate orientations for one mesh.
pub(crate) fn recommend(
    stl: &Path,
    models: &Path,
    top_k: usize,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    require_file(stl)?;
    let model: TrainedCostModel = TrainedCostModel::load(models)?;
    let extraction = extract_from_path(stl);

    let ranked =
        OrientationRecommender::new(&model).recommend(extraction.vector.as_slice(), top_k)?;
    let report = RecommendationReport::new(&stl.to_string_lossy(), &extraction, &ranked);

    let out = out.unwrap_or_else(|| PathBuf::from(default_report_name(stl)));
    report.save(&out)?;

    if json {
        return output::json(&report);
    }

    output::section(&format!("Orientations for {}", stl.display()));
    if !extraction.is_measured() {
        output::warning("mesh could not be measured; ranking uses a substitute vector");
    }
    println!(
        "  {:>4}  {:<20} {:>12} {:>10} {:>8}",
        "rank".bold(),
        "angles (x, y, z)".bold(),
        "filament m".bold(),
        "time min".bold(),
        "score".bold()
    );
    for r in &report.recommendations {
        println!(
            "  {:>4}  {:<20} {:>12.2} {:>10.1} {:>8.2}",
            r.rank,
            output::angles([r.angles.x, r.angles.y, r.angles.z]),
            r.predicted_filament_m,
            r.predicted_time_min,
            r.score
        );
    }

    if let Some(savings) = &report.savings_vs_default {
        output::section("Savings vs (0, 0, 0)");
        if let (Some(m), Some(p)) = (savings.filament_m, savings.filament_percent) {
            output::kv("filament", format!("{m:.2} m ({p:.1}%)"));
        }
        if let (Some(m), Some(p)) = (savings.time_min, savings.time_percent) {
            output::kv("time", format!("{m:.1} min ({p:.1}%)"));
        }
    }
    output::success(&format!("report written to {}", out.display()));
    Ok(())
}

/// Describe persisted models.
pub(crate) fn info(models: &Path, json: bool) -> Result<()> {
    require_dir(models)?;
    let model: TrainedCostModel = TrainedCostModel::load(models)?;

    if json {
        return match model.report() {
            Some(report) => output::json(report),
            None => output::json(&serde_json::json!({ "n_features": model.n_features() })),
        };
    }

    output::section(&format!("Models: {}", models.display()));
    output::kv("input width", model.n_features());
    output::kv("filament trees", model.filament_model().n_trees());
    output::kv("time trees", model.time_model().n_trees());
    match model.report() {
        Some(report) => {
            output::kv("trained on", format!("{} samples", report.n_samples));
            output::kv("filament R² (test)", format!("{:.3}", report.filament_r2_test));
            output::kv("time R² (test)", format!("{:.3}", report.time_r2_test));
            output::kv("filament MAE (test)", format!("{:.3} m", report.filament_mae_test));
            output::kv("time MAE (test)", format!("{:.1} min", report.time_mae_test));
            output::kv("max depth", report.config.max_depth);
            output::kv("seed", report.config.random_state);
        }
        None => output::warning("no training report found"),
    }

    if let Some(importances) = model.filament_model().feature_importances() {
        output::section("Filament model feature importances");
        let names = FEATURE_NAMES
            .iter()
            .copied()
            .chain(["angle_x", "angle_y", "angle_z"]);
        for (name, importance) in names.zip(importances) {
            output::kv(name, format!("{importance:.3}"));
        }
    }
    Ok(())
}
