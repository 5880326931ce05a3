//! print-orient - print orientation recommendation CLI
//!
//! Usage:
//!   print-orient vectorize part.stl                         # Ten-slot feature vector
//!   print-orient analyze part.stl                           # Overhangs and bed contact
//!   print-orient parse-gcode part.gcode                     # Time and material estimate
//!   print-orient assemble labels/ --dataset dataset.json    # Append labelled samples
//!   print-orient train --dataset dataset.json -o models/    # Fit the cost model
//!   print-orient recommend part.stl --models models/        # Rank 13 orientations
//!   print-orient info --models models/                      # Describe saved models

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod output;

/// print-orient - choose a print orientation that saves filament and time
#[derive(Parser)]
#[command(name = "print-orient")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure an STL mesh into its feature vector
    Vectorize {
        /// Path to the STL file
        #[arg(value_name = "STL")]
        stl: PathBuf,
    },

    /// Report overhangs, bed contact and support needs of an STL mesh
    Analyze {
        /// Path to the STL file
        #[arg(value_name = "STL")]
        stl: PathBuf,
    },

    /// Extract print time and material from G-code comments
    ParseGcode {
        /// Path to the G-code file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Walk a label tree and append new samples to the dataset
    Assemble {
        /// Root of the STL + label JSON tree
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Dataset JSON file (created if missing)
        #[arg(short, long, default_value = "dataset/dataset.json")]
        dataset: PathBuf,
    },

    /// Train the filament and time models
    Train {
        /// Dataset JSON file
        #[arg(short, long, default_value = "dataset/dataset.json")]
        dataset: PathBuf,

        /// Output directory for model artifacts
        #[arg(short, long, default_value = "models")]
        output: PathBuf,

        /// Trees per forest
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Maximum tree depth
        #[arg(long, default_value = "10")]
        max_depth: usize,

        /// Minimum samples to split a node
        #[arg(long, default_value = "5")]
        min_samples_split: usize,

        /// Held-out fraction
        #[arg(long, default_value = "0.2")]
        test_size: f32,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Minimum samples required to train
        #[arg(long, default_value = "10")]
        min_samples: usize,
    },

    /// Rank candidate orientations for an STL mesh
    Recommend {
        /// Path to the STL file
        #[arg(value_name = "STL")]
        stl: PathBuf,

        /// Directory holding trained models
        #[arg(short, long, default_value = "models")]
        models: PathBuf,

        /// Number of orientations to report
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Report path (default: orientation_recommendation_<stem>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show what a model directory contains
    Info {
        /// Directory holding trained models
        #[arg(short, long, default_value = "models")]
        models: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Vectorize { stl } => commands::vectorize(&stl, cli.json),

        Commands::Analyze { stl } => commands::analyze(&stl, cli.json),

        Commands::ParseGcode { file } => commands::parse_gcode(&file, cli.json),

        Commands::Assemble { root, dataset } => commands::assemble(&root, &dataset, cli.json),

        Commands::Train {
            dataset,
            output,
            n_estimators,
            max_depth,
            min_samples_split,
            test_size,
            seed,
            min_samples,
        } => commands::train(
            &dataset,
            &output,
            commands::TrainOptions {
                n_estimators,
                max_depth,
                min_samples_split,
                test_size,
                seed,
                min_samples,
            },
            cli.json,
        ),

        Commands::Recommend {
            stl,
            models,
            top_k,
            output,
        } => commands::recommend(&stl, &models, top_k, output, cli.json),

        Commands::Info { models } => commands::info(&models, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_defaults() {
        let cli = Cli::parse_from(["print-orient", "train"]);
        match cli.command {
            Commands::Train {
                n_estimators,
                max_depth,
                min_samples_split,
                test_size,
                seed,
                min_samples,
                ..
            } => {
                assert_eq!(n_estimators, 100);
                assert_eq!(max_depth, 10);
                assert_eq!(min_samples_split, 5);
                assert!((test_size - 0.2).abs() < 1e-6);
                assert_eq!(seed, 42);
                assert_eq!(min_samples, 10);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_recommend_flags() {
        let cli = Cli::parse_from([
            "print-orient",
            "recommend",
            "part.stl",
            "--models",
            "m",
            "-k",
            "3",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Recommend {
                stl, top_k, output, ..
            } => {
                assert_eq!(stl, PathBuf::from("part.stl"));
                assert_eq!(top_k, 3);
                assert!(output.is_none());
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_analyze_takes_stl() {
        let cli = Cli::parse_from(["print-orient", "analyze", "part.stl"]);
        assert!(!cli.json);
        match cli.command {
            Commands::Analyze { stl } => assert_eq!(stl, PathBuf::from("part.stl")),
            _ => panic!("expected analyze"),
        }
    }
}
