//! Collect end-to-end timings of the feature pipeline on synthetic surveys.
//!
//! For each training size this runs the standard pipeline plus the
//! label-aware steps and records:
//! - timing statistics over several runs
//! - the output width
//!
//! Usage: `collect_timings [output.json]`. Set `RUST_LOG=waterpoint_features=info`
//! to see per-step timings.

use benchmarks::{benchmark_with_warmup, BenchmarkStats, SurveyGenerator};
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;
use waterpoint_features::{FeaturePipeline, PipelineConfig};

const SIZES: [usize; 3] = [1_000, 5_000, 20_000];

#[derive(Serialize)]
struct SizeReport {
    training_rows: usize,
    evaluation_rows: usize,
    output_columns: usize,
    timing: BenchmarkStats,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = PipelineConfig::default()
        .with_projection_columns(["longitude", "latitude", "gps_height", "population"]);
    let mut reports = Vec::with_capacity(SIZES.len());

    for &n in &SIZES {
        let survey = SurveyGenerator::new(42).survey(n, n / 4)?;
        let pipeline = FeaturePipeline::standard(&config)?.with_label_steps(&config, &survey.labels)?;

        let (results, timing) = benchmark_with_warmup(1, 5, || {
            pipeline.run(survey.training.clone(), survey.evaluation.clone())
        });
        let output_columns = match results.into_iter().next() {
            Some(result) => result?.training.n_columns(),
            None => 0,
        };
        info!(rows = n, mean_ms = timing.mean_ms, output_columns, "measured pipeline");

        reports.push(SizeReport {
            training_rows: n,
            evaluation_rows: n / 4,
            output_columns,
            timing,
        });
    }

    let json = serde_json::to_string_pretty(&reports)?;
    match std::env::args().nth(1) {
        Some(path) => {
            let mut file = File::create(&path)?;
            file.write_all(json.as_bytes())?;
            println!("Wrote {} reports to {}", reports.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
