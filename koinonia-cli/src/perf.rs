//! Performance baseline and regression CLI commands.

use crate::PerfCommands;
use koinonia_bench::{
    BaselineStore, BenchError, BenchmarkEngine, DEFAULT_BASELINE_DIR, DEFAULT_VERSION,
    MetricSample, print_report,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the baseline storage directory.
const BASELINE_DIR_ENV: &str = "KOINONIA_BASELINE_DIR";

/// Resolve the baseline directory: flag, then environment, then default.
fn resolve_store(dir: Option<PathBuf>) -> BaselineStore {
    let dir = dir
        .or_else(|| env::var(BASELINE_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASELINE_DIR));
    BaselineStore::new(dir)
}

/// Load metric samples from a JSON file.
fn load_samples(path: &Path) -> Result<Vec<MetricSample>, BenchError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn run_perf_command(command: PerfCommands) -> Result<(), BenchError> {
    match command {
        PerfCommands::Baseline {
            input,
            name,
            version,
            dir,
        } => {
            let mut engine = BenchmarkEngine::with_store(resolve_store(dir));
            engine.record_metrics(load_samples(&input)?);

            let version = version.as_deref().unwrap_or(DEFAULT_VERSION);
            let baseline = engine.create_baseline_with_version(&name, version)?;
            println!(
                "✅ Created baseline '{}' v{} with {} metric(s)",
                baseline.name,
                baseline.version,
                baseline.metrics.len()
            );
        }

        PerfCommands::Check { input, name, dir } => {
            let store = resolve_store(dir);
            let baseline = store
                .latest(&name)?
                .ok_or_else(|| BenchError::BaselineNotFound(name.clone()))?;

            let mut engine = BenchmarkEngine::with_store(store);
            engine.record_metrics(load_samples(&input)?);

            let analysis = engine.analyze_regression(&baseline, None);
            print_report(&analysis);

            if !analysis.passed() {
                println!("❌ Performance regressions detected!");
                std::process::exit(1);
            }
            println!("✅ No blocking regressions detected!");
        }

        PerfCommands::List { dir } => {
            let store = resolve_store(dir);
            let files = store.list()?;
            if files.is_empty() {
                println!("No baselines found in {}", store.dir().display());
            } else {
                for file in files {
                    println!("{file}");
                }
            }
        }

        PerfCommands::Show { name, dir } => {
            let store = resolve_store(dir);
            let baseline = store
                .latest(&name)?
                .ok_or_else(|| BenchError::BaselineNotFound(name))?;
            println!("{}", serde_json::to_string_pretty(&baseline)?);
        }
    }

    Ok(())
}
