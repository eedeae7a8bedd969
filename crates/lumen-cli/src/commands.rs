//! CLI command implementations

use crate::output::{self, OutputFormat};
use crate::simulator::{self, Script};
use crate::store::JsonFileStore;
use anyhow::Context;
use lumen_core::{format_time, KeyValueStore, MemoryStore, PlayerConfig};
use std::path::Path;
use tracing::info;

/// Replay a scripted session and print the final page state
pub fn simulate(
    script_path: &Path,
    prefs: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let script_text = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&script_text)
        .with_context(|| format!("parsing script {}", script_path.display()))?;

    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            PlayerConfig::from_json(&text)?
        }
        None => PlayerConfig::default(),
    };

    let store: Box<dyn KeyValueStore> = match prefs {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };

    info!(
        script = %script_path.display(),
        steps = script.steps.len(),
        "Simulating session"
    );
    let snapshot = simulator::run_script(config, &script, store)?;
    Ok(output::format_snapshot(&snapshot, format))
}

/// Format each value as `M:SS`
pub fn format_times(seconds: &[f64], format: OutputFormat) -> String {
    let times: Vec<(f64, String)> = seconds.iter().map(|&s| (s, format_time(s))).collect();
    output::format_times(&times, format)
}
