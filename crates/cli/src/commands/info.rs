//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use contracts::{PiiLevel, TrackDecision};
use dispatcher::{AnalyticsManager, BackendRegistration};

use crate::cli::InfoArgs;
use crate::commands::load_blueprint;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    isolate_faults: bool,
    backends: Vec<BackendInfo>,
    /// level -> backend -> decision
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<BTreeMap<PiiLevel, BTreeMap<String, TrackDecision>>>,
}

#[derive(Serialize)]
struct BackendInfo {
    name: String,
    handles_levels: Vec<PiiLevel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bypass_levels: Vec<PiiLevel>,
    capabilities: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let manager = dispatcher::create_manager(&blueprint)
        .context("Failed to create backends from configuration")?;

    let info = build_config_info(&blueprint.version, &manager, args.matrix);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(
    version: &contracts::ConfigVersion,
    manager: &AnalyticsManager,
    with_matrix: bool,
) -> ConfigInfo {
    let registrations = manager.registrations();

    let backends = registrations
        .iter()
        .map(|r| BackendInfo {
            name: r.name().to_string(),
            handles_levels: r.policy().handles.to_vec(),
            bypass_levels: r.policy().bypasses.to_vec(),
            capabilities: r.capabilities().iter().map(|c| c.to_string()).collect(),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", version),
        isolate_faults: manager.settings().isolate_faults,
        backends,
        matrix: with_matrix.then(|| level_matrix(&registrations)),
    }
}

fn level_matrix(
    registrations: &[std::sync::Arc<BackendRegistration>],
) -> BTreeMap<PiiLevel, BTreeMap<String, TrackDecision>> {
    PiiLevel::ALL
        .iter()
        .map(|&level| {
            let row = registrations
                .iter()
                .map(|r| (r.name().to_string(), r.policy().decide(level)))
                .collect();
            (level, row)
        })
        .collect()
}

fn decision_label(decision: TrackDecision) -> &'static str {
    match decision {
        TrackDecision::Handled => "handled",
        TrackDecision::Bypassed => "BYPASS",
        TrackDecision::Denied => "-",
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 PII Dispatch Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Dispatch");
    println!("   ├─ Version: {}", info.version);
    println!("   └─ Fault isolation: {}", info.isolate_faults);

    println!("\n📤 Backends ({})", info.backends.len());
    for (i, backend) in info.backends.iter().enumerate() {
        let is_last = i == info.backends.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!("   {} {}", prefix, backend.name);
        println!("   {}  ├─ Handles: {:?}", child_prefix, backend.handles_levels);
        if !backend.bypass_levels.is_empty() {
            println!("   {}  ├─ ⚠ Bypasses: {:?}", child_prefix, backend.bypass_levels);
        }
        println!("   {}  └─ Capabilities: {}", child_prefix, backend.capabilities.join(", "));
    }

    if let Some(ref matrix) = info.matrix {
        println!("\n🔒 Level Matrix");
        let names: Vec<&str> = info.backends.iter().map(|b| b.name.as_str()).collect();
        println!("   {:<16} {}", "level", names.join("  "));
        for (level, row) in matrix {
            let cells: Vec<String> = names
                .iter()
                .map(|name| {
                    let label = row.get(*name).copied().map(decision_label).unwrap_or("-");
                    format!("{:<width$}", label, width = name.len())
                })
                .collect();
            println!("   {:<16} {}", level.as_str(), cells.join("  "));
        }
    }

    println!();
}
