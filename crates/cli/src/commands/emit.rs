//! `emit` command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use contracts::{PiiLevel, TrackDataPoint, TrackableEvent};
use dispatcher::AnalyticsManager;
use observability::{BackendSummary, DispatchSummary};

use crate::cli::EmitArgs;
use crate::commands::load_blueprint;
use crate::error::CliError;

/// Execute the `emit` command
pub fn run_emit(args: &EmitArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    for warning in config_loader::collect_warnings(&blueprint) {
        warn!("{}", warning);
    }

    let events = read_events(&args.events)?;
    let manager = dispatcher::create_manager(&blueprint)
        .context("Failed to create backends from configuration")?;

    info!(
        backends = manager.len(),
        events = events.len(),
        as_state = args.state,
        "Broadcasting events"
    );

    let summary = broadcast(&manager, &events, args)?;
    print!("{}", summary);

    Ok(())
}

/// Read a JSON array of events
fn read_events(path: &Path) -> Result<Vec<TrackableEvent>, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::events(path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| CliError::events(path, e.to_string()))
}

fn broadcast(
    manager: &AnalyticsManager,
    events: &[TrackableEvent],
    args: &EmitArgs,
) -> Result<DispatchSummary, CliError> {
    if let Some(ref user) = args.user {
        manager.set_user(&TrackDataPoint::new(user.as_str(), None, args.user_level)?);
    }
    if let Some(ref screen) = args.screen {
        manager.set_current_screen(&TrackDataPoint::new(screen.as_str(), None, PiiLevel::None)?);
    }

    for event in events {
        if args.state {
            manager.track_state(event);
        } else {
            manager.track_event(event);
        }
    }

    Ok(summarize(manager))
}

/// Collect per-backend dispatch metrics into a summary
fn summarize(manager: &AnalyticsManager) -> DispatchSummary {
    DispatchSummary::new(
        manager
            .metrics()
            .into_iter()
            .map(|(name, snapshot)| BackendSummary {
                name,
                delivered: snapshot.delivered_count,
                failed: snapshot.failure_count,
                panicked: snapshot.panic_count,
                skipped: snapshot.skipped_count,
            })
            .collect(),
    )
}
