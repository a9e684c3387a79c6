//! Assemble command implementation.

use std::error::Error;
use std::path::Path;

use tracing::info;

use invsync_import::{assemble, ImportTemplate};
use invsync_local::GraphStore;

use crate::config::CaseConfig;

/// Runs the assemble command: template in, snapshot out.
pub fn run(config: &CaseConfig) -> Result<(), Box<dyn Error>> {
    let mut template = ImportTemplate::from_path(&config.foreground.template)?;
    let filled = template.backfill_database(&config.foreground.name);
    if filled > 0 {
        info!(filled, "backfilled database cells from case config");
    }

    let store = load_or_new(&config.local.snapshot)?;
    let report = assemble(&store, &template, &config.foreground.name)?;
    store.save(&config.local.snapshot)?;

    println!(
        "Assembled '{}' into {}",
        config.foreground.name,
        config.local.snapshot.display()
    );
    println!("  create_activities: {}", report.activities_created);
    println!("  add_exchanges:     {}", report.exchanges_added);
    println!("  copy_activities:   {}", report.activities_copied);
    println!("  delete_exchanges:  {}", report.exchanges_deleted);
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    Ok(())
}

/// Assembly extends an existing snapshot when one is present, so copies can
/// draw on previously pulled databases.
fn load_or_new(snapshot: &Path) -> Result<GraphStore, Box<dyn Error>> {
    if snapshot.exists() {
        Ok(GraphStore::load(snapshot)?)
    } else {
        Ok(GraphStore::new())
    }
}
