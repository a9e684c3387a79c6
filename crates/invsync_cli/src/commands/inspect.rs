//! Inspect command implementation.

use std::error::Error;

use serde::Serialize;

use invsync_local::{GraphStore, LocalStore};
use invsync_model::{Activity, Exchange};

use crate::config::CaseConfig;

/// One activity together with its exchanges.
#[derive(Debug, Serialize)]
pub struct InspectEntry {
    /// The activity record.
    pub activity: Activity,
    /// Its outgoing exchanges.
    pub exchanges: Vec<Exchange>,
}

/// Snapshot listing result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Path of the inspected snapshot.
    pub snapshot: String,
    /// Activities in key order.
    pub entries: Vec<InspectEntry>,
}

/// Runs the inspect command.
pub fn run(config: &CaseConfig, database: Option<&str>, format: &str) -> Result<(), Box<dyn Error>> {
    let store = GraphStore::load(&config.local.snapshot)?;
    let result = listing(
        &store,
        &config.local.snapshot.display().to_string(),
        database,
    )?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result),
    }
    Ok(())
}

fn listing(
    store: &GraphStore,
    snapshot: &str,
    database: Option<&str>,
) -> Result<InspectResult, Box<dyn Error>> {
    let databases = match database {
        Some(name) => vec![name.to_owned()],
        None => store.databases(),
    };

    let mut entries = Vec::new();
    for db in databases {
        for activity in store.activities_in(&db)? {
            let exchanges = store.exchanges_of(&activity.key)?;
            entries.push(InspectEntry { activity, exchanges });
        }
    }
    Ok(InspectResult {
        snapshot: snapshot.to_owned(),
        entries,
    })
}

fn print_text(result: &InspectResult) {
    println!("Snapshot: {}", result.snapshot);
    println!("Activities: {}", result.entries.len());

    let mut current = None;
    for entry in &result.entries {
        let db = &entry.activity.key.database;
        if current != Some(db) {
            println!();
            println!("[{db}]");
            current = Some(db);
        }
        let activity = &entry.activity;
        println!(
            "  {} '{}' {} ({}, {})",
            activity.key.code, activity.name, activity.version, activity.unit, activity.location
        );
        for exchange in &entry.exchanges {
            println!(
                "    -> {}: {} {} ({}) {}",
                exchange.input, exchange.amount, exchange.unit, exchange.exchange_type, exchange.version
            );
        }
    }
}
