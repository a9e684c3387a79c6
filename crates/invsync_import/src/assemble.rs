//! Foreground database assembly.
//!
//! Turns a parsed [`ImportTemplate`] into activities and exchanges in a
//! local [`GraphStore`]: create rows become new activities (with generated
//! codes where none are given), exchange rows are attached to them, copy
//! rows duplicate existing activities into the target database, and delete
//! rows remove unwanted edges.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info, warn};
use uuid::Uuid;

use invsync_local::{GraphStore, LocalStore, LocalStoreError};
use invsync_model::{Activity, ActivityKey, Exchange, Version};

use crate::error::{ImportError, ImportResult};
use crate::tables::ImportTemplate;

/// Activity type assembled rows default to when the template has none.
pub const DEFAULT_ACTIVITY_TYPE: &str = "production";

/// What one assembly run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyReport {
    /// Activities created from `create_activities` rows.
    pub activities_created: u64,
    /// Exchanges attached from `add_exchanges` rows.
    pub exchanges_added: u64,
    /// Activities copied from `copy_activities` rows.
    pub activities_copied: u64,
    /// Exchanges removed by `delete_exchanges` rows.
    pub exchanges_deleted: u64,
    /// Non-fatal events: skipped copies and unmatched deletes.
    pub warnings: Vec<String>,
}

impl AssemblyReport {
    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {} activities, added {} exchanges, copied {} activities, \
             deleted {} exchanges, {} warnings",
            self.activities_created,
            self.exchanges_added,
            self.activities_copied,
            self.exchanges_deleted,
            self.warnings.len()
        )
    }
}

/// Codes assigned during the create pass, for resolving later rows.
#[derive(Debug, Default)]
struct CreatedCodes {
    /// `(database, activity name, location)` to code.
    by_activity: BTreeMap<(String, String, String), String>,
    /// `(database, reference product, location)` to code.
    by_product: BTreeMap<(String, String, String), String>,
}

/// Assembles `template` into `store`, targeting the logical `database`.
///
/// Runs the four table passes in order: create, add exchanges, copy,
/// delete. All writes go through the store's version-gated upserts, so
/// re-running a template with explicit codes leaves the store unchanged.
///
/// # Errors
///
/// Fails on invalid rows, exchange owners that were never created,
/// unresolvable input codes, a missing copy source database, or a store
/// failure. A missing individual copy source activity and an unmatched
/// delete row are warnings in the report, not errors.
pub fn assemble(
    store: &GraphStore,
    template: &ImportTemplate,
    database: &str,
) -> ImportResult<AssemblyReport> {
    template.validate()?;
    let mut report = AssemblyReport::default();

    let codes = create_activities(store, template, database, &mut report)?;
    add_exchanges(store, template, database, &codes, &mut report)?;
    copy_activities(store, template, database, &mut report)?;
    delete_exchanges(store, template, database, &mut report)?;

    info!(
        database,
        created = report.activities_created,
        exchanges = report.exchanges_added,
        copied = report.activities_copied,
        deleted = report.exchanges_deleted,
        "assembly finished"
    );
    Ok(report)
}

fn fresh_code() -> String {
    Uuid::new_v4().simple().to_string()
}

fn create_activities(
    store: &GraphStore,
    template: &ImportTemplate,
    database: &str,
    report: &mut AssemblyReport,
) -> ImportResult<CreatedCodes> {
    let mut codes = CreatedCodes::default();
    for row in &template.create_activities {
        let db = row.activity_database.as_deref().unwrap_or(database);
        let code = match &row.code {
            Some(code) => code.clone(),
            None => fresh_code(),
        };
        let activity_type = row.activity_type.as_deref().unwrap_or(DEFAULT_ACTIVITY_TYPE);

        let mut activity = Activity::new(
            ActivityKey::new(db, code.as_str()),
            row.activity.as_str(),
            row.activity_location.as_str(),
            activity_type,
            row.reference_product_unit.as_str(),
            Version::new(row.activity_version),
        );
        if let Some(comment) = &row.comment {
            activity = activity.with_comment(comment.as_str());
        }
        activity.validate()?;

        debug!(key = %activity.key, name = %activity.name, "create activity");
        codes.by_activity.insert(
            (db.to_owned(), row.activity.clone(), row.activity_location.clone()),
            code.clone(),
        );
        codes.by_product.insert(
            (db.to_owned(), row.reference_product.clone(), row.activity_location.clone()),
            code,
        );
        store.upsert_activity(activity)?;
        report.activities_created += 1;
    }
    Ok(codes)
}

fn add_exchanges(
    store: &GraphStore,
    template: &ImportTemplate,
    database: &str,
    codes: &CreatedCodes,
    report: &mut AssemblyReport,
) -> ImportResult<()> {
    // Resolve every owner first so the error can list all orphans at once.
    let mut owners = Vec::with_capacity(template.add_exchanges.len());
    let mut orphans = BTreeSet::new();
    for row in &template.add_exchanges {
        let db = row.activity_database.as_deref().unwrap_or(database);
        let code = match &row.activity_code {
            Some(code) => Some(code.clone()),
            None => codes
                .by_activity
                .get(&(db.to_owned(), row.activity.clone(), row.activity_location.clone()))
                .cloned(),
        };
        match code {
            Some(code) => owners.push(ActivityKey::new(db, code)),
            None => {
                orphans.insert(row.activity.clone());
            }
        }
    }
    if !orphans.is_empty() {
        let list = orphans.into_iter().collect::<Vec<_>>().join(", ");
        return Err(ImportError::UnknownOwners { owners: list });
    }

    for (row, owner) in template.add_exchanges.iter().zip(owners) {
        let input_db = row.exchange_database.as_deref().unwrap_or(database);
        let input_code = match &row.exchange_code {
            Some(code) => code.clone(),
            None => codes
                .by_product
                .get(&(input_db.to_owned(), row.exchange.clone(), row.activity_location.clone()))
                .cloned()
                .ok_or_else(|| ImportError::UnresolvedInput {
                    activity: row.activity.clone(),
                    exchange: row.exchange.clone(),
                    database: input_db.to_owned(),
                })?,
        };

        let mut exchange = Exchange::new(
            ActivityKey::new(input_db, input_code),
            row.amount,
            row.unit.as_str(),
            row.exchange_type.as_str(),
            Version::new(0),
        );
        if let Some(uncertainty) = row.uncertainty_type {
            exchange = exchange.with_uncertainty_type(uncertainty);
        }

        debug!(owner = %owner, input = %exchange.input, "add exchange");
        store.upsert_exchange(&owner, exchange)?;
        report.exchanges_added += 1;
    }
    Ok(())
}

fn copy_activities(
    store: &GraphStore,
    template: &ImportTemplate,
    database: &str,
    report: &mut AssemblyReport,
) -> ImportResult<()> {
    if template.copy_activities.is_empty() {
        return Ok(());
    }
    let present = store.databases();
    for row in &template.copy_activities {
        if !present.iter().any(|d| d == &row.source_database) {
            return Err(ImportError::MissingSourceDatabase {
                database: row.source_database.clone(),
            });
        }

        let source = ActivityKey::new(row.source_database.as_str(), row.activity_code.as_str());
        let activity = match store.get_activity(&source) {
            Ok(activity) => activity,
            Err(LocalStoreError::ActivityNotFound { .. }) => {
                report.warn(format!(
                    "copy: {} ({}) not found in {}",
                    row.activity, row.activity_code, row.source_database
                ));
                continue;
            }
            Err(other) => return Err(other.into()),
        };
        let exchanges = store.exchanges_of(&source)?;

        let target = ActivityKey::new(database, row.activity_code.as_str());
        debug!(source = %source, target = %target, "copy activity");
        let mut copy = activity;
        copy.key = target.clone();
        store.upsert_activity(copy)?;
        for exchange in exchanges {
            store.upsert_exchange(&target, exchange)?;
        }
        report.activities_copied += 1;
    }
    Ok(())
}

fn delete_exchanges(
    store: &GraphStore,
    template: &ImportTemplate,
    database: &str,
    report: &mut AssemblyReport,
) -> ImportResult<()> {
    for row in &template.delete_exchanges {
        let owner_db = row.activity_database.as_deref().unwrap_or(database);
        let owner = match resolve_key(store, owner_db, &row.activity, row.activity_code.as_deref())?
        {
            Some(key) => key,
            None => {
                report.warn(format!(
                    "delete: activity '{}' not found in {owner_db}",
                    row.activity
                ));
                continue;
            }
        };

        let input_db = row.exchange_database.as_deref().unwrap_or(database);
        let input = match resolve_key(store, input_db, &row.exchange, row.exchange_code.as_deref())?
        {
            Some(key) => key,
            None => {
                report.warn(format!(
                    "delete: exchange input '{}' not found in {input_db}",
                    row.exchange
                ));
                continue;
            }
        };

        let removed = store.remove_exchanges_to(&owner, &input);
        if removed == 0 {
            report.warn(format!("delete: no exchange from {owner} to {input} matched"));
        } else {
            debug!(owner = %owner, input = %input, removed, "delete exchanges");
            report.exchanges_deleted += removed as u64;
        }
    }
    Ok(())
}

/// Resolves `(database, name-or-code)` to a key: an explicit code wins, a
/// name falls back to the first matching activity in that database.
fn resolve_key(
    store: &GraphStore,
    database: &str,
    name: &str,
    code: Option<&str>,
) -> ImportResult<Option<ActivityKey>> {
    if let Some(code) = code {
        let key = ActivityKey::new(database, code);
        return Ok(store.activity_exists(&key)?.then_some(key));
    }
    Ok(store
        .activities_in(database)?
        .into_iter()
        .find(|a| a.name == name)
        .map(|a| a.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{AddExchangeRow, CopyActivityRow, CreateActivityRow, DeleteExchangeRow};
    use invsync_model::DEFAULT_UNCERTAINTY_TYPE;

    const FOREGROUND: &str = "foreground";

    fn create_row(name: &str, product: &str, unit: &str) -> CreateActivityRow {
        CreateActivityRow {
            activity: name.into(),
            reference_product: product.into(),
            reference_product_unit: unit.into(),
            activity_location: "GLO".into(),
            activity_version: 1,
            ..Default::default()
        }
    }

    fn add_row(owner: &str, input: &str, amount: f64) -> AddExchangeRow {
        AddExchangeRow {
            activity: owner.into(),
            activity_location: "GLO".into(),
            exchange: input.into(),
            amount,
            unit: "MJ".into(),
            exchange_type: "technosphere".into(),
            ..Default::default()
        }
    }

    fn seed_background(store: &GraphStore) {
        store
            .upsert_activity(Activity::new(
                ActivityKey::new("background", "bg-1"),
                "Transport, lorry",
                "RER",
                "production",
                "tkm",
                Version::new(4),
            ))
            .unwrap();
        store
            .upsert_exchange(
                &ActivityKey::new("background", "bg-1"),
                Exchange::new(
                    ActivityKey::new("background", "bg-2"),
                    0.3,
                    "kg",
                    "technosphere",
                    Version::new(2),
                ),
            )
            .unwrap();
    }

    #[test]
    fn creates_activities_with_generated_codes() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![
                create_row("Electricity production", "electricity", "kWh"),
                create_row("Fuel production", "fuel", "MJ"),
            ],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.activities_created, 2);
        assert!(report.warnings.is_empty());

        let activities = store.activities_in(FOREGROUND).unwrap();
        assert_eq!(activities.len(), 2);
        for activity in &activities {
            assert_eq!(activity.key.code.len(), 32);
            assert!(activity.key.code.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(activity.activity_type, DEFAULT_ACTIVITY_TYPE);
            assert_eq!(activity.version, Version::new(1));
        }
    }

    #[test]
    fn explicit_codes_and_types_are_kept() {
        let store = GraphStore::new();
        let mut row = create_row("Carbon dioxide", "carbon dioxide", "kg");
        row.code = Some("co2".into());
        row.activity_type = Some("biosphere".into());
        let template = ImportTemplate {
            create_activities: vec![row],
            ..Default::default()
        };

        assemble(&store, &template, FOREGROUND).unwrap();
        let activity = store
            .get_activity(&ActivityKey::new(FOREGROUND, "co2"))
            .unwrap();
        assert_eq!(activity.activity_type, "biosphere");
    }

    #[test]
    fn exchange_inherits_the_created_product_code() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![
                create_row("Electricity production", "electricity", "kWh"),
                create_row("Fuel production", "fuel", "MJ"),
            ],
            add_exchanges: vec![add_row("Electricity production", "fuel", 2.5)],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.exchanges_added, 1);

        let activities = store.activities_in(FOREGROUND).unwrap();
        let owner = activities.iter().find(|a| a.name == "Electricity production").unwrap();
        let fuel = activities.iter().find(|a| a.name == "Fuel production").unwrap();

        let exchanges = store.exchanges_of(&owner.key).unwrap();
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].input, fuel.key);
        assert_eq!(exchanges[0].amount, 2.5);
        assert_eq!(exchanges[0].version, Version::new(0));
        assert_eq!(exchanges[0].uncertainty_type, DEFAULT_UNCERTAINTY_TYPE);
    }

    #[test]
    fn explicit_exchange_code_wins() {
        let store = GraphStore::new();
        let mut exchange_row = add_row("Electricity production", "Transport, lorry", 0.1);
        exchange_row.exchange_database = Some("background".into());
        exchange_row.exchange_code = Some("bg-lorry-16t".into());
        exchange_row.uncertainty_type = Some(2);
        let template = ImportTemplate {
            create_activities: vec![create_row("Electricity production", "electricity", "kWh")],
            add_exchanges: vec![exchange_row],
            ..Default::default()
        };

        assemble(&store, &template, FOREGROUND).unwrap();
        let owner = &store.activities_in(FOREGROUND).unwrap()[0];
        let exchanges = store.exchanges_of(&owner.key).unwrap();
        assert_eq!(exchanges[0].input, ActivityKey::new("background", "bg-lorry-16t"));
        assert_eq!(exchanges[0].uncertainty_type, 2);
    }

    #[test]
    fn orphan_owner_is_fatal_and_lists_names() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![create_row("Electricity production", "electricity", "kWh")],
            add_exchanges: vec![
                add_row("Steel production", "electricity", 1.0),
                add_row("Cement production", "electricity", 2.0),
            ],
            ..Default::default()
        };

        let err = assemble(&store, &template, FOREGROUND).unwrap_err();
        match err {
            ImportError::UnknownOwners { owners } => {
                assert_eq!(owners, "Cement production, Steel production");
            }
            other => panic!("expected unknown owners, got {other}"),
        }
    }

    #[test]
    fn unresolved_input_is_fatal() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![create_row("Electricity production", "electricity", "kWh")],
            add_exchanges: vec![add_row("Electricity production", "mystery flow", 1.0)],
            ..Default::default()
        };

        let err = assemble(&store, &template, FOREGROUND).unwrap_err();
        assert!(matches!(err, ImportError::UnresolvedInput { .. }));
        assert!(err.to_string().contains("mystery flow"));
    }

    #[test]
    fn copy_brings_activity_and_exchanges() {
        let store = GraphStore::new();
        seed_background(&store);
        let template = ImportTemplate {
            copy_activities: vec![CopyActivityRow {
                source_database: "background".into(),
                activity: "Transport, lorry".into(),
                activity_code: "bg-1".into(),
            }],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.activities_copied, 1);

        let copied = store
            .get_activity(&ActivityKey::new(FOREGROUND, "bg-1"))
            .unwrap();
        assert_eq!(copied.name, "Transport, lorry");
        assert_eq!(copied.version, Version::new(4));

        let exchanges = store
            .exchanges_of(&ActivityKey::new(FOREGROUND, "bg-1"))
            .unwrap();
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].input, ActivityKey::new("background", "bg-2"));

        // The source copy is untouched.
        assert!(store.activity_exists(&ActivityKey::new("background", "bg-1")).unwrap());
    }

    #[test]
    fn copy_of_missing_activity_warns_and_continues() {
        let store = GraphStore::new();
        seed_background(&store);
        let template = ImportTemplate {
            copy_activities: vec![
                CopyActivityRow {
                    source_database: "background".into(),
                    activity: "Ghost".into(),
                    activity_code: "bg-404".into(),
                },
                CopyActivityRow {
                    source_database: "background".into(),
                    activity: "Transport, lorry".into(),
                    activity_code: "bg-1".into(),
                },
            ],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.activities_copied, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("bg-404"));
        assert!(store.activity_exists(&ActivityKey::new(FOREGROUND, "bg-1")).unwrap());
    }

    #[test]
    fn copy_from_missing_database_is_fatal() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            copy_activities: vec![CopyActivityRow {
                source_database: "nowhere".into(),
                activity: "Anything".into(),
                activity_code: "x".into(),
            }],
            ..Default::default()
        };

        let err = assemble(&store, &template, FOREGROUND).unwrap_err();
        assert!(matches!(err, ImportError::MissingSourceDatabase { .. }));
    }

    #[test]
    fn delete_removes_the_matching_edge() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![
                create_row("Electricity production", "electricity", "kWh"),
                create_row("Fuel production", "fuel", "MJ"),
            ],
            add_exchanges: vec![add_row("Electricity production", "fuel", 2.5)],
            delete_exchanges: vec![DeleteExchangeRow {
                activity: "Electricity production".into(),
                exchange: "Fuel production".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.exchanges_added, 1);
        assert_eq!(report.exchanges_deleted, 1);
        assert!(report.warnings.is_empty());

        let owner = store
            .activities_in(FOREGROUND)
            .unwrap()
            .into_iter()
            .find(|a| a.name == "Electricity production")
            .unwrap();
        assert!(store.exchanges_of(&owner.key).unwrap().is_empty());
    }

    #[test]
    fn unmatched_delete_warns_instead_of_failing() {
        let store = GraphStore::new();
        let template = ImportTemplate {
            create_activities: vec![create_row("Electricity production", "electricity", "kWh")],
            delete_exchanges: vec![DeleteExchangeRow {
                activity: "Electricity production".into(),
                exchange: "Never attached".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let report = assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(report.exchanges_deleted, 0);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn rerun_with_explicit_codes_changes_nothing() {
        let store = GraphStore::new();
        let mut elec = create_row("Electricity production", "electricity", "kWh");
        elec.code = Some("elec-01".into());
        let mut fuel = create_row("Fuel production", "fuel", "MJ");
        fuel.code = Some("fuel-01".into());
        let template = ImportTemplate {
            create_activities: vec![elec, fuel],
            add_exchanges: vec![add_row("Electricity production", "fuel", 2.5)],
            ..Default::default()
        };

        assemble(&store, &template, FOREGROUND).unwrap();
        let activities_before = store.activity_count();
        let exchanges_before = store.exchange_count();

        assemble(&store, &template, FOREGROUND).unwrap();
        assert_eq!(store.activity_count(), activities_before);
        assert_eq!(store.exchange_count(), exchanges_before);
    }
}
