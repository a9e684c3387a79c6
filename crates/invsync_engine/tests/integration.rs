//! End-to-end sync runs against a real SQLite remote.

use invsync_engine::{SyncEngine, SyncError, SyncOptions, MAX_RESOLVE_DEPTH};
use invsync_local::{GraphStore, LocalStore};
use invsync_model::Version;
use invsync_remote::{RemoteStore, SqliteStore};
use invsync_testkit::{
    sample_network, scenarios, ActivityBuilder, SampleKeys, TestRemote, SAMPLE_DATABASE,
};

fn engine_over(local: GraphStore) -> SyncEngine<GraphStore, SqliteStore> {
    let remote = TestRemote::memory();
    SyncEngine::new(local, remote.store, SAMPLE_DATABASE)
}

#[test]
fn full_sync_writes_everything_then_settles() {
    let engine = engine_over(sample_network());

    let first = engine.sync(SyncOptions::default()).unwrap();
    assert_eq!(first.push.activities_created, 3);
    assert_eq!(first.push.exchanges_created, 3);
    // The pull pass sees its own pushed copies.
    assert_eq!(first.pull.activities_unchanged, 3);
    assert_eq!(first.pull.exchanges_unchanged, 3);
    assert!(first.warnings.is_empty());

    let again = engine.sync(SyncOptions::default()).unwrap();
    assert!(again.is_noop(), "second run must write nothing: {again}");
}

#[test]
fn local_version_bump_updates_the_remote() {
    let engine = engine_over(sample_network());
    engine.sync(SyncOptions::default()).unwrap();

    let keys = SampleKeys::new();
    engine
        .local()
        .upsert_activity(
            ActivityBuilder::new(SAMPLE_DATABASE, "electricity")
                .name("Electricity production, revised")
                .unit("kWh")
                .version(2)
                .build(),
        )
        .unwrap();

    let report = engine.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.push.activities_updated, 1);
    assert!(report.warnings.is_empty());

    let remote_copy = engine
        .remote()
        .get_activity(SAMPLE_DATABASE, "electricity")
        .unwrap();
    assert_eq!(remote_copy.version, Version::new(2));
    assert_eq!(remote_copy.name, "Electricity production, revised");
    // The bump must not disturb the activity's exchanges.
    assert_eq!(
        engine
            .remote()
            .exchanges_of(SAMPLE_DATABASE, &keys.electricity.code)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn remote_edit_flows_back_on_pull() {
    let engine = engine_over(sample_network());
    engine.sync(SyncOptions::default()).unwrap();

    engine
        .remote()
        .update_activity(
            &ActivityBuilder::new(SAMPLE_DATABASE, "fuel")
                .name("Fuel production, refined")
                .unit("MJ")
                .version(2)
                .build(),
        )
        .unwrap();

    let report = engine.sync(SyncOptions::default()).unwrap();
    assert_eq!(report.pull.activities_updated, 1);

    let keys = SampleKeys::new();
    let local_copy = engine.local().get_activity(&keys.fuel).unwrap();
    assert_eq!(local_copy.version, Version::new(2));
    assert_eq!(local_copy.name, "Fuel production, refined");
    assert_eq!(engine.local().exchanges_of(&keys.fuel).unwrap().len(), 1);
}

#[test]
fn conflicting_copies_converge_to_the_newer_version() {
    let engine = engine_over(sample_network());
    engine.sync(SyncOptions::default()).unwrap();

    // Both sides edit electricity; the remote edit is newer.
    engine
        .local()
        .upsert_activity(
            ActivityBuilder::new(SAMPLE_DATABASE, "electricity")
                .name("Electricity production, local edit")
                .unit("kWh")
                .version(3)
                .build(),
        )
        .unwrap();
    engine
        .remote()
        .update_activity(
            &ActivityBuilder::new(SAMPLE_DATABASE, "electricity")
                .name("Electricity production, remote edit")
                .unit("kWh")
                .version(5)
                .build(),
        )
        .unwrap();

    let report = engine.sync(SyncOptions::default()).unwrap();
    // The push is rejected with a warning, the pull adopts the newer copy.
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].incoming, Version::new(3));
    assert_eq!(report.warnings[0].existing, Version::new(5));
    assert_eq!(report.pull.activities_updated, 1);

    let keys = SampleKeys::new();
    let local_copy = engine.local().get_activity(&keys.electricity).unwrap();
    assert_eq!(local_copy.version, Version::new(5));
    assert_eq!(local_copy.name, "Electricity production, remote edit");

    let settled = engine.sync(SyncOptions::default()).unwrap();
    assert!(settled.is_noop(), "converged run must settle: {settled}");
}

#[test]
fn mutual_dependency_terminates_and_settles() {
    let (local, a, b) = scenarios::two_node_cycle();
    let engine = engine_over(local);

    let report = engine.sync(SyncOptions::push_only()).unwrap();
    assert_eq!(report.push.activities_created, 2);
    assert_eq!(report.push.exchanges_created, 2);

    let remote = engine.remote();
    assert_eq!(
        remote.exchange_version(&a.code, &b.code).unwrap(),
        Some(Version::new(1))
    );
    assert_eq!(
        remote.exchange_version(&b.code, &a.code).unwrap(),
        Some(Version::new(1))
    );

    let again = engine.sync(SyncOptions::default()).unwrap();
    assert!(again.is_noop());
}

#[test]
fn deep_chain_resolves_depth_first() {
    let engine = engine_over(scenarios::chain_network(64));

    let report = engine.sync(SyncOptions::push_only()).unwrap();
    assert_eq!(report.push.activities_created, 64);
    assert_eq!(report.push.exchanges_created, 63);

    let again = engine.sync(SyncOptions::default()).unwrap();
    assert!(again.is_noop());
}

#[test]
fn over_deep_dependency_chain_is_rejected() {
    let engine = engine_over(scenarios::chain_network(MAX_RESOLVE_DEPTH + 8));

    let err = engine.sync(SyncOptions::push_only()).unwrap_err();
    assert!(matches!(err, SyncError::DepthExceeded { max, .. } if max == MAX_RESOLVE_DEPTH));
}

#[test]
fn pushed_data_survives_reopening_the_file() {
    let remote = TestRemote::file();
    let path = remote.path().unwrap();
    let engine = SyncEngine::new(sample_network(), remote.store, SAMPLE_DATABASE);
    engine.sync(SyncOptions::push_only()).unwrap();
    drop(engine.into_parts());

    let reopened = SqliteStore::open(&path, "test").unwrap();
    assert!(reopened.database_registered(SAMPLE_DATABASE).unwrap());
    assert_eq!(
        reopened
            .activity_version(SAMPLE_DATABASE, "electricity")
            .unwrap(),
        Some(Version::new(1))
    );
    assert_eq!(
        reopened.exchanges_of(SAMPLE_DATABASE, "electricity").unwrap().len(),
        2
    );
}
