//! Sync command implementation.

use std::error::Error;

use invsync_engine::{SyncEngine, SyncOptions};
use invsync_local::GraphStore;
use invsync_remote::SqliteStore;

use crate::config::CaseConfig;

/// Runs the sync command with the configured passes, or the pass a
/// `--push-only`/`--pull-only` flag selects.
pub fn run(config: &CaseConfig, push_only: bool, pull_only: bool) -> Result<(), Box<dyn Error>> {
    let options = options_for(config, push_only, pull_only);
    let local = GraphStore::load(&config.local.snapshot)?;
    let remote = SqliteStore::open(&config.remote.path, &config.remote.schema)?;

    let engine = SyncEngine::new(local, remote, config.foreground.name.as_str());
    let report = engine.sync(options)?;
    println!("{report}");

    // Only the pull pass mutates the local store.
    if options.pull {
        let (local, _remote) = engine.into_parts();
        local.save(&config.local.snapshot)?;
    }

    Ok(())
}

fn options_for(config: &CaseConfig, push_only: bool, pull_only: bool) -> SyncOptions {
    if push_only {
        SyncOptions::push_only()
    } else if pull_only {
        SyncOptions::pull_only()
    } else {
        SyncOptions::new(config.sync.push, config.sync.pull)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForegroundConfig, LocalConfig, PassConfig, RemoteConfig};
    use invsync_local::LocalStore;
    use invsync_model::{Activity, ActivityKey, Version};
    use invsync_remote::RemoteStore;
    use std::path::Path;

    fn case(dir: &Path) -> CaseConfig {
        CaseConfig {
            local: LocalConfig {
                snapshot: dir.join("local.json"),
            },
            foreground: ForegroundConfig {
                name: "foreground".into(),
                template: dir.join("template.yaml"),
            },
            remote: RemoteConfig {
                path: dir.join("remote.db"),
                schema: "em_lca".into(),
            },
            sync: PassConfig::default(),
        }
    }

    fn activity(version: u64) -> Activity {
        Activity::new(
            ActivityKey::new("foreground", "a1"),
            "Electricity production",
            "GLO",
            "production",
            "kWh",
            Version::new(version),
        )
    }

    #[test]
    fn pushes_the_snapshot_then_pulls_remote_edits_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = case(dir.path());

        let store = GraphStore::new();
        store.upsert_activity(activity(1)).unwrap();
        store.save(&config.local.snapshot).unwrap();

        run(&config, false, false).unwrap();

        let remote = SqliteStore::open(&config.remote.path, "em_lca").unwrap();
        assert_eq!(
            remote.activity_version("foreground", "a1").unwrap(),
            Some(Version::new(1))
        );

        remote.update_activity(&activity(2)).unwrap();
        drop(remote);

        run(&config, false, false).unwrap();
        let local = GraphStore::load(&config.local.snapshot).unwrap();
        assert_eq!(
            local
                .activity_version(&ActivityKey::new("foreground", "a1"))
                .unwrap(),
            Some(Version::new(2))
        );
    }

    #[test]
    fn push_only_leaves_the_snapshot_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = case(dir.path());

        let store = GraphStore::new();
        store.upsert_activity(activity(1)).unwrap();
        store.save(&config.local.snapshot).unwrap();
        let before = std::fs::metadata(&config.local.snapshot).unwrap().modified().unwrap();

        run(&config, true, false).unwrap();
        let after = std::fs::metadata(&config.local.snapshot).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn flags_override_the_configured_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = case(dir.path());
        config.sync = PassConfig { push: false, pull: false };

        assert_eq!(options_for(&config, false, false), SyncOptions::new(false, false));
        assert_eq!(options_for(&config, true, false), SyncOptions::push_only());
        assert_eq!(options_for(&config, false, true), SyncOptions::pull_only());
    }

    #[test]
    fn missing_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = case(dir.path());
        assert!(run(&config, false, false).is_err());
    }
}
