//! Push/pull synchronization engine.

use tracing::{debug, info};

use invsync_local::LocalStore;
use invsync_model::{Activity, ActivityKey};
use invsync_remote::RemoteStore;

use crate::error::{SyncError, SyncResult};
use crate::report::{SyncDirection, SyncReport};
use crate::resolver::{resolve, SyncAction};

/// Upper bound on the dependency chain the engine will follow from one
/// top-level activity.
///
/// Cycles are caught by the in-flight path well before this; the bound is a
/// backstop that turns a pathologically deep (or corrupt) reference chain
/// into a clean error instead of a stack overflow.
pub const MAX_RESOLVE_DEPTH: usize = 512;

/// Which passes a sync run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Run the push (local to remote) pass.
    pub push: bool,
    /// Run the pull (remote to local) pass.
    pub pull: bool,
}

impl SyncOptions {
    /// Selects passes explicitly.
    #[must_use]
    pub const fn new(push: bool, pull: bool) -> Self {
        Self { push, pull }
    }

    /// Push pass only.
    #[must_use]
    pub const fn push_only() -> Self {
        Self::new(true, false)
    }

    /// Pull pass only.
    #[must_use]
    pub const fn pull_only() -> Self {
        Self::new(false, true)
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// The set of keys currently being resolved on one recursive call path.
///
/// Entering a key already on the path is a dependency cycle; entering past
/// [`MAX_RESOLVE_DEPTH`] is a depth failure. Both are fatal.
#[derive(Debug, Default)]
struct ResolvePath {
    keys: Vec<ActivityKey>,
}

impl ResolvePath {
    fn enter(&mut self, key: &ActivityKey) -> SyncResult<()> {
        if self.keys.contains(key) {
            return Err(SyncError::cycle(key, &self.keys));
        }
        if self.keys.len() >= MAX_RESOLVE_DEPTH {
            return Err(SyncError::DepthExceeded {
                key: key.clone(),
                max: MAX_RESOLVE_DEPTH,
            });
        }
        self.keys.push(key.clone());
        Ok(())
    }

    fn leave(&mut self) {
        self.keys.pop();
    }
}

/// Synchronizes one logical database between a local graph store and a
/// remote relational store.
///
/// The engine is storage-agnostic: it only speaks the [`LocalStore`] and
/// [`RemoteStore`] operation sets. One run executes up to two independent
/// passes, push (local to remote) then pull (remote to local), each
/// visiting that database's activities sequentially and recursively
/// resolving every exchange input before the exchange itself is written.
///
/// Execution is single-threaded and blocking; a run either completes,
/// returning the [`SyncReport`], or stops at the first fatal error. Stale
/// versions never stop a run: they are collected as warnings and the
/// superseded side is left untouched.
pub struct SyncEngine<L, R> {
    local: L,
    remote: R,
    database: String,
}

impl<L: LocalStore, R: RemoteStore> SyncEngine<L, R> {
    /// Creates an engine for one logical `database`.
    pub fn new(local: L, remote: R, database: impl Into<String>) -> Self {
        Self {
            local,
            remote,
            database: database.into(),
        }
    }

    /// Returns the logical database this engine synchronizes.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Returns the local store.
    #[must_use]
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Returns the remote store.
    #[must_use]
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Consumes the engine, handing the stores back.
    #[must_use]
    pub fn into_parts(self) -> (L, R) {
        (self.local, self.remote)
    }

    /// Runs the selected passes and reports what they did.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal condition: a structural defect
    /// (self-reference, missing required attribute), a dependency cycle or
    /// over-deep chain, a missing entity on an unconditional read, or a
    /// store failure.
    pub fn sync(&self, options: SyncOptions) -> SyncResult<SyncReport> {
        let mut report = SyncReport::new();
        if options.push {
            self.push_pass(&mut report)?;
        }
        if options.pull {
            self.pull_pass(&mut report)?;
        }
        Ok(report)
    }

    fn push_pass(&self, report: &mut SyncReport) -> SyncResult<()> {
        info!(database = %self.database, "push pass started");
        for activity in self.local.activities_in(&self.database)? {
            let mut path = ResolvePath::default();
            self.push_activity(&activity.key, &mut path, report)?;
        }
        info!(
            database = %self.database,
            created = report.push.activities_created,
            updated = report.push.activities_updated,
            "push pass finished"
        );
        Ok(())
    }

    fn push_activity(
        &self,
        key: &ActivityKey,
        path: &mut ResolvePath,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        path.enter(key)?;
        let result = self.push_activity_guarded(key, path, report);
        path.leave();
        result
    }

    fn push_activity_guarded(
        &self,
        key: &ActivityKey,
        path: &mut ResolvePath,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let activity = self.local.get_activity(key)?;
        activity.validate()?;
        let exchanges = self.local.exchanges_of(key)?;
        // Structural checks come before any remote write, so a rejected
        // activity leaves both stores untouched.
        if exchanges.iter().any(|e| e.input == *key) {
            return Err(SyncError::self_referential(key));
        }

        if !self.remote.database_registered(&key.database)? {
            self.remote.register_database(&key.database)?;
        }

        let remote_version = self.remote.activity_version(&key.database, &key.code)?;
        let action = resolve(remote_version, activity.version);
        debug!(key = %key, ?action, "push activity");
        match action {
            SyncAction::Create => self.remote.insert_activity(&activity)?,
            SyncAction::Update => self.remote.update_activity(&activity)?,
            SyncAction::Noop => {}
            SyncAction::IncomingStale => {
                if let Some(existing) = remote_version {
                    report.stale_activity(SyncDirection::Push, key, activity.version, existing);
                }
            }
        }
        report.record_activity(SyncDirection::Push, action);

        for exchange in exchanges {
            let input = exchange.input.clone();
            let input_version = self.local.get_activity(&input)?.version;
            if !self
                .remote
                .activity_exists(&input.database, &input.code, input_version)?
            {
                self.push_activity(&input, path, report)?;
            }

            let remote_exchange = self.remote.exchange_version(&key.code, &input.code)?;
            let action = resolve(remote_exchange, exchange.version);
            debug!(owner = %key, input = %input, ?action, "push exchange");
            match action {
                SyncAction::Create => self.remote.insert_exchange(&key.code, &exchange)?,
                SyncAction::Update => self.remote.update_exchange(&key.code, &exchange)?,
                SyncAction::Noop => {}
                SyncAction::IncomingStale => {
                    if let Some(existing) = remote_exchange {
                        report.stale_exchange(
                            SyncDirection::Push,
                            key,
                            &input,
                            exchange.version,
                            existing,
                        );
                    }
                }
            }
            report.record_exchange(SyncDirection::Push, action);
        }
        Ok(())
    }

    fn pull_pass(&self, report: &mut SyncReport) -> SyncResult<()> {
        info!(database = %self.database, "pull pass started");
        for activity in self.remote.activities_in(&self.database)? {
            let mut path = ResolvePath::default();
            self.pull_activity(activity, &mut path, report)?;
        }
        info!(
            database = %self.database,
            created = report.pull.activities_created,
            updated = report.pull.activities_updated,
            "pull pass finished"
        );
        Ok(())
    }

    fn pull_activity(
        &self,
        activity: Activity,
        path: &mut ResolvePath,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let key = activity.key.clone();
        path.enter(&key)?;
        let result = self.pull_activity_guarded(activity, path, report);
        path.leave();
        result
    }

    fn pull_activity_guarded(
        &self,
        activity: Activity,
        path: &mut ResolvePath,
        report: &mut SyncReport,
    ) -> SyncResult<()> {
        let key = activity.key.clone();
        let incoming = activity.version;
        let exchanges = self.remote.exchanges_of(&key.database, &key.code)?;
        if exchanges.iter().any(|e| e.input == key) {
            return Err(SyncError::self_referential(&key));
        }

        let local_version = self.local.activity_version(&key)?;
        let action = resolve(local_version, incoming);
        debug!(key = %key, ?action, "pull activity");
        match action {
            SyncAction::Create | SyncAction::Update => {
                self.local.upsert_activity(activity)?;
            }
            SyncAction::Noop => {}
            SyncAction::IncomingStale => {
                if let Some(existing) = local_version {
                    report.stale_activity(SyncDirection::Pull, &key, incoming, existing);
                }
            }
        }
        report.record_activity(SyncDirection::Pull, action);

        for exchange in exchanges {
            let input = exchange.input.clone();
            if !self.local.activity_exists(&input)? {
                let input_activity = self.remote.get_activity(&input.database, &input.code)?;
                self.pull_activity(input_activity, path, report)?;
            }

            let incoming = exchange.version;
            match self.local.exchange_matching(&key, &exchange)? {
                None => {
                    debug!(owner = %key, input = %input, "pull exchange create");
                    self.local.upsert_exchange(&key, exchange)?;
                    report.record_exchange(SyncDirection::Pull, SyncAction::Create);
                }
                Some(existing) => {
                    let action = resolve(Some(existing.version), incoming);
                    debug!(owner = %key, input = %input, ?action, "pull exchange");
                    match action {
                        SyncAction::Update => {
                            self.local.upsert_exchange(&key, exchange)?;
                        }
                        SyncAction::Noop | SyncAction::Create => {}
                        SyncAction::IncomingStale => {
                            report.stale_exchange(
                                SyncDirection::Pull,
                                &key,
                                &input,
                                incoming,
                                existing.version,
                            );
                        }
                    }
                    report.record_exchange(SyncDirection::Pull, action);
                }
            }
        }
        Ok(())
    }
}
