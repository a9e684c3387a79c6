//! Per-run sync reporting.

use std::fmt;

use tracing::warn;

use invsync_model::{ActivityKey, Version};

use crate::resolver::SyncAction;

/// Direction of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Local to remote.
    Push,
    /// Remote to local.
    Pull,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => f.write_str("push"),
            Self::Pull => f.write_str("pull"),
        }
    }
}

/// The entity a stale warning refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleEntity {
    /// A whole activity copy was superseded.
    Activity {
        /// Key of the activity.
        key: ActivityKey,
    },
    /// One exchange row was superseded.
    Exchange {
        /// Key of the owning activity.
        owner: ActivityKey,
        /// Input key of the exchange.
        input: ActivityKey,
    },
}

impl fmt::Display for StaleEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activity { key } => write!(f, "activity {key}"),
            Self::Exchange { owner, input } => write!(f, "exchange {owner} -> {input}"),
        }
    }
}

/// A superseded-version event: the incoming copy was older than the
/// receiving side's copy, so nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleWarning {
    /// Pass the warning occurred in.
    pub direction: SyncDirection,
    /// Entity whose incoming copy was stale.
    pub entity: StaleEntity,
    /// Version of the incoming, rejected copy.
    pub incoming: Version,
    /// Version already present on the receiving side.
    pub existing: Version,
}

impl fmt::Display for StaleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} is superseded by existing {}",
            self.direction, self.entity, self.incoming, self.existing
        )
    }
}

/// Counters for one pass, per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Activities inserted on the receiving side.
    pub activities_created: u64,
    /// Activities replaced on the receiving side.
    pub activities_updated: u64,
    /// Activities already up to date.
    pub activities_unchanged: u64,
    /// Exchanges inserted on the receiving side.
    pub exchanges_created: u64,
    /// Exchanges replaced on the receiving side.
    pub exchanges_updated: u64,
    /// Exchanges already up to date.
    pub exchanges_unchanged: u64,
}

impl PassStats {
    /// Returns true when the pass wrote nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.activities_created == 0
            && self.activities_updated == 0
            && self.exchanges_created == 0
            && self.exchanges_updated == 0
    }

    fn record_activity(&mut self, action: SyncAction) {
        match action {
            SyncAction::Create => self.activities_created += 1,
            SyncAction::Update => self.activities_updated += 1,
            SyncAction::Noop => self.activities_unchanged += 1,
            SyncAction::IncomingStale => {}
        }
    }

    fn record_exchange(&mut self, action: SyncAction) {
        match action {
            SyncAction::Create => self.exchanges_created += 1,
            SyncAction::Update => self.exchanges_updated += 1,
            SyncAction::Noop => self.exchanges_unchanged += 1,
            SyncAction::IncomingStale => {}
        }
    }
}

/// Everything one sync run did: per-pass counters plus every stale warning,
/// in the order they were raised.
///
/// The report is created by [`crate::SyncEngine::sync`] and has exactly that
/// run's lifetime; warnings are both collected here and emitted through
/// `tracing` so tests can assert on them and operators can see them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Counters for the push pass.
    pub push: PassStats,
    /// Counters for the pull pass.
    pub pull: PassStats,
    /// Superseded-version events from both passes.
    pub warnings: Vec<StaleWarning>,
}

impl SyncReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the run wrote nothing and warned about nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.push.is_noop() && self.pull.is_noop() && self.warnings.is_empty()
    }

    pub(crate) fn record_activity(&mut self, direction: SyncDirection, action: SyncAction) {
        self.stats_mut(direction).record_activity(action);
    }

    pub(crate) fn record_exchange(&mut self, direction: SyncDirection, action: SyncAction) {
        self.stats_mut(direction).record_exchange(action);
    }

    pub(crate) fn stale_activity(
        &mut self,
        direction: SyncDirection,
        key: &ActivityKey,
        incoming: Version,
        existing: Version,
    ) {
        self.stale(StaleWarning {
            direction,
            entity: StaleEntity::Activity { key: key.clone() },
            incoming,
            existing,
        });
    }

    pub(crate) fn stale_exchange(
        &mut self,
        direction: SyncDirection,
        owner: &ActivityKey,
        input: &ActivityKey,
        incoming: Version,
        existing: Version,
    ) {
        self.stale(StaleWarning {
            direction,
            entity: StaleEntity::Exchange {
                owner: owner.clone(),
                input: input.clone(),
            },
            incoming,
            existing,
        });
    }

    fn stale(&mut self, warning: StaleWarning) {
        warn!(%warning, "superseded version");
        self.warnings.push(warning);
    }

    fn stats_mut(&mut self, direction: SyncDirection) -> &mut PassStats {
        match direction {
            SyncDirection::Push => &mut self.push,
            SyncDirection::Pull => &mut self.pull,
        }
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "push: {} created / {} updated / {} unchanged activities, \
             {} created / {} updated / {} unchanged exchanges",
            self.push.activities_created,
            self.push.activities_updated,
            self.push.activities_unchanged,
            self.push.exchanges_created,
            self.push.exchanges_updated,
            self.push.exchanges_unchanged,
        )?;
        writeln!(
            f,
            "pull: {} created / {} updated / {} unchanged activities, \
             {} created / {} updated / {} unchanged exchanges",
            self.pull.activities_created,
            self.pull.activities_updated,
            self.pull.activities_unchanged,
            self.pull.exchanges_created,
            self.pull.exchanges_updated,
            self.pull.exchanges_unchanged,
        )?;
        write!(f, "warnings: {}", self.warnings.len())?;
        for warning in &self.warnings {
            write!(f, "\n  {warning}")?;
        }
        Ok(())
    }
}
