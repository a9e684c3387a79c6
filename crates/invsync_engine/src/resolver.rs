//! Conflict resolution policy.

use invsync_model::Version;

/// What to do with an incoming entity copy, given the receiving side's
/// version of the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The receiving side has no copy: insert the incoming one.
    Create,
    /// The receiving copy is older: replace it with the incoming one.
    Update,
    /// Both copies are at the same version: do nothing.
    Noop,
    /// The incoming copy is older than the receiving one: leave the
    /// receiving side untouched and emit a superseded warning.
    IncomingStale,
}

/// Decides how an incoming entity copy reconciles against the receiving
/// side.
///
/// `receiving` is the version already present on the side being written to
/// (`None` when that side has no copy); `incoming` is the version arriving
/// from the other side. The rule is last-writer-wins by version number and
/// is applied identically in both sync directions and for both activities
/// and exchanges.
#[must_use]
pub fn resolve(receiving: Option<Version>, incoming: Version) -> SyncAction {
    match receiving {
        None => SyncAction::Create,
        Some(existing) if existing < incoming => SyncAction::Update,
        Some(existing) if existing > incoming => SyncAction::IncomingStale,
        Some(_) => SyncAction::Noop,
    }
}
