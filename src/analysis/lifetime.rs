//! Lifetime tracking state machine.
//!
//! One [`VariableLifetime`] record is kept per distinct identifier. The
//! per-identifier state machine is:
//!
//! ```text
//! (absent) --allocate--> Alive
//! Alive    --allocate--> Alive   (reset, clears history)
//! Freed    --allocate--> Alive   (reset, clears history)
//! Alive    --free------> Freed   (records the release position)
//! Freed    --free------> Freed   (newer release position wins; not a finding)
//! Alive    --use-------> Alive   (no-op)
//! Freed    --use-------> Freed   (records/overwrites the use position)
//! ```
//!
//! Release and use events for identifiers with no record are absorbed
//! silently. Identifiers are the sole key: two variables with the same
//! name in different scopes are the same tracked entity, and no alias or
//! control-flow reasoning is attempted.

use std::collections::BTreeMap;

use crate::util::SourcePos;

/// Whether a tracked variable currently owns its storage.
///
/// "Unknown" has no variant: an identifier the tracker has never seen an
/// allocation for simply has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeState {
    /// Allocation observed, no release since.
    Alive,
    /// Most recent event of interest was a release.
    Freed,
}

/// Per-identifier lifetime record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLifetime {
    /// The variable's textual identifier.
    pub name: String,
    /// Current state.
    pub state: LifetimeState,
    /// Position of the most recent release, if any.
    pub freed_at: Option<SourcePos>,
    /// Position of the most recent use observed while freed, if any.
    pub used_after_free: Option<SourcePos>,
}

impl VariableLifetime {
    fn fresh(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: LifetimeState::Alive,
            freed_at: None,
            used_after_free: None,
        }
    }
}

/// Tracks allocation, release, and use events for one analysis run.
///
/// A tracker is created empty at the start of a run, driven synchronously
/// event by event, and read out once at the end. Analyzing several
/// translation units means one tracker per unit; nothing is shared.
#[derive(Debug, Default)]
pub struct LifetimeTracker {
    // BTreeMap so that violations() iterates name-lexicographically,
    // keeping report order reproducible.
    lifetimes: BTreeMap<String, VariableLifetime>,
}

impl LifetimeTracker {
    /// Create a tracker with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an allocation for `name`.
    ///
    /// Inserts or overwrites the record with a fresh `Alive` one. A
    /// reallocation deliberately discards any prior violation evidence
    /// for the name: re-declaration or reassignment masks earlier history.
    pub fn track_allocation(&mut self, name: &str, _pos: SourcePos) {
        self.lifetimes
            .insert(name.to_string(), VariableLifetime::fresh(name));
    }

    /// Record a release for `name`.
    ///
    /// Unconditional: releasing an already-freed record is accepted
    /// silently and only moves `freed_at` to the newer position. Repeated
    /// release is a known limitation of this engine, not a finding. No
    /// effect if the name has no record.
    pub fn track_free(&mut self, name: &str, pos: SourcePos) {
        if let Some(lifetime) = self.lifetimes.get_mut(name) {
            lifetime.state = LifetimeState::Freed;
            lifetime.freed_at = Some(pos);
        }
    }

    /// Record a use of `name`.
    ///
    /// Only a use observed while the record is `Freed` is retained, and a
    /// later qualifying use overwrites an earlier one, so the record ends
    /// up holding the last use-after-free site in traversal order. Uses
    /// while alive, and uses of unknown names, have no effect.
    pub fn track_use(&mut self, name: &str, pos: SourcePos) {
        if let Some(lifetime) = self.lifetimes.get_mut(name) {
            if lifetime.state == LifetimeState::Freed {
                lifetime.used_after_free = Some(pos);
            }
        }
    }

    /// True iff a record exists for `name` and it is currently freed.
    pub fn is_freed(&self, name: &str) -> bool {
        self.lifetimes
            .get(name)
            .is_some_and(|lt| lt.state == LifetimeState::Freed)
    }

    /// True iff a record exists for `name` with a use-after-free site.
    pub fn has_use_after_free(&self, name: &str) -> bool {
        self.lifetimes
            .get(name)
            .is_some_and(|lt| lt.used_after_free.is_some())
    }

    /// Read-only lookup of the record for `name`.
    pub fn lifetime(&self, name: &str) -> Option<&VariableLifetime> {
        self.lifetimes.get(name)
    }

    /// All records with a recorded use-after-free site.
    ///
    /// Ordering is name-lexicographic and therefore identical across
    /// repeated calls and repeated runs over the same event sequence.
    pub fn violations(&self) -> Vec<(&str, &VariableLifetime)> {
        self.lifetimes
            .iter()
            .filter(|(_, lt)| lt.used_after_free.is_some())
            .map(|(name, lt)| (name.as_str(), lt))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(offset: usize) -> SourcePos {
        SourcePos(offset)
    }

    #[test]
    fn test_unknown_name_has_no_record() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_free("ghost", pos(10));
        tracker.track_use("ghost", pos(20));

        assert!(!tracker.is_freed("ghost"));
        assert!(!tracker.has_use_after_free("ghost"));
        assert!(tracker.lifetime("ghost").is_none());
        assert!(tracker.violations().is_empty());
    }

    #[test]
    fn test_use_while_alive_is_safe() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("x", pos(0));
        tracker.track_use("x", pos(10));
        tracker.track_free("x", pos(20));

        assert!(tracker.is_freed("x"));
        assert!(!tracker.has_use_after_free("x"));
        assert!(tracker.violations().is_empty());
    }

    #[test]
    fn test_basic_use_after_free() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("p", pos(0));
        tracker.track_free("p", pos(10));
        tracker.track_use("p", pos(20));

        assert!(tracker.has_use_after_free("p"));
        let violations = tracker.violations();
        assert_eq!(violations.len(), 1);
        let (name, lifetime) = violations[0];
        assert_eq!(name, "p");
        assert_eq!(lifetime.freed_at, Some(pos(10)));
        assert_eq!(lifetime.used_after_free, Some(pos(20)));
    }

    #[test]
    fn test_double_free_alone_is_not_a_violation() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("p", pos(0));
        tracker.track_free("p", pos(10));
        tracker.track_free("p", pos(20));

        assert!(tracker.is_freed("p"));
        assert!(tracker.violations().is_empty());
        // The newer release position wins.
        assert_eq!(tracker.lifetime("p").map(|lt| lt.freed_at), Some(Some(pos(20))));
    }

    #[test]
    fn test_reallocation_resets_history() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("p", pos(0));
        tracker.track_free("p", pos(10));
        tracker.track_use("p", pos(20));
        assert!(tracker.has_use_after_free("p"));

        tracker.track_allocation("p", pos(30));
        tracker.track_use("p", pos(40));

        assert!(!tracker.is_freed("p"));
        assert!(!tracker.has_use_after_free("p"));
        assert!(tracker.violations().is_empty());
    }

    #[test]
    fn test_last_use_wins() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("p", pos(0));
        tracker.track_free("p", pos(10));
        tracker.track_use("p", pos(20));
        tracker.track_use("p", pos(30));

        let lifetime = tracker.lifetime("p").unwrap();
        assert_eq!(lifetime.used_after_free, Some(pos(30)));
    }

    #[test]
    fn test_violations_query_is_idempotent() {
        let mut tracker = LifetimeTracker::new();
        tracker.track_allocation("a", pos(0));
        tracker.track_free("a", pos(10));
        tracker.track_use("a", pos(20));

        let first: Vec<_> = tracker
            .violations()
            .into_iter()
            .map(|(n, lt)| (n.to_string(), lt.clone()))
            .collect();
        let second: Vec<_> = tracker
            .violations()
            .into_iter()
            .map(|(n, lt)| (n.to_string(), lt.clone()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_violations_ordered_by_name() {
        let mut tracker = LifetimeTracker::new();
        for name in ["zeta", "alpha", "mid"] {
            tracker.track_allocation(name, pos(0));
            tracker.track_free(name, pos(10));
            tracker.track_use(name, pos(20));
        }

        let names: Vec<_> = tracker.violations().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
