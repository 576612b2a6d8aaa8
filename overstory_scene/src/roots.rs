// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordering and change signalling for parentless nodes.

/// Monotonic ordering counter for roots plus a single "root set changed"
/// signal.
///
/// The signal has single-consumer semantics: one reader owns the cached,
/// ordered root list and clears the flag when it refreshes. Independent
/// consumers each need their own copy of the flag; this registry
/// intentionally trades that generality for one boolean at root-set
/// granularity.
#[derive(Clone, Debug, Default)]
pub(crate) struct RootRegistry {
    next_order: u64,
    changed: bool,
}

impl RootRegistry {
    /// Hand out the next root order and flag the root set as changed.
    pub(crate) fn assign_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        self.changed = true;
        order
    }

    /// Flag the root set as changed without assigning an order (a root left
    /// the set).
    pub(crate) fn signal_changed(&mut self) {
        self.changed = true;
    }

    /// Read and clear the changed signal.
    pub(crate) fn consume_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_are_monotonic() {
        let mut reg = RootRegistry::default();
        let a = reg.assign_order();
        let b = reg.assign_order();
        let c = reg.assign_order();
        assert!(a < b && b < c);
    }

    #[test]
    fn consume_reads_then_clears() {
        let mut reg = RootRegistry::default();
        assert!(!reg.consume_changed());
        reg.signal_changed();
        assert!(reg.consume_changed());
        assert!(!reg.consume_changed());
        let _ = reg.assign_order();
        assert!(reg.consume_changed(), "assigning an order changes the set");
    }
}
