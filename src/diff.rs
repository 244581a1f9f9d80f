//! Snapshot baseline and per-cell usage deltas.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{MetricRecord, Quantity};

/// Usage dimension a delta is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Cpu,
    Mem,
}

impl Dimension {
    fn quantity(self, record: &MetricRecord) -> Quantity {
        match self {
            Dimension::Cpu => record.cpu_usage,
            Dimension::Mem => record.mem_usage,
        }
    }

    fn text(self, record: &MetricRecord) -> &str {
        match self {
            Dimension::Cpu => &record.cpu_text,
            Dimension::Mem => &record.mem_text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    Unchanged,
    Increased { prior: String },
    Decreased { prior: String },
}

impl Delta {
    /// Cell text with the baseline value and direction marker in front.
    pub fn decorate(&self, current: &str) -> String {
        match self {
            Delta::Unchanged => current.to_string(),
            Delta::Increased { prior } => format!("{}^{}", prior, current),
            Delta::Decreased { prior } => format!("{}v{}", prior, current),
        }
    }

    /// Rewrite the baseline text, e.g. to truncate it like the current value.
    pub fn map_prior(self, f: impl FnOnce(&str) -> String) -> Delta {
        match self {
            Delta::Unchanged => Delta::Unchanged,
            Delta::Increased { prior } => Delta::Increased { prior: f(&prior) },
            Delta::Decreased { prior } => Delta::Decreased { prior: f(&prior) },
        }
    }
}

/// At most one frozen copy of the record set, keyed by identity.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    baseline: HashMap<String, MetricRecord>,
    active: bool,
}

impl Snapshot {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    /// Take a fresh baseline from `records`, replacing any previous one.
    pub fn capture(&mut self, records: &[MetricRecord]) {
        self.baseline = records
            .iter()
            .map(|r| (r.identity_key(), r.clone()))
            .collect();
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.baseline.clear();
        self.active = false;
    }

    /// Flip between no baseline and a baseline of `records`.
    /// Returns whether a snapshot is active afterwards.
    pub fn toggle(&mut self, records: &[MetricRecord]) -> bool {
        if self.active {
            self.clear();
        } else {
            self.capture(records);
        }
        self.active
    }

    pub fn get(&self, key: &str) -> Option<&MetricRecord> {
        self.baseline.get(key)
    }

    /// Delta of `record` against the baseline along one dimension.
    pub fn diff(&self, record: &MetricRecord, dimension: Dimension) -> Delta {
        if !self.active {
            return Delta::Unchanged;
        }
        let Some(prior) = self.baseline.get(&record.identity_key()) else {
            return Delta::Unchanged;
        };
        diff(record, prior, dimension)
    }
}

/// Compare `current` with `prior` by quantity; the formatted text is only
/// carried along for display.
pub fn diff(current: &MetricRecord, prior: &MetricRecord, dimension: Dimension) -> Delta {
    match dimension.quantity(current).cmp(&dimension.quantity(prior)) {
        Ordering::Equal => Delta::Unchanged,
        Ordering::Greater => Delta::Increased { prior: dimension.text(prior).to_string() },
        Ordering::Less => Delta::Decreased { prior: dimension.text(prior).to_string() },
    }
}
