//! Filtering and ordering of a metrics batch into the visible set.

use std::cmp::Ordering;

use crate::model::{MetricRecord, SortOrder};

/// True when `filter` is empty or occurs in the namespace, pod or container name.
pub fn matches_filter(record: &MetricRecord, filter: &str) -> bool {
    filter.is_empty()
        || record.namespace.contains(filter)
        || record.pod.contains(filter)
        || record.container.contains(filter)
}

/// Filter then sort `records`. Pure: the same inputs always give the same
/// sequence, whatever order the batch arrived in.
pub fn apply<'a>(records: &'a [MetricRecord], filter: &str, order: SortOrder) -> Vec<&'a MetricRecord> {
    let mut visible: Vec<&MetricRecord> = records
        .iter()
        .filter(|r| matches_filter(r, filter))
        .collect();

    visible.sort_by(|a, b| compare(a, b, order));
    visible
}

fn compare(a: &MetricRecord, b: &MetricRecord, order: SortOrder) -> Ordering {
    let primary = match order {
        SortOrder::Unset => Ordering::Equal,
        SortOrder::CpuDesc => b.cpu_usage.cmp(&a.cpu_usage),
        SortOrder::CpuAsc => a.cpu_usage.cmp(&b.cpu_usage),
        SortOrder::MemDesc => b.mem_usage.cmp(&a.mem_usage),
        SortOrder::MemAsc => a.mem_usage.cmp(&b.mem_usage),
    };
    primary
        .then_with(|| a.pod.cmp(&b.pod))
        .then_with(|| a.container.cmp(&b.container))
        .then_with(|| a.namespace.cmp(&b.namespace))
}
