use std::fmt;

use crate::diff::{Delta, Dimension, Snapshot};
use crate::model::MetricRecord;
use crate::view::truncate_middle;

/// Width floor applied to every column, whatever its content.
pub const MIN_COLUMN_WIDTH: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ColumnId {
    Namespace,
    Pod,
    Container,
    Cpu,
    Mem,
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnId::Namespace => write!(f, "NAMESPACE"),
            ColumnId::Pod => write!(f, "POD"),
            ColumnId::Container => write!(f, "CONTAINER"),
            ColumnId::Cpu => write!(f, "CPU"),
            ColumnId::Mem => write!(f, "MEM"),
        }
    }
}

impl ColumnId {
    /// Usage dimension shown by this column, if any.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            ColumnId::Cpu => Some(Dimension::Cpu),
            ColumnId::Mem => Some(Dimension::Mem),
            _ => None,
        }
    }
}

/// Stateless column descriptor: a label plus the accessor for its cell text.
#[derive(Clone, Copy)]
pub struct Column {
    pub id: ColumnId,
    pub label: &'static str,
    accessor: fn(&MetricRecord) -> &str,
}

impl Column {
    pub fn new(id: ColumnId, label: &'static str, accessor: fn(&MetricRecord) -> &str) -> Self {
        Self { id, label, accessor }
    }

    pub fn value<'a>(&self, record: &'a MetricRecord) -> &'a str {
        (self.accessor)(record)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("id", &self.id).field("label", &self.label).finish()
    }
}

/// The dashboard's fixed column set, left to right.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new(ColumnId::Namespace, "NAMESPACE", |r| r.namespace.as_str()),
        Column::new(ColumnId::Pod, "POD", |r| r.pod.as_str()),
        Column::new(ColumnId::Container, "CONTAINER", |r| r.container.as_str()),
        Column::new(ColumnId::Cpu, "CPU", |r| r.cpu_text.as_str()),
        Column::new(ColumnId::Mem, "MEM", |r| r.mem_text.as_str()),
    ]
}

/// Widths forced on columns when the natural layout overflows the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClampCaps {
    pub pod: usize,
    pub container: usize,
    pub usage: usize,
    pub min_width: usize,
}

impl Default for ClampCaps {
    fn default() -> Self {
        Self {
            pod: 25,
            container: 20,
            usage: 5,
            min_width: MIN_COLUMN_WIDTH,
        }
    }
}

impl ClampCaps {
    /// Cap for a column under overflow; `None` means never clamped.
    pub fn cap_for(&self, id: ColumnId) -> Option<usize> {
        match id {
            ColumnId::Namespace => None,
            ColumnId::Pod => Some(self.pod),
            ColumnId::Container => Some(self.container),
            ColumnId::Cpu | ColumnId::Mem => Some(self.usage),
        }
    }
}

/// Computed width of one column for a single render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnWidth {
    pub width: usize,
    pub clamp: Option<usize>,
}

impl ColumnWidth {
    /// Apply the forced truncation, if any, to a label or cell value.
    pub fn fit(&self, text: &str) -> String {
        fit_to(text, self.clamp)
    }
}

fn fit_to(text: &str, clamp: Option<usize>) -> String {
    match clamp {
        Some(clamp) => truncate_middle(text, clamp),
        None => text.to_string(),
    }
}

/// Length of a text truncated to `cap`: both halves plus the ellipsis.
pub fn truncated_len(cap: usize) -> usize {
    2 * (cap / 2) + 1
}

/// A cell as drawn: the value fitted to `clamp`, and on usage columns the
/// fitted baseline value plus direction marker in front of it.
pub fn cell_text(
    col: &Column,
    record: &MetricRecord,
    snapshot: &Snapshot,
    clamp: Option<usize>,
) -> (String, Delta) {
    let value = fit_to(col.value(record), clamp);
    let delta = col
        .id
        .dimension()
        .map_or(Delta::Unchanged, |dim| snapshot.diff(record, dim))
        .map_prior(|prior| fit_to(prior, clamp));
    (delta.decorate(&value), delta)
}

fn widest(
    visible: &[&MetricRecord],
    col: &Column,
    snapshot: &Snapshot,
    clamp: Option<usize>,
    floor: usize,
) -> usize {
    visible
        .iter()
        .map(|r| cell_text(col, r, snapshot, clamp).0.chars().count())
        .chain([fit_to(col.label, clamp).chars().count(), floor])
        .max()
        .unwrap_or(floor)
}

/// Natural width of each column over the visible set, before any clamping.
/// Usage cells are measured with their snapshot decoration.
pub fn natural_widths(
    visible: &[&MetricRecord],
    columns: &[Column],
    snapshot: &Snapshot,
    min_width: usize,
) -> Vec<usize> {
    columns
        .iter()
        .map(|col| widest(visible, col, snapshot, None, min_width))
        .collect()
}

/// Sum of column widths plus one separator per column.
pub fn total_width(widths: &[usize]) -> usize {
    widths.iter().map(|w| w + 1).sum()
}

/// Compute this pass's column widths. When the natural total overflows
/// `terminal_width`, clampable columns take their fixed caps in one step.
/// A clamped column is as wide as a truncated text, or as its widest
/// decorated cell, so neighbours never overwrite each other.
pub fn compute(
    visible: &[&MetricRecord],
    columns: &[Column],
    snapshot: &Snapshot,
    terminal_width: usize,
    caps: &ClampCaps,
) -> Vec<ColumnWidth> {
    let natural = natural_widths(visible, columns, snapshot, caps.min_width);
    let overflow = total_width(&natural) > terminal_width;

    columns
        .iter()
        .zip(natural)
        .map(|(col, width)| match caps.cap_for(col.id) {
            Some(cap) if overflow => ColumnWidth {
                width: widest(visible, col, snapshot, Some(cap), truncated_len(cap)),
                clamp: Some(cap),
            },
            _ => ColumnWidth { width, clamp: None },
        })
        .collect()
}

/// Left x-offset of each column given its width and a one-cell separator.
pub fn offsets(widths: &[ColumnWidth]) -> Vec<usize> {
    let mut x = 0;
    widths
        .iter()
        .map(|w| {
            let start = x;
            x += w.width + 1;
            start
        })
        .collect()
}
