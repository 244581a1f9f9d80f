use chrono::{DateTime, Local};

use crate::diff::Snapshot;
use crate::model::{MetricRecord, SortOrder};
use crate::selection::Selection;
use crate::sort;
use crate::view::Presenter;

/// Everything the user has done to the view, plus the current batch.
#[derive(Debug, Default)]
pub struct Session {
    pub records: Vec<MetricRecord>,
    pub filter: String,
    pub order: SortOrder,
    pub selection: Selection,
    pub snapshot: Snapshot,
    pub last_updated: Option<DateTime<Local>>,
}

/// Characters accepted by the filter: lowercase letters plus `-` and `_`.
pub fn is_filter_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '-' || c == '_'
}

impl Session {
    pub fn new(records: Vec<MetricRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Swap in a fresh batch. Filter, order, selection and snapshot survive.
    pub fn replace_batch(&mut self, records: Vec<MetricRecord>, at: DateTime<Local>) {
        self.records = records;
        self.last_updated = Some(at);
    }

    pub fn push_filter_char(&mut self, c: char) -> bool {
        if !is_filter_char(c) {
            return false;
        }
        self.filter.push(c);
        true
    }

    /// Drop the last filter character. Empty filter is a no-op.
    pub fn pop_filter_char(&mut self) -> bool {
        self.filter.pop().is_some()
    }

    pub fn set_order(&mut self, order: SortOrder) -> bool {
        if self.order == order {
            return false;
        }
        self.order = order;
        true
    }

    /// Capture a snapshot of the current batch, or drop the active one.
    pub fn toggle_snapshot(&mut self) -> bool {
        self.snapshot.toggle(&self.records)
    }

    pub fn move_selection(&mut self, offset: isize) -> bool {
        let visible = sort::apply(&self.records, &self.filter, self.order);
        self.selection.sync(&visible);
        self.selection.move_by(offset, &visible)
    }

    /// Select the record drawn on row `y` of a `height`-row screen.
    pub fn select_at(&mut self, x: u16, y: u16, height: u16) -> bool {
        let visible = sort::apply(&self.records, &self.filter, self.order);
        let info_shown = self.selection.sync(&visible).is_some();
        let drawn = Presenter::data_rows(height, info_shown).min(visible.len());
        self.selection.select_at_row(x, y, &visible[..drawn])
    }

    pub fn clear_selection(&mut self) -> bool {
        let had = self.selection.key().is_some();
        self.selection.clear();
        had
    }
}
