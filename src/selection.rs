//! Row selection tracked by record identity.

use crate::model::MetricRecord;

/// First terminal row that holds a record; rows above are filter and headers.
pub const FIRST_DATA_ROW: u16 = 2;

/// The selected identity key, plus the row it last occupied. The key is
/// authoritative; the index only seeds the next `move_by`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    key: Option<String>,
    last_index: Option<usize>,
}

impl Selection {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn is_selected(&self, record: &MetricRecord) -> bool {
        self.key.as_deref() == Some(record.identity_key().as_str())
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.last_index = None;
    }

    /// Select the record on terminal row `y`. `visible` must hold only the
    /// rows actually drawn; clicks outside them change nothing.
    pub fn select_at_row(&mut self, _x: u16, y: u16, visible: &[&MetricRecord]) -> bool {
        let Some(index) = y.checked_sub(FIRST_DATA_ROW).map(usize::from) else {
            return false;
        };
        match visible.get(index) {
            Some(record) => {
                self.key = Some(record.identity_key());
                self.last_index = Some(index);
                true
            }
            None => false,
        }
    }

    /// Move the cursor by `offset` rows, clamped to the visible set.
    /// An empty set leaves the selection untouched.
    pub fn move_by(&mut self, offset: isize, visible: &[&MetricRecord]) -> bool {
        if visible.is_empty() {
            return false;
        }
        let last = visible.len() - 1;
        let current = self.last_index.map(|i| i as isize).unwrap_or(-1);
        let index = current.saturating_add(offset).clamp(0, last as isize) as usize;

        self.key = Some(visible[index].identity_key());
        self.last_index = Some(index);
        true
    }

    /// Locate the selected record in `visible`, refreshing the remembered
    /// index. A stale key (filtered out or gone) resolves to `None` but is kept.
    pub fn sync<'a>(&mut self, visible: &[&'a MetricRecord]) -> Option<&'a MetricRecord> {
        let key = self.key.as_deref()?;
        let (index, record) = visible
            .iter()
            .enumerate()
            .find(|(_, r)| r.identity_key() == key)?;
        self.last_index = Some(index);
        Some(*record)
    }
}
