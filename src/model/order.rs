use std::fmt;

/// Active row ordering. `Unset` sorts by pod, then container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Unset,
    CpuDesc,
    CpuAsc,
    MemDesc,
    MemAsc,
}

impl SortOrder {
    /// Keyboard shortcut mapping: `1`..`4`.
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(SortOrder::CpuDesc),
            '2' => Some(SortOrder::CpuAsc),
            '3' => Some(SortOrder::MemDesc),
            '4' => Some(SortOrder::MemAsc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Unset => write!(f, "pod/container"),
            SortOrder::CpuDesc => write!(f, "CPU descending"),
            SortOrder::CpuAsc => write!(f, "CPU ascending"),
            SortOrder::MemDesc => write!(f, "memory descending"),
            SortOrder::MemAsc => write!(f, "memory ascending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_map_to_orders() {
        assert_eq!(SortOrder::from_key('1'), Some(SortOrder::CpuDesc));
        assert_eq!(SortOrder::from_key('2'), Some(SortOrder::CpuAsc));
        assert_eq!(SortOrder::from_key('3'), Some(SortOrder::MemDesc));
        assert_eq!(SortOrder::from_key('4'), Some(SortOrder::MemAsc));
        assert_eq!(SortOrder::from_key('5'), None);
        assert_eq!(SortOrder::default(), SortOrder::Unset);
    }
}
