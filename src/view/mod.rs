mod screen;
mod shared;
mod style;

use std::io;

use crate::diff::{Delta, Snapshot};
use crate::layout::{self, Column, ColumnWidth};
use crate::model::MetricRecord;
use crate::selection::FIRST_DATA_ROW;

pub use screen::{Cell, CellBuffer, Screen, TerminalScreen};
pub use shared::{right_align, truncate_middle};
pub use style::{Colors, Style};

/// Blank columns kept to the left of everything drawn.
pub const LEFT_PADDING: u16 = 2;

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 20;
pub const MIN_ROWS: u16 = 5;

pub const LEGEND: &str =
    "Sort by (1) CPU Dec / (2) CPU Asc / (3) Mem Dec / (4) Mem Asc | (SPACE) Snapshot | (ESC) Quit";
pub const SNAPSHOT_SUFFIX: &str = " -- Snapshot taken!";

/// A run of text at a grid position, before padding is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub style: Style,
}

impl Span {
    fn new(x: usize, y: u16, text: impl Into<String>, style: Style) -> Self {
        Self {
            x: u16::try_from(x).unwrap_or(u16::MAX),
            y,
            text: text.into(),
            style,
        }
    }
}

/// Everything one render pass produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub spans: Vec<Span>,
}

impl Frame {
    /// Replace the screen contents with this frame and flush it.
    pub fn draw(&self, screen: &mut impl Screen) -> io::Result<()> {
        screen.clear();
        for span in &self.spans {
            let mut x = span.x.saturating_add(LEFT_PADDING);
            for ch in span.text.chars() {
                screen.set_cell(x, span.y, ch, span.style);
                x = x.saturating_add(1);
            }
        }
        screen.flush()
    }
}

/// Inputs of a render pass. Records are already filtered and sorted.
pub struct FrameInput<'a> {
    pub records: &'a [&'a MetricRecord],
    pub columns: &'a [Column],
    pub widths: &'a [ColumnWidth],
    pub selected: Option<&'a str>,
    pub snapshot: &'a Snapshot,
    pub filter: &'a str,
    pub status: Option<&'a str>,
}

pub struct Presenter;

impl Presenter {
    pub fn is_too_small(width: u16, height: u16) -> bool {
        width < MIN_COLS || height < MIN_ROWS
    }

    /// Row of the requests/limits info line.
    pub fn info_row(height: u16) -> u16 {
        height.saturating_sub(3)
    }

    /// Row of the key-binding legend.
    pub fn legend_row(height: u16) -> u16 {
        height.saturating_sub(2)
    }

    /// How many record rows fit above the footer.
    pub fn data_rows(height: u16, info_shown: bool) -> usize {
        let footer_top = if info_shown {
            Self::info_row(height)
        } else {
            Self::legend_row(height)
        };
        footer_top.saturating_sub(FIRST_DATA_ROW) as usize
    }

    /// Build the full frame. Pure: the same input always yields the same frame.
    pub fn render(input: &FrameInput<'_>, width: u16, height: u16) -> Frame {
        if Self::is_too_small(width, height) {
            return Self::render_too_small(width, height);
        }

        let mut spans = Vec::new();

        let filter_line = format!("filter: {}", input.filter);
        let filter_len = filter_line.chars().count();
        spans.push(Span::new(0, 0, filter_line, Style::Header));
        if let Some(status) = input.status {
            let x = right_align(status, width.saturating_sub(LEFT_PADDING + 1)) as usize;
            if x > filter_len {
                spans.push(Span::new(x, 0, status, Style::Heading));
            }
        }

        let offsets = layout::offsets(input.widths);
        for ((col, w), &x) in input.columns.iter().zip(input.widths).zip(&offsets) {
            spans.push(Span::new(x, 1, w.fit(col.label), Style::Heading));
        }

        let selected = input
            .selected
            .and_then(|key| input.records.iter().find(|r| r.identity_key() == key).copied());
        let capacity = Self::data_rows(height, selected.is_some());

        for (i, record) in input.records.iter().take(capacity).enumerate() {
            let y = FIRST_DATA_ROW + i as u16;
            let is_selected = selected.is_some_and(|s| s.identity_key() == record.identity_key());

            for ((col, w), &x) in input.columns.iter().zip(input.widths).zip(&offsets) {
                let (text, style) = Self::render_cell(record, col, w, input.snapshot);
                let style = if is_selected { Style::Highlighted } else { style };
                spans.push(Span::new(x, y, text, style));
            }
        }

        if let Some(record) = selected {
            spans.push(Span::new(0, Self::info_row(height), record.info_line(), Style::Footer));
        }

        let mut legend = LEGEND.to_string();
        if input.snapshot.is_active() {
            legend.push_str(SNAPSHOT_SUFFIX);
        }
        spans.push(Span::new(0, Self::legend_row(height), legend, Style::Footer));

        Frame { spans }
    }

    fn render_cell(
        record: &MetricRecord,
        col: &Column,
        width: &ColumnWidth,
        snapshot: &Snapshot,
    ) -> (String, Style) {
        let (text, delta) = layout::cell_text(col, record, snapshot, width.clamp);
        let style = match delta {
            Delta::Unchanged => Style::Normal,
            Delta::Increased { .. } => Style::Increase,
            Delta::Decreased { .. } => Style::Decrease,
        };
        (text, style)
    }

    fn render_too_small(width: u16, height: u16) -> Frame {
        let msg = format!(
            "Terminal too small ({}x{}). Resize to at least {}x{}.",
            width, height, MIN_COLS, MIN_ROWS
        );
        let len = msg.chars().count() as u16;
        let x = (width.saturating_sub(len) / 2).saturating_sub(LEFT_PADDING);
        Frame {
            spans: vec![Span::new(x as usize, height / 2, msg, Style::Warning)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ClampCaps, default_columns};
    use crate::model::Quantity;
    use crate::sort;
    use crate::model::SortOrder;

    fn rec(pod: &str, cpu: &str, mem: &str) -> MetricRecord {
        MetricRecord::new("default", pod, "app", cpu.parse().unwrap(), mem.parse().unwrap())
    }

    fn frame_for(
        records: &[MetricRecord],
        selected: Option<&str>,
        snapshot: &Snapshot,
        width: u16,
        height: u16,
    ) -> CellBuffer {
        frame_with_caps(records, selected, snapshot, &ClampCaps::default(), width, height)
    }

    fn frame_with_caps(
        records: &[MetricRecord],
        selected: Option<&str>,
        snapshot: &Snapshot,
        caps: &ClampCaps,
        width: u16,
        height: u16,
    ) -> CellBuffer {
        let visible = sort::apply(records, "", SortOrder::Unset);
        let columns = default_columns();
        let widths = layout::compute(&visible, &columns, snapshot, width as usize, caps);
        let input = FrameInput {
            records: &visible,
            columns: &columns,
            widths: &widths,
            selected,
            snapshot,
            filter: "",
            status: None,
        };
        let mut buf = CellBuffer::new(width, height);
        Presenter::render(&input, width, height).draw(&mut buf).unwrap();
        buf
    }

    #[test]
    fn layout_rows_top_to_bottom() {
        let records = vec![rec("web", "100m", "64Mi"), rec("db", "500m", "32Mi")];
        let buf = frame_for(&records, None, &Snapshot::default(), 120, 10);

        assert_eq!(buf.row_text(0), "  filter:");
        assert!(buf.row_text(1).starts_with("  NAMESPACE  POD        CONTAINER  CPU        MEM"));
        assert!(buf.row_text(2).starts_with("  default    db         app        500m       32Mi"));
        assert!(buf.row_text(3).starts_with("  default    web"));
        assert_eq!(buf.row_text(7), "");
        assert!(buf.row_text(8).starts_with("  Sort by (1) CPU Dec"));
        assert_eq!(buf.row_text(9), "");
    }

    #[test]
    fn selected_row_is_highlighted_with_info_line() {
        let mut records = vec![rec("web", "100m", "64Mi")];
        let mut requests = crate::model::ResourceList::new();
        requests.insert("cpu".into(), "50m".parse().unwrap());
        records[0] = records[0].clone().with_resources(requests, Default::default());

        let buf = frame_for(&records, Some("default/web/app"), &Snapshot::default(), 120, 10);
        assert_eq!(buf.cell(2, 2).unwrap().style, Style::Highlighted);
        assert_eq!(buf.row_text(7), "  requests: cpu=50m mem=0Mi -- limits: cpu=0 mem=0Mi");
    }

    #[test]
    fn stale_selection_renders_nothing_highlighted() {
        let records = vec![rec("web", "100m", "64Mi")];
        let buf = frame_for(&records, Some("default/gone/app"), &Snapshot::default(), 120, 10);
        assert!(buf.rows().flatten().all(|c| c.style != Style::Highlighted));
        assert_eq!(buf.row_text(7), "");
    }

    #[test]
    fn rows_stop_above_footer() {
        let records: Vec<MetricRecord> = (0..20).map(|i| rec(&format!("pod-{:02}", i), "1m", "1Mi")).collect();
        let buf = frame_for(&records, None, &Snapshot::default(), 120, 10);
        // rows 2..=7 hold data, 8 is the legend
        assert!(buf.row_text(7).contains("pod-05"));
        assert!(buf.row_text(8).contains("Sort by"));
        assert_eq!(Presenter::data_rows(10, false), 6);

        let buf = frame_for(&records, Some("default/pod-00/app"), &Snapshot::default(), 120, 10);
        assert!(buf.row_text(6).contains("pod-04"));
        assert!(buf.row_text(7).contains("requests:"));
        assert_eq!(Presenter::data_rows(10, true), 5);
    }

    #[test]
    fn snapshot_diff_decorates_and_styles_usage_cells() {
        let before = vec![rec("web", "100m", "64Mi")];
        let mut snapshot = Snapshot::default();
        snapshot.capture(&before);

        let after = vec![rec("web", "150m", "32Mi")];
        let buf = frame_for(&after, None, &snapshot, 120, 10);
        let row = buf.row_text(2);
        assert!(row.contains("100m^150m"));
        assert!(row.contains("64Miv32Mi"));
        assert!(buf.row_text(8).ends_with(SNAPSHOT_SUFFIX));

        let cpu_x = LEFT_PADDING + 33;
        assert_eq!(buf.cell(cpu_x, 2).unwrap().style, Style::Increase);
        assert_eq!(buf.cell(cpu_x + 11, 2).unwrap().style, Style::Decrease);
        assert_eq!(buf.cell(LEFT_PADDING, 2).unwrap().style, Style::Normal);
    }

    #[test]
    fn selection_overrides_diff_style() {
        let mut snapshot = Snapshot::default();
        snapshot.capture(&[rec("web", "100m", "64Mi")]);
        let buf = frame_for(&[rec("web", "150m", "64Mi")], Some("default/web/app"), &snapshot, 120, 10);
        assert_eq!(buf.cell(LEFT_PADDING + 33, 2).unwrap().style, Style::Highlighted);
    }

    #[test]
    fn narrow_terminal_truncates_labels_and_cells() {
        let records = vec![MetricRecord::new(
            "default",
            "frontend-deployment-7c9f8d6b5-x2x9z",
            "app",
            Quantity::from_millis(12345),
            Quantity::from_mebibytes(123456),
        )];
        let buf = frame_for(&records, None, &Snapshot::default(), 75, 10);
        let header = buf.row_text(1);
        assert!(header.contains("CONTAINER"));
        let row = buf.row_text(2);
        assert!(row.contains("frontend-dep…f8d6b5-x2x9z"));
        assert!(row.contains("12…5m"));
        assert!(row.contains("12…Mi"));
    }

    fn sidecar(cpu: &str) -> MetricRecord {
        MetricRecord::new(
            "default",
            "frontend-deployment-7c9f8d6b5-x2x9z",
            "istio-proxy-sidecar-container",
            cpu.parse().unwrap(),
            Quantity::from_mebibytes(64),
        )
    }

    #[test]
    fn clamped_columns_keep_a_gap() {
        let buf = frame_for(&[sidecar("150m")], None, &Snapshot::default(), 75, 10);
        let row = buf.row_text(2);
        assert!(row.contains("frontend-dep…f8d6b5-x2x9z istio-prox…-container 150m  64Mi"));
    }

    #[test]
    fn clamped_snapshot_diff_keeps_current_value() {
        let mut snapshot = Snapshot::default();
        snapshot.capture(&[sidecar("100m")]);
        let buf = frame_for(&[sidecar("150m")], None, &snapshot, 80, 10);

        let row = buf.row_text(2);
        assert!(row.contains("istio-prox…-container 100m^150m 64Mi"));
        // namespace 10, pod 25, container 21, each plus a separator
        let cpu_x = LEFT_PADDING + 59;
        assert_eq!(buf.cell(cpu_x, 2).unwrap().style, Style::Increase);
        assert_eq!(buf.cell(cpu_x + 8, 2).unwrap().style, Style::Increase);
        assert_eq!(buf.cell(cpu_x + 10, 2).unwrap(), Cell { ch: '6', style: Style::Normal });
    }

    #[test]
    fn small_caps_truncate_header_labels() {
        let records = vec![MetricRecord::new(
            "default",
            "frontend-deployment-7c9f8d6b5-x2x9z",
            "app",
            Quantity::from_millis(12345),
            Quantity::from_mebibytes(123456),
        )];
        let caps = ClampCaps { usage: 2, ..ClampCaps::default() };
        let buf = frame_with_caps(&records, None, &Snapshot::default(), &caps, 75, 10);
        assert!(buf.row_text(1).contains("CONTAINER             C…U M…M"));
        assert!(buf.row_text(2).contains("app                   1…m 1…i"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let records = vec![rec("web", "100m", "64Mi"), rec("db", "500m", "32Mi")];
        let first = frame_for(&records, Some("default/db/app"), &Snapshot::default(), 100, 12);
        let second = frame_for(&records, Some("default/db/app"), &Snapshot::default(), 100, 12);
        assert_eq!(first, second);
    }

    #[test]
    fn too_small_terminal_shows_message_only() {
        let records = vec![rec("web", "100m", "64Mi")];
        let buf = frame_for(&records, None, &Snapshot::default(), 10, 3);
        assert!(buf.row_text(1).contains("Terminal"));
        assert_eq!(buf.row_text(0), "");
    }
}
