use std::io;

use crate::layout;
use crate::sort;
use crate::view::{FrameInput, Presenter, Screen};

use super::Dashboard;

impl<S: Screen> Dashboard<S> {
    /// Recompute the visible set and layout, then redraw the whole screen.
    pub fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.screen.size();
        let session = &mut self.session;

        let visible = sort::apply(&session.records, &session.filter, session.order);
        session.selection.sync(&visible);
        let widths = layout::compute(&visible, &self.columns, &session.snapshot, width as usize, &self.caps);
        let status = session
            .last_updated
            .map(|t| t.format("updated %H:%M:%S").to_string());

        let frame = Presenter::render(
            &FrameInput {
                records: &visible,
                columns: &self.columns,
                widths: &widths,
                selected: session.selection.key(),
                snapshot: &session.snapshot,
                filter: &session.filter,
                status: status.as_deref(),
            },
            width,
            height,
        );
        frame.draw(&mut self.screen)
    }
}
