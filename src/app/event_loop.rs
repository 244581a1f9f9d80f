use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event;
use tracing::debug;

use crate::view::Screen;

use super::input::{self, InputResult};
use super::{SharedDashboard, lock};

const EVENT_POLL: Duration = Duration::from_millis(100);

/// Read terminal events until Esc, Ctrl-C or `should_quit`. Each event is
/// applied and rendered while holding the dashboard lock, so a concurrent
/// refresh never interleaves with it.
pub fn run_event_loop<S: Screen>(shared: &SharedDashboard<S>, should_quit: &AtomicBool) -> io::Result<()> {
    loop {
        if should_quit.load(Ordering::Relaxed) {
            debug!("quit signal received");
            break;
        }
        if !event::poll(EVENT_POLL)? {
            continue;
        }
        let event = event::read()?;

        let mut dashboard = lock(shared);
        match input::handle_event(&mut dashboard, event) {
            Some(InputResult::Quit) => break,
            Some(InputResult::Consumed) => dashboard.render()?,
            None => {}
        }
    }
    Ok(())
}
