mod event_loop;
mod input;
mod poller;
mod render;
mod state;

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::layout::{ClampCaps, Column, default_columns};
use crate::model::MetricRecord;
use crate::provider::MetricsProvider;
use crate::view::{Screen, TerminalScreen};

pub use event_loop::run_event_loop;
pub use input::{InputResult, handle_event, handle_key, handle_mouse};
pub use poller::{poll_once, spawn_poller};
pub use state::{Session, is_filter_char};

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), DisableMouseCapture, cursor::Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Puts the terminal in dashboard mode and restores it on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// The session plus the screen it is drawn on. Shared between the input
/// loop and the poller; every mutation and its render happen under one lock.
pub struct Dashboard<S: Screen> {
    pub session: Session,
    screen: S,
    columns: Vec<Column>,
    caps: ClampCaps,
}

pub type SharedDashboard<S> = Arc<Mutex<Dashboard<S>>>;

impl<S: Screen> Dashboard<S> {
    pub fn new(session: Session, screen: S, caps: ClampCaps) -> Self {
        Self {
            session,
            screen,
            columns: default_columns(),
            caps,
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
    }

    pub fn apply_batch(&mut self, records: Vec<MetricRecord>, at: DateTime<Local>) {
        self.session.replace_batch(records, at);
    }

    pub fn into_shared(self) -> SharedDashboard<S> {
        Arc::new(Mutex::new(self))
    }
}

/// Lock the dashboard. A panic while holding the lock leaves the state
/// usable, so poisoning is ignored.
pub fn lock<S: Screen>(shared: &SharedDashboard<S>) -> MutexGuard<'_, Dashboard<S>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the dashboard: initial fetch, terminal setup, background polling and
/// the input loop. The terminal is restored on every exit path.
pub fn run(config: Config, provider: Arc<dyn MetricsProvider>, should_quit: Arc<AtomicBool>) -> Result<(), Error> {
    info!(provider = %provider.describe(), interval = ?config.interval, "starting");

    let initial = provider.fetch_batch().map_err(Error::InitialFetch)?;
    info!(records = initial.len(), "initial batch loaded");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .map_err(Error::Runtime)?;

    let guard = TerminalGuard::enter()?;
    let (width, height) = terminal::size()?;

    let mut session = Session::new(Vec::new());
    session.replace_batch(initial, Local::now());
    let shared = Dashboard::new(session, TerminalScreen::new(io::stdout(), width, height), config.caps).into_shared();
    lock(&shared).render()?;

    let poller = spawn_poller(rt.handle(), provider, Arc::clone(&shared), config.interval);
    let result = run_event_loop(&shared, &should_quit);

    poller.abort();
    rt.shutdown_background();
    drop(guard);
    info!("stopped");
    result.map_err(Error::Terminal)
}
