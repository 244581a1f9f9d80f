//! Integration tests for the dashboard: input, refresh and render working
//! together against an in-memory screen.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use kubetop::app::{self, Dashboard, InputResult, Session};
use kubetop::layout::ClampCaps;
use kubetop::model::{MetricRecord, Quantity};
use kubetop::provider::{MetricsProvider, ProviderError};
use kubetop::view::{CellBuffer, LEFT_PADDING, LEGEND, SNAPSHOT_SUFFIX, Style};

const WIDTH: u16 = 120;
const HEIGHT: u16 = 12;

fn rec(pod: &str, cpu: &str) -> MetricRecord {
    MetricRecord::new("a", pod, "app", cpu.parse().unwrap(), Quantity::from_mebibytes(64))
}

fn batch() -> Vec<MetricRecord> {
    vec![rec("web", "100m"), rec("db", "500m")]
}

fn dashboard(records: Vec<MetricRecord>) -> Dashboard<CellBuffer> {
    Dashboard::new(Session::new(records), CellBuffer::new(WIDTH, HEIGHT), ClampCaps::default())
}

fn press(d: &mut Dashboard<CellBuffer>, code: KeyCode) -> Option<InputResult> {
    let result = app::handle_event(d, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    d.render().unwrap();
    result
}

fn click(d: &mut Dashboard<CellBuffer>, button: MouseButton, row: u16) -> Option<InputResult> {
    let event = Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(button),
        column: 10,
        row,
        modifiers: KeyModifiers::NONE,
    });
    let result = app::handle_event(d, event);
    d.render().unwrap();
    result
}

fn row(d: &Dashboard<CellBuffer>, y: u16) -> String {
    d.screen().row_text(y)
}

fn row_style(d: &Dashboard<CellBuffer>, y: u16) -> Option<Style> {
    d.screen().cell(LEFT_PADDING, y).map(|c| c.style)
}

#[test]
fn cpu_descending_puts_busiest_container_first() {
    let mut d = dashboard(batch());
    press(&mut d, KeyCode::Char('1'));

    assert!(row(&d, 0).contains("filter:"));
    assert!(row(&d, 1).contains("NAMESPACE"));
    assert!(row(&d, 2).contains("db"));
    assert!(row(&d, 2).contains("500m"));
    assert!(row(&d, 3).contains("web"));
    assert!(row(&d, 3).contains("100m"));
    assert_eq!(row(&d, HEIGHT - 2).trim(), LEGEND);
}

#[test]
fn selection_survives_filtering_out_and_back_in() {
    let mut d = dashboard(batch());
    // Pod order: db, web.
    assert_eq!(click(&mut d, MouseButton::Left, 2), Some(InputResult::Consumed));
    assert_eq!(row_style(&d, 2), Some(Style::Highlighted));
    assert!(row(&d, HEIGHT - 3).contains("requests:"));

    press(&mut d, KeyCode::Char('w'));
    press(&mut d, KeyCode::Char('e'));
    assert_eq!(row(&d, 0).trim(), "filter: we");
    assert!(row(&d, 2).contains("web"));
    assert_eq!(row_style(&d, 2), Some(Style::Normal));
    assert_eq!(row(&d, HEIGHT - 3), "");

    press(&mut d, KeyCode::Backspace);
    press(&mut d, KeyCode::Backspace);
    assert!(row(&d, 2).contains("db"));
    assert_eq!(row_style(&d, 2), Some(Style::Highlighted));
}

#[test]
fn selection_follows_record_across_resort() {
    let mut d = dashboard(batch());
    click(&mut d, MouseButton::Left, 3); // web
    press(&mut d, KeyCode::Char('1'));
    assert!(row(&d, 3).contains("web"));
    assert_eq!(row_style(&d, 3), Some(Style::Highlighted));
    press(&mut d, KeyCode::Char('2'));
    assert!(row(&d, 2).contains("web"));
    assert_eq!(row_style(&d, 2), Some(Style::Highlighted));
}

#[test]
fn right_click_and_out_of_range_clicks() {
    let mut d = dashboard(batch());
    assert_eq!(click(&mut d, MouseButton::Left, 7), None);
    assert_eq!(d.session.selection.key(), None);
    click(&mut d, MouseButton::Left, 2);
    assert_eq!(click(&mut d, MouseButton::Right, 0), Some(InputResult::Consumed));
    assert_eq!(d.session.selection.key(), None);
}

#[test]
fn navigation_on_empty_visible_set_is_noop() {
    let mut d = dashboard(batch());
    press(&mut d, KeyCode::Char('z'));
    assert_eq!(press(&mut d, KeyCode::Down), None);
    assert_eq!(press(&mut d, KeyCode::Up), None);
    assert_eq!(d.session.selection.key(), None);
}

#[test]
fn snapshot_decorates_changed_usage() {
    let mut d = dashboard(batch());
    press(&mut d, KeyCode::Char(' '));
    assert!(row(&d, HEIGHT - 2).ends_with(SNAPSHOT_SUFFIX));

    d.apply_batch(vec![rec("web", "100m"), rec("db", "700m")], Local::now());
    d.render().unwrap();
    assert!(row(&d, 2).contains("500m^700m"));
    assert!(row(&d, 3).contains("100m"));
    assert!(!row(&d, 3).contains('^'));

    press(&mut d, KeyCode::Char(' '));
    assert!(!row(&d, 2).contains('^'));
    assert_eq!(row(&d, HEIGHT - 2).trim(), LEGEND);
}

#[test]
fn render_is_idempotent() {
    let mut d = dashboard(batch());
    click(&mut d, MouseButton::Left, 2);
    let first = d.screen().clone();
    d.render().unwrap();
    assert_eq!(d.screen(), &first);
}

#[test]
fn escape_quits() {
    let mut d = dashboard(batch());
    assert_eq!(press(&mut d, KeyCode::Esc), Some(InputResult::Quit));
}

/// Provider that replays a fixed script, then returns a one-record batch.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<Vec<MetricRecord>, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<Vec<MetricRecord>, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MetricsProvider for ScriptedProvider {
    fn fetch_batch(&self) -> Result<Vec<MetricRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![rec("cache", "1")]))
    }
}

#[tokio::test]
async fn failed_poll_keeps_previous_batch() {
    let provider: Arc<dyn MetricsProvider> = Arc::new(ScriptedProvider::new(vec![
        Err(ProviderError::Task("metrics unavailable".into())),
        Ok(vec![rec("worker", "250m")]),
    ]));
    let shared = dashboard(batch()).into_shared();
    app::lock(&shared).render().unwrap();

    let err = app::poll_once(&provider, &shared).await.unwrap_err();
    assert!(!err.is_fatal());
    {
        let d = app::lock(&shared);
        assert_eq!(d.session.records.len(), 2);
        assert!(d.session.last_updated.is_none());
        assert!(row(&d, 2).contains("db"));
    }

    assert_eq!(app::poll_once(&provider, &shared).await.unwrap(), 1);
    let d = app::lock(&shared);
    assert_eq!(d.session.records.len(), 1);
    assert!(row(&d, 2).contains("worker"));
    assert!(row(&d, 0).contains("updated"));
}

#[tokio::test]
async fn poller_refreshes_in_background() {
    let scripted = Arc::new(ScriptedProvider::new(Vec::new()));
    let provider: Arc<dyn MetricsProvider> = scripted.clone();
    let shared = dashboard(batch()).into_shared();

    let handle = app::spawn_poller(
        &tokio::runtime::Handle::current(),
        provider,
        Arc::clone(&shared),
        Duration::from_millis(20),
    );
    for _ in 0..100 {
        if scripted.calls.load(Ordering::SeqCst) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert!(scripted.calls.load(Ordering::SeqCst) >= 2);
    let d = app::lock(&shared);
    assert_eq!(d.session.records.len(), 1);
    assert_eq!(d.session.records[0].pod, "cache");
}
