//! TUI application state and event loop.
//!
//! Design: the orchestrator owns all dashboard state behind one mutex.
//! Workflows run on background threads so the UI never blocks on the
//! network; each worker takes a request token under the lock, performs the
//! HTTP call without holding it, then applies the outcome through the
//! orchestrator's `complete_*` methods. A per-workflow atomic flag keeps
//! one request of each kind in flight from this process.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use qkdash_core::{
    AnimationState, Backend, ClientError, ComparisonPanel, HttpBackend, Notification, Orchestrator,
    Photon, Preset, RedrawMode, Severity, SimulationConfig, SimulationRequest, SimulationResult,
    TestbedRequest, TestbedResult, WorkflowKind,
};

/// Fixed frame interval; the photon animation wants a steady cadence.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How long an animated-redraw highlight stays on a chart border.
const FLASH_DURATION: Duration = Duration::from_millis(400);

// ---------------------------------------------------------------------------
// Snapshot — single-lock capture of shared state for UI rendering
// ---------------------------------------------------------------------------

/// All shared state the UI needs, captured in a single mutex lock.
pub struct Snapshot {
    pub simulation: Option<SimulationResult>,
    pub testbed: Option<TestbedResult>,
    pub history: Vec<TestbedResult>,
    pub qber: (Vec<String>, Vec<f64>),
    pub detection: (Vec<String>, Vec<f64>),
    pub key_rate: (Vec<String>, Vec<f64>),
    pub comparison: Option<ComparisonPanel>,
    pub photons: Vec<Photon>,
    pub animation: AnimationState,
    pub notifications: Vec<Notification>,
    pub busy: bool,
    pub session: Option<String>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    orch: Arc<Mutex<Orchestrator>>,
    backend: HttpBackend,
    config: SimulationConfig,
    running: bool,
    /// Index into [`Preset::ALL`] for the next 'p' press.
    preset_cursor: usize,
    active_preset: Option<Preset>,
    /// Poll the testbed automatically at the refresh interval.
    live: bool,
    refresh: Duration,
    last_poll: Instant,
    simulate_flag: Arc<AtomicBool>,
    testbed_flag: Arc<AtomicBool>,
    pair_flag: Arc<AtomicBool>,
    /// Chart name -> when an animated redraw was last requested.
    flash: HashMap<String, Instant>,
    last_export: Option<PathBuf>,
}

impl App {
    pub fn new(server: String, refresh_secs: f64) -> Self {
        Self {
            orch: Arc::new(Mutex::new(Orchestrator::new())),
            backend: HttpBackend::new(server),
            config: SimulationConfig::default(),
            running: true,
            preset_cursor: 0,
            active_preset: None,
            live: false,
            refresh: Duration::from_secs_f64(refresh_secs.max(0.2)),
            last_poll: Instant::now(),
            simulate_flag: Arc::new(AtomicBool::new(false)),
            testbed_flag: Arc::new(AtomicBool::new(false)),
            pair_flag: Arc::new(AtomicBool::new(false)),
            flash: HashMap::new(),
            last_export: None,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        if let Some(path) = &self.last_export {
            println!("Exported {}", path.display());
        }

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(FRAME_INTERVAL)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code);
            }

            self.tick();
        }

        Ok(())
    }

    /// Per-frame housekeeping: animation, notification expiry, redraw
    /// commands, live polling.
    fn tick(&mut self) {
        let now = Instant::now();
        {
            let mut orch = lock(&self.orch);
            orch.tick(now);
            for cmd in orch.registry_mut().drain_commands() {
                if cmd.mode == RedrawMode::Animated {
                    self.flash.insert(cmd.name, now);
                }
            }
        }
        self.flash.retain(|_, at| now.duration_since(*at) < FLASH_DURATION);

        if self.live
            && self.last_poll.elapsed() >= self.refresh
            && !self.testbed_flag.load(Ordering::Relaxed)
        {
            self.last_poll = Instant::now();
            self.kick_testbed();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('s') => self.kick_simulate(),
            KeyCode::Char('t') => self.kick_testbed(),
            KeyCode::Char('m') => self.kick_pair(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('p') => self.cycle_preset(),
            KeyCode::Char('l') => {
                self.live = !self.live;
                // Make the first live poll fire on the next tick.
                self.last_poll = Instant::now()
                    .checked_sub(self.refresh)
                    .unwrap_or_else(Instant::now);
            }
            KeyCode::Char(' ') => {
                let mut orch = lock(&self.orch);
                let playing = orch.animator().state().is_playing;
                if playing {
                    orch.animator_mut().pause();
                } else {
                    orch.animator_mut().play();
                }
            }
            KeyCode::Char('r') => lock(&self.orch).animator_mut().reset(),
            KeyCode::Char('d') => {
                let mut orch = lock(&self.orch);
                let id = orch.presenter().notifications().next().map(|n| n.id);
                if let Some(id) = id {
                    orch.presenter_mut().dismiss(id);
                }
            }
            _ => {}
        }
    }

    fn cycle_preset(&mut self) {
        let preset = Preset::ALL[self.preset_cursor];
        self.preset_cursor = (self.preset_cursor + 1) % Preset::ALL.len();
        preset.apply(&mut self.config);
        self.active_preset = Some(preset);
        lock(&self.orch)
            .presenter_mut()
            .notify(format!("Preset: {}", preset.name()), Severity::Info);
    }

    fn export(&mut self) {
        let mut orch = lock(&self.orch);
        let Some(artifact) = orch.export(&self.config) else {
            return;
        };
        match artifact.write_to(std::path::Path::new(".")) {
            Ok(path) => self.last_export = Some(path),
            Err(e) => {
                orch.presenter_mut()
                    .notify(format!("Export failed: {e}"), Severity::Error);
            }
        }
    }

    // --- background workflows ----------------------------------------------

    fn kick_simulate(&self) {
        if self.simulate_flag.swap(true, Ordering::Relaxed) {
            return;
        }
        let orch = Arc::clone(&self.orch);
        let flag = Arc::clone(&self.simulate_flag);
        let backend = self.backend.clone();
        let config = self.config.clone();

        thread::spawn(move || {
            let token = lock(&orch).begin(WorkflowKind::Simulate);
            let request = SimulationRequest::from_config(&config);
            let outcome = block_on(|| backend.run_simulation(&request));
            lock(&orch).complete_simulation(token, outcome);
            flag.store(false, Ordering::Relaxed);
        });
    }

    fn kick_testbed(&self) {
        if self.testbed_flag.swap(true, Ordering::Relaxed) {
            return;
        }
        let orch = Arc::clone(&self.orch);
        let flag = Arc::clone(&self.testbed_flag);
        let backend = self.backend.clone();
        let request = TestbedRequest {
            photon_rate: self.config.photon_rate,
            api_key: self.config.api_key.clone(),
        };

        thread::spawn(move || {
            let token = lock(&orch).begin(WorkflowKind::Testbed);
            let outcome = block_on(|| backend.run_testbed(&request));
            lock(&orch).complete_testbed(token, outcome);
            flag.store(false, Ordering::Relaxed);
        });
    }

    fn kick_pair(&self) {
        if self.pair_flag.swap(true, Ordering::Relaxed) {
            return;
        }
        let orch = Arc::clone(&self.orch);
        let flag = Arc::clone(&self.pair_flag);
        let backend = self.backend.clone();

        thread::spawn(move || {
            let token = lock(&orch).begin(WorkflowKind::Pair);
            let outcome = block_on(|| backend.connect_mobile());
            lock(&orch).complete_pairing(token, outcome);
            flag.store(false, Ordering::Relaxed);
        });
    }

    // --- accessors for the UI ----------------------------------------------

    pub fn server(&self) -> &str {
        self.backend.base_url()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn active_preset(&self) -> Option<Preset> {
        self.active_preset
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn is_flashing(&self, chart: &str) -> bool {
        self.flash.contains_key(chart)
    }

    /// Capture all shared state in a single mutex lock for one UI frame.
    pub fn snapshot(&self) -> Snapshot {
        let orch = lock(&self.orch);
        let feeds = orch.feeds();
        let series = |feed: &qkdash_core::TelemetryFeed| {
            (
                feed.labels().map(str::to_string).collect::<Vec<_>>(),
                feed.values(0),
            )
        };

        Snapshot {
            simulation: orch.store().latest_simulation().cloned(),
            testbed: orch.store().latest_testbed().cloned(),
            history: orch.store().history().iter().cloned().collect(),
            qber: series(&feeds.qber),
            detection: series(&feeds.detection),
            key_rate: series(&feeds.key_rate),
            comparison: orch.registry().comparison().cloned(),
            photons: orch.animator().photons(),
            animation: orch.animator().state(),
            notifications: orch.presenter().notifications().cloned().collect(),
            busy: orch.presenter().is_busy(),
            session: orch.session_token().map(str::to_string),
        }
    }
}

/// Lock the orchestrator, recovering from a poisoned mutex.
fn lock(orch: &Arc<Mutex<Orchestrator>>) -> std::sync::MutexGuard<'_, Orchestrator> {
    match orch.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Run one async backend call on a throwaway runtime.
fn block_on<T, F, Fut>(call: F) -> Result<T, ClientError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(call()),
        Err(e) => Err(ClientError::Transport(e.to_string())),
    }
}
