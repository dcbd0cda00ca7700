//! Workflow orchestration: the one place that writes application state.
//!
//! Every user-triggered workflow follows the same protocol: take an
//! in-flight token and enter loading, build the request from the current
//! config (missing fields already defaulted), await the backend, then
//! resolve through a `complete_*` method which releases loading on every
//! path, drops superseded responses, and only on current success touches
//! the store, feeds, charts, and animator.
//!
//! Tokens carry a per-workflow generation: starting a workflow supersedes
//! any response still in flight for the same workflow, so "last click wins"
//! instead of "last response wins".

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, Utc};
use serde::Serialize;

use crate::animator::ChannelAnimator;
use crate::charts::{ChartRegistry, RedrawMode};
use crate::client::{Backend, ClientError, PairingInfo, SimulationRequest, TestbedRequest};
use crate::config::SimulationConfig;
use crate::presenter::{Presenter, Severity};
use crate::result::{SimulationResult, TestbedResult};
use crate::store::ResultStore;
use crate::telemetry::TelemetryFeed;

/// Opaque pairing session token; the latest pairing request owns it.
pub type SessionToken = String;

/// The user-triggered workflows that reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Simulate,
    Testbed,
    Pair,
}

impl WorkflowKind {
    fn index(self) -> usize {
        match self {
            Self::Simulate => 0,
            Self::Testbed => 1,
            Self::Pair => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Simulate => "simulation",
            Self::Testbed => "testbed",
            Self::Pair => "mobile pairing",
        }
    }
}

/// In-flight marker for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: WorkflowKind,
    generation: u64,
}

/// The rolling telemetry feeds behind the live charts.
#[derive(Debug, Clone)]
pub struct Feeds {
    /// QBER in percent, one channel.
    pub qber: TelemetryFeed,
    /// Detection efficiency in percent, one channel.
    pub detection: TelemetryFeed,
    /// Secure key rate, one channel.
    pub key_rate: TelemetryFeed,
}

impl Default for Feeds {
    fn default() -> Self {
        Self {
            qber: TelemetryFeed::new(1),
            detection: TelemetryFeed::new(1),
            key_rate: TelemetryFeed::new(1),
        }
    }
}

/// Downloadable export of the latest simulation.
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    #[serde(skip)]
    pub file_name: String,
    pub timestamp: String,
    pub simulation_parameters: SimulationConfig,
    pub results: SimulationResult,
}

impl ExportArtifact {
    /// Write the artifact into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Coordinates workflows against the backend and owns all mutable UI state.
#[derive(Debug, Default)]
pub struct Orchestrator {
    store: ResultStore,
    feeds: Feeds,
    registry: ChartRegistry,
    animator: ChannelAnimator,
    presenter: Presenter,
    session: Option<SessionToken>,
    generations: [u64; 3],
    in_flight: [u64; 3],
}

impl Orchestrator {
    pub fn new() -> Self {
        let mut orch = Self::default();
        orch.registry.register("qber", RedrawMode::Silent);
        orch.registry.register("detection_efficiency", RedrawMode::Silent);
        orch.registry.register("key_rate", RedrawMode::Silent);
        orch.registry.register("comparison", RedrawMode::Animated);
        orch
    }

    // --- workflow protocol -------------------------------------------------

    /// Enter loading and take a token for one request. Any earlier token of
    /// the same workflow is superseded from this point on.
    pub fn begin(&mut self, kind: WorkflowKind) -> RequestToken {
        let slot = kind.index();
        self.generations[slot] += 1;
        self.in_flight[slot] = self.generations[slot];
        self.presenter.begin_loading();
        log::debug!("{} request #{} issued", kind.label(), self.generations[slot]);
        RequestToken {
            kind,
            generation: self.generations[slot],
        }
    }

    /// Whether a token still owns its workflow slot.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.in_flight[token.kind.index()] == token.generation
    }

    /// Release loading for a resolved request and decide whether its
    /// outcome may be applied. Superseded responses are dropped here.
    fn resolve(&mut self, token: RequestToken) -> bool {
        self.presenter.end_loading();
        if self.is_current(token) {
            true
        } else {
            log::debug!(
                "dropping superseded {} response #{}",
                token.kind.label(),
                token.generation
            );
            false
        }
    }

    fn fail(&mut self, kind: WorkflowKind, error: &ClientError) {
        log::warn!("{} failed: {error}", kind.label());
        self.presenter
            .notify(format!("{} failed: {error}", kind.label()), Severity::Error);
    }

    // --- simulate ----------------------------------------------------------

    /// Resolve a simulation request. Loading is released unconditionally;
    /// state changes only for a current, successful response.
    pub fn complete_simulation(
        &mut self,
        token: RequestToken,
        outcome: Result<SimulationResult, ClientError>,
    ) {
        if !self.resolve(token) {
            return;
        }
        match outcome {
            Ok(result) => self.apply_simulation(result),
            Err(e) => self.fail(WorkflowKind::Simulate, &e),
        }
    }

    fn apply_simulation(&mut self, result: SimulationResult) {
        let label = time_label();
        self.feeds.qber.append(label.clone(), result.qber_percent());
        self.feeds
            .key_rate
            .append(label, result.key_generation_rate);
        self.registry.update("qber");
        self.registry.update("key_rate");

        self.animator.set_data(&result);
        self.animator.play();

        self.presenter.notify(
            format!(
                "Simulation complete — {}, key {}",
                result.security_indicator(),
                result.key_length_label()
            ),
            Severity::Success,
        );
        self.store.set_simulation(result);
    }

    /// Run the whole simulation workflow against a backend.
    pub async fn run_simulation<B: Backend>(&mut self, backend: &B, config: &SimulationConfig) {
        let token = self.begin(WorkflowKind::Simulate);
        let request = SimulationRequest::from_config(config);
        let outcome = backend.run_simulation(&request).await;
        self.complete_simulation(token, outcome);
    }

    // --- testbed -----------------------------------------------------------

    pub fn complete_testbed(
        &mut self,
        token: RequestToken,
        outcome: Result<TestbedResult, ClientError>,
    ) {
        if !self.resolve(token) {
            return;
        }
        match outcome {
            Ok(result) => self.apply_testbed(result),
            Err(e) => self.fail(WorkflowKind::Testbed, &e),
        }
    }

    fn apply_testbed(&mut self, result: TestbedResult) {
        let label = time_label();
        self.feeds
            .qber
            .append(label.clone(), result.metrics.qber * 100.0);
        self.feeds
            .detection
            .append(label.clone(), result.metrics.detection_efficiency * 100.0);
        self.feeds
            .key_rate
            .append(label, result.metrics.secure_key_rate);
        self.registry.update("qber");
        self.registry.update("detection_efficiency");
        self.registry.update("key_rate");
        self.registry.refresh_comparison();

        self.presenter.notify(
            format!(
                "Testbed complete — rating {} on {}",
                result.analysis.rating.label(),
                result.device_info.backend
            ),
            Severity::Success,
        );
        self.store.set_testbed(result);
    }

    pub async fn run_testbed<B: Backend>(&mut self, backend: &B, config: &SimulationConfig) {
        let token = self.begin(WorkflowKind::Testbed);
        let request = TestbedRequest {
            photon_rate: config.photon_rate,
            api_key: config.api_key.clone(),
        };
        let outcome = backend.run_testbed(&request).await;
        self.complete_testbed(token, outcome);
    }

    // --- mobile pairing ----------------------------------------------------

    pub fn complete_pairing(
        &mut self,
        token: RequestToken,
        outcome: Result<PairingInfo, ClientError>,
    ) {
        if !self.resolve(token) {
            return;
        }
        match outcome {
            Ok(info) => {
                self.session = Some(info.session_token.clone());
                self.presenter.notify(
                    format!("Mobile pairing ready — scan {}", info.qr_data),
                    Severity::Success,
                );
            }
            Err(e) => self.fail(WorkflowKind::Pair, &e),
        }
    }

    pub async fn connect_mobile<B: Backend>(&mut self, backend: &B) {
        let token = self.begin(WorkflowKind::Pair);
        let outcome = backend.connect_mobile().await;
        self.complete_pairing(token, outcome);
    }

    // --- export ------------------------------------------------------------

    /// Build the export artifact for the latest simulation.
    ///
    /// Local-only: no network, no loading state. With nothing to export a
    /// warning notification is the entire outcome.
    pub fn export(&mut self, config: &SimulationConfig) -> Option<ExportArtifact> {
        let Some(result) = self.store.latest_simulation() else {
            self.presenter.notify(
                "No simulation results to export yet — run a simulation first",
                Severity::Warning,
            );
            return None;
        };
        let artifact = ExportArtifact {
            file_name: format!("bb84_simulation_{}.json", Utc::now().timestamp_millis()),
            timestamp: Utc::now().to_rfc3339(),
            simulation_parameters: config.clone(),
            results: result.clone(),
        };
        self.presenter.notify(
            format!("Exported {}", artifact.file_name),
            Severity::Success,
        );
        Some(artifact)
    }

    // --- housekeeping ------------------------------------------------------

    /// Advance the animation chain and expire stale notifications. Called
    /// once per rendered frame by the host.
    pub fn tick(&mut self, now: Instant) {
        self.animator.advance();
        self.presenter.expire(now);
    }

    // --- accessors ---------------------------------------------------------

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn feeds(&self) -> &Feeds {
        &self.feeds
    }

    pub fn animator(&self) -> &ChannelAnimator {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut ChannelAnimator {
        &mut self.animator
    }

    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ChartRegistry {
        &mut self.registry
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut Presenter {
        &mut self.presenter
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

/// Short wall-clock label for chart axes.
fn time_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::Severity;
    use crate::result::{DeviceAnalysis, DeviceInfo, DeviceRating, TestbedMetrics};

    /// Scripted backend: every call returns a pre-canned outcome.
    struct FakeBackend {
        simulation: Result<SimulationResult, ClientError>,
        testbed: Result<TestbedResult, ClientError>,
        pairing: Result<PairingInfo, ClientError>,
    }

    impl FakeBackend {
        fn all_ok() -> Self {
            Self {
                simulation: Ok(sample_simulation()),
                testbed: Ok(sample_testbed()),
                pairing: Ok(PairingInfo {
                    session_token: "tok-1".into(),
                    qr_data: "http://10.0.0.2:5000/mobile/tok-1".into(),
                    local_ip: Some("10.0.0.2".into()),
                    expires_in: Some(300),
                }),
            }
        }
    }

    fn clone_outcome<T: Clone>(r: &Result<T, ClientError>) -> Result<T, ClientError> {
        match r {
            Ok(v) => Ok(v.clone()),
            Err(ClientError::Transport(m)) => Err(ClientError::Transport(m.clone())),
            Err(ClientError::Backend(m)) => Err(ClientError::Backend(m.clone())),
        }
    }

    impl Backend for FakeBackend {
        async fn run_simulation(
            &self,
            _request: &SimulationRequest,
        ) -> Result<SimulationResult, ClientError> {
            clone_outcome(&self.simulation)
        }

        async fn run_testbed(
            &self,
            _request: &TestbedRequest,
        ) -> Result<TestbedResult, ClientError> {
            clone_outcome(&self.testbed)
        }

        async fn connect_mobile(&self) -> Result<PairingInfo, ClientError> {
            clone_outcome(&self.pairing)
        }
    }

    fn sample_simulation() -> SimulationResult {
        SimulationResult {
            qber: 0.03,
            is_secure: true,
            key_generation_rate: 0.4,
            final_key: "0110".into(),
            alice_bits: "01101001".into(),
            alice_bases: "+x+x+x+x".into(),
            bob_bases: "+x+x+x+x".into(),
            bob_bits: "01101001".into(),
            alice_sifted: "0110".into(),
            bob_sifted: "0110".into(),
            eve_bases: String::new(),
            errors_corrected: 0,
            key_accuracy: 0.97,
            channel_error_rate: 0.02,
            eve_detection_probability: 0.0,
            backend_used: "classical".into(),
        }
    }

    fn sample_testbed() -> TestbedResult {
        TestbedResult {
            timestamp: 1_700_000_000.0,
            metrics: TestbedMetrics {
                qber: 0.04,
                secure_key_rate: 820.0,
                detection_efficiency: 0.87,
                dark_count_rate: 210.0,
                fidelity: 0.95,
                photon_rate: 150.0,
            },
            device_info: DeviceInfo {
                backend: "qiskit_aer_simulator".into(),
                connected: false,
                num_qubits: None,
            },
            analysis: DeviceAnalysis {
                rating: DeviceRating::B,
                recommendation: "Good for QKD with optimization".into(),
                suitability_score: 70,
            },
        }
    }

    #[tokio::test]
    async fn simulation_success_updates_store_feeds_and_animator() {
        let backend = FakeBackend::all_ok();
        let mut orch = Orchestrator::new();
        orch.registry_mut().drain_commands();

        orch.run_simulation(&backend, &SimulationConfig::default()).await;

        let result = orch.store().latest_simulation().expect("stored result");
        assert_eq!(result.security_indicator(), "SECURE");
        assert_eq!(result.key_length_label(), "4 bits");

        let qber = orch.feeds().qber.latest(0).expect("qber sample");
        assert!((qber - 3.0).abs() < 1e-9, "qber percent, got {qber}");
        assert_eq!(orch.feeds().key_rate.latest(0), Some(0.4));
        assert!(orch.animator().state().is_playing);
        assert!(!orch.presenter().is_busy());

        let note = orch.presenter().notifications().next().unwrap();
        assert_eq!(note.severity, Severity::Success);
        assert!(note.message.contains("SECURE"));
        assert!(note.message.contains("4 bits"));

        let updated: Vec<String> = orch
            .registry_mut()
            .drain_commands()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert!(updated.contains(&"qber".to_string()));
        assert!(updated.contains(&"key_rate".to_string()));
    }

    #[tokio::test]
    async fn testbed_transport_failure_leaves_state_untouched() {
        let mut backend = FakeBackend::all_ok();
        backend.testbed = Err(ClientError::Transport("connection refused".into()));
        let mut orch = Orchestrator::new();

        orch.run_testbed(&backend, &SimulationConfig::default()).await;

        assert!(orch.store().latest_testbed().is_none());
        assert!(orch.store().history().is_empty());
        assert!(orch.feeds().detection.is_empty());
        assert!(!orch.presenter().is_busy());

        let notes: Vec<_> = orch.presenter().notifications().collect();
        assert_eq!(notes.len(), 1, "exactly one error notification");
        assert_eq!(notes[0].severity, Severity::Error);
        assert!(notes[0].message.contains("connection refused"));
    }

    #[tokio::test]
    async fn backend_failure_message_reaches_the_notification() {
        let mut backend = FakeBackend::all_ok();
        backend.simulation = Err(ClientError::Backend(
            "Simulation failed. Please check your parameters and try again.".into(),
        ));
        let mut orch = Orchestrator::new();

        orch.run_simulation(&backend, &SimulationConfig::default()).await;

        assert!(orch.store().latest_simulation().is_none());
        let note = orch.presenter().notifications().next().unwrap();
        assert!(note.message.contains("check your parameters"));
    }

    #[tokio::test]
    async fn testbed_success_fills_history_and_comparison() {
        let backend = FakeBackend::all_ok();
        let mut orch = Orchestrator::new();

        orch.run_testbed(&backend, &SimulationConfig::default()).await;

        assert_eq!(orch.store().history().len(), 1);
        let eff = orch.feeds().detection.latest(0).expect("detection sample");
        assert!((eff - 87.0).abs() < 1e-9, "detection percent, got {eff}");
        assert!(orch.registry().comparison().is_some());
    }

    #[tokio::test]
    async fn pairing_stores_latest_session_token() {
        let backend = FakeBackend::all_ok();
        let mut orch = Orchestrator::new();

        orch.connect_mobile(&backend).await;
        assert_eq!(orch.session_token(), Some("tok-1"));

        let mut backend2 = FakeBackend::all_ok();
        backend2.pairing = Ok(PairingInfo {
            session_token: "tok-2".into(),
            qr_data: "http://10.0.0.2:5000/mobile/tok-2".into(),
            local_ip: None,
            expires_in: None,
        });
        orch.connect_mobile(&backend2).await;
        assert_eq!(orch.session_token(), Some("tok-2"));
    }

    #[test]
    fn superseded_response_is_dropped() {
        let mut orch = Orchestrator::new();

        let stale = orch.begin(WorkflowKind::Simulate);
        let fresh = orch.begin(WorkflowKind::Simulate);
        assert!(orch.presenter().is_busy());

        // The stale response resolves late: loading releases, state stays.
        orch.complete_simulation(stale, Ok(sample_simulation()));
        assert!(orch.store().latest_simulation().is_none());
        assert!(orch.presenter().is_busy(), "fresh request still in flight");

        orch.complete_simulation(fresh, Ok(sample_simulation()));
        assert!(orch.store().latest_simulation().is_some());
        assert!(!orch.presenter().is_busy());
    }

    #[test]
    fn tokens_are_scoped_per_workflow() {
        let mut orch = Orchestrator::new();
        let sim = orch.begin(WorkflowKind::Simulate);
        let _testbed = orch.begin(WorkflowKind::Testbed);
        // A testbed request does not supersede a simulation request.
        assert!(orch.is_current(sim));
    }

    #[test]
    fn export_without_result_warns_and_produces_nothing() {
        let mut orch = Orchestrator::new();
        let artifact = orch.export(&SimulationConfig::default());
        assert!(artifact.is_none());

        let notes: Vec<_> = orch.presenter().notifications().collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Warning);
        assert!(!orch.presenter().is_busy(), "export never enters loading");
    }

    #[tokio::test]
    async fn export_writes_timestamped_artifact() {
        let backend = FakeBackend::all_ok();
        let mut orch = Orchestrator::new();
        orch.run_simulation(&backend, &SimulationConfig::default()).await;

        let config = SimulationConfig::default();
        let artifact = orch.export(&config).expect("artifact");
        assert!(artifact.file_name.starts_with("bb84_simulation_"));
        assert!(artifact.file_name.ends_with(".json"));

        let dir = tempfile::tempdir().unwrap();
        let path = artifact.write_to(dir.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["results"]["final_key"], "0110");
        assert_eq!(value["simulation_parameters"]["photon_rate"], 100);
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn tick_advances_animation_only_while_playing() {
        let mut orch = Orchestrator::new();
        orch.tick(Instant::now());
        assert_eq!(orch.animator().state().current_frame, 0);

        orch.animator_mut().play();
        orch.tick(Instant::now());
        assert_eq!(orch.animator().state().current_frame, 1);
    }
}
