//! # qkdash-core
//!
//! **Client-side orchestration for a BB84 QKD lab backend.**
//!
//! The backend owns the physics: it simulates BB84 key exchanges, probes
//! quantum hardware ("testbed" runs), and mints mobile pairing sessions.
//! This crate owns everything that happens on the client between a user
//! action and pixels:
//!
//! - [`TelemetryFeed`] — bounded rolling time series behind every live chart
//! - [`ChartRegistry`] — logical chart names, silent vs animated redraws
//! - [`ChannelAnimator`] — frame-driven photon transit animation seeded from
//!   the latest simulation result
//! - [`ResultStore`] — single-writer snapshot of the latest results
//! - [`Orchestrator`] — the workflows themselves (simulate, testbed, pair,
//!   export), with per-workflow in-flight tokens and loading/notification
//!   bookkeeping
//! - [`HttpBackend`] — the reqwest client for the lab backend's HTTP API
//!
//! ## Quick start
//!
//! ```no_run
//! use qkdash_core::{HttpBackend, Orchestrator, SimulationConfig};
//!
//! # async fn demo() {
//! let backend = HttpBackend::new("http://127.0.0.1:5000".into());
//! let mut orch = Orchestrator::new();
//! orch.run_simulation(&backend, &SimulationConfig::default()).await;
//!
//! if let Some(result) = orch.store().latest_simulation() {
//!     println!("{} — {}", result.security_indicator(), result.key_length_label());
//! }
//! # }
//! ```
//!
//! Everything is single-threaded and cooperative: network calls are the only
//! suspension points, and all shared state is touched from one logical
//! thread. Hosts that introduce real threads (the TUI does) wrap the
//! orchestrator in a mutex and apply completed work through the
//! `complete_*` methods.

pub mod animator;
pub mod charts;
pub mod client;
pub mod config;
pub mod orchestrator;
pub mod presenter;
pub mod result;
pub mod store;
pub mod telemetry;

pub use animator::{AnimationState, Basis, ChannelAnimator, Photon};
pub use charts::{ChartRegistry, ComparisonPanel, RedrawCommand, RedrawMode};
pub use client::{
    Backend, ClientError, HttpBackend, PairingInfo, SimulationRequest, TestbedRequest,
};
pub use config::{BackendType, ErrorCorrection, EveAttack, Preset, Scenario, SimulationConfig};
pub use orchestrator::{
    ExportArtifact, Feeds, Orchestrator, RequestToken, SessionToken, WorkflowKind,
};
pub use presenter::{Notification, Presenter, Severity};
pub use result::{
    DeviceAnalysis, DeviceInfo, DeviceRating, QubitRow, SimulationResult, TestHistory,
    TestbedMetrics, TestbedResult,
};
pub use store::ResultStore;
pub use telemetry::TelemetryFeed;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
