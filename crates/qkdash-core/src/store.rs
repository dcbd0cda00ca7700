//! Latest-result snapshots: single writer, many readers.
//!
//! The orchestrator is the only writer; writes are serialized by its
//! per-workflow token policy, so no interior locking is needed here.

use crate::result::{SimulationResult, TestHistory, TestbedResult};

/// Holds the most recent simulation and testbed results plus the bounded
/// testbed history.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    simulation: Option<SimulationResult>,
    testbed: Option<TestbedResult>,
    history: TestHistory,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest simulation result.
    pub fn set_simulation(&mut self, result: SimulationResult) {
        self.simulation = Some(result);
    }

    /// Replace the latest testbed result and record it in the history.
    pub fn set_testbed(&mut self, result: TestbedResult) {
        self.history.push(result.clone());
        self.testbed = Some(result);
    }

    pub fn latest_simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }

    pub fn latest_testbed(&self) -> Option<&TestbedResult> {
        self.testbed.as_ref()
    }

    pub fn history(&self) -> &TestHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{DeviceAnalysis, DeviceInfo, DeviceRating, TestbedMetrics};

    fn testbed(ts: f64) -> TestbedResult {
        TestbedResult {
            timestamp: ts,
            metrics: TestbedMetrics {
                qber: 0.05,
                secure_key_rate: 400.0,
                detection_efficiency: 0.8,
                dark_count_rate: 100.0,
                fidelity: 0.9,
                photon_rate: 150.0,
            },
            device_info: DeviceInfo {
                backend: "simulation".into(),
                connected: false,
                num_qubits: None,
            },
            analysis: DeviceAnalysis {
                rating: DeviceRating::C,
                recommendation: String::new(),
                suitability_score: 50,
            },
        }
    }

    #[test]
    fn starts_empty() {
        let store = ResultStore::new();
        assert!(store.latest_simulation().is_none());
        assert!(store.latest_testbed().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn testbed_write_updates_latest_and_history() {
        let mut store = ResultStore::new();
        store.set_testbed(testbed(1.0));
        store.set_testbed(testbed(2.0));
        assert_eq!(store.latest_testbed().unwrap().timestamp, 2.0);
        assert_eq!(store.history().len(), 2);
        assert_eq!(store.history().newest().unwrap().timestamp, 2.0);
    }
}
