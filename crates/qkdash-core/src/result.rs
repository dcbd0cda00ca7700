//! Result snapshots returned by the lab backend.
//!
//! A [`SimulationResult`] is one completed BB84 exchange; a
//! [`TestbedResult`] is one completed hardware probe. Both are immutable
//! once received — the orchestrator replaces them wholesale, never patches
//! them. [`TestHistory`] keeps the last few testbed runs for the history
//! panel, newest first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Standard BB84 QBER security threshold (Bennett & Brassard).
pub const QBER_SECURE_THRESHOLD: f64 = 0.11;

/// Maximum testbed runs retained for display.
pub const MAX_TEST_HISTORY: usize = 10;

// ---------------------------------------------------------------------------
// SimulationResult
// ---------------------------------------------------------------------------

/// One completed BB84 simulation run.
///
/// Bit and basis sequences are strings of `0`/`1` and `+`/`x` symbols as the
/// backend sends them; `bob_bits` may contain `?` where a photon was lost in
/// the channel. Index `i` is part of the final key iff `i < alice_sifted.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub qber: f64,
    pub is_secure: bool,
    pub key_generation_rate: f64,
    pub final_key: String,
    pub alice_bits: String,
    pub alice_bases: String,
    pub bob_bases: String,
    pub bob_bits: String,
    pub alice_sifted: String,
    #[serde(default)]
    pub bob_sifted: String,
    #[serde(default)]
    pub eve_bases: String,
    #[serde(default)]
    pub errors_corrected: u64,
    #[serde(default)]
    pub key_accuracy: f64,
    #[serde(default)]
    pub channel_error_rate: f64,
    #[serde(default)]
    pub eve_detection_probability: f64,
    #[serde(default)]
    pub backend_used: String,
}

/// One row of the qubit table: everything the display needs for index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct QubitRow {
    pub index: usize,
    pub alice_bit: char,
    pub alice_basis: char,
    pub bob_basis: Option<char>,
    pub bob_bit: Option<char>,
    pub basis_match: bool,
    pub in_final_key: bool,
}

impl SimulationResult {
    /// Security indicator label for the result panel.
    pub fn security_indicator(&self) -> &'static str {
        if self.is_secure { "SECURE" } else { "INSECURE" }
    }

    /// Final key length in bits.
    pub fn key_length(&self) -> usize {
        self.final_key.len()
    }

    /// Key length label, e.g. `"4 bits"`.
    pub fn key_length_label(&self) -> String {
        format!("{} bits", self.key_length())
    }

    /// QBER as a display percentage.
    pub fn qber_percent(&self) -> f64 {
        self.qber * 100.0
    }

    /// Qubit table rows derived from the transmitted sequences.
    ///
    /// `basis_match` holds iff Alice's and Bob's bases agree at that index;
    /// `in_final_key` holds iff the index survived sifting.
    pub fn qubit_rows(&self) -> Vec<QubitRow> {
        let alice_bits: Vec<char> = self.alice_bits.chars().collect();
        let alice_bases: Vec<char> = self.alice_bases.chars().collect();
        let bob_bases: Vec<char> = self.bob_bases.chars().collect();
        let bob_bits: Vec<char> = self.bob_bits.chars().collect();
        let sifted_len = self.alice_sifted.len();

        alice_bits
            .iter()
            .enumerate()
            .map(|(i, &bit)| {
                let alice_basis = alice_bases.get(i).copied().unwrap_or('+');
                let bob_basis = bob_bases.get(i).copied();
                QubitRow {
                    index: i,
                    alice_bit: bit,
                    alice_basis,
                    bob_basis,
                    bob_bit: bob_bits.get(i).copied(),
                    basis_match: bob_basis == Some(alice_basis),
                    in_final_key: i < sifted_len,
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TestbedResult
// ---------------------------------------------------------------------------

/// Measured device characteristics from one testbed probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestbedMetrics {
    pub qber: f64,
    pub secure_key_rate: f64,
    pub detection_efficiency: f64,
    pub dark_count_rate: f64,
    pub fidelity: f64,
    #[serde(default)]
    pub photon_rate: f64,
}

/// Device identity reported by the testbed service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub backend: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub num_qubits: Option<u64>,
}

/// QKD suitability rating assigned by the testbed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceRating {
    A,
    B,
    C,
    D,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeviceRating {
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::Unknown => "?",
        }
    }
}

/// Suitability verdict from the testbed service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAnalysis {
    #[serde(default)]
    pub rating: DeviceRating,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub suitability_score: u64,
}

/// One completed device probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestbedResult {
    /// Unix seconds at probe completion.
    pub timestamp: f64,
    pub metrics: TestbedMetrics,
    pub device_info: DeviceInfo,
    pub analysis: DeviceAnalysis,
}

// ---------------------------------------------------------------------------
// TestHistory
// ---------------------------------------------------------------------------

/// Bounded history of testbed runs, newest first.
///
/// Insertion is always at the front; overflow beyond [`MAX_TEST_HISTORY`]
/// evicts from the back.
#[derive(Debug, Clone, Default)]
pub struct TestHistory {
    entries: VecDeque<TestbedResult>,
}

impl TestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run at the front, evicting the oldest on overflow.
    pub fn push(&mut self, result: TestbedResult) {
        self.entries.push_front(result);
        while self.entries.len() > MAX_TEST_HISTORY {
            self.entries.pop_back();
        }
    }

    /// Runs in display order (newest first).
    pub fn iter(&self) -> impl Iterator<Item = &TestbedResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&TestbedResult> {
        self.entries.front()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> SimulationResult {
        SimulationResult {
            qber: 0.03,
            is_secure: true,
            key_generation_rate: 0.4,
            final_key: "0110".into(),
            alice_bits: "01101001".into(),
            alice_bases: "+x+x+x+x".into(),
            bob_bases: "+x+xx+x+".into(),
            bob_bits: "0110?0".into(),
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

    fn sample_testbed(ts: f64) -> TestbedResult {
        TestbedResult {
            timestamp: ts,
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

    #[test]
    fn security_indicator_reads_secure() {
        let r = sample_result();
        assert_eq!(r.security_indicator(), "SECURE");
        assert_eq!(r.key_length_label(), "4 bits");
    }

    #[test]
    fn security_indicator_reads_insecure_above_threshold() {
        let mut r = sample_result();
        r.is_secure = false;
        assert_eq!(r.security_indicator(), "INSECURE");
    }

    #[test]
    fn in_final_key_flag_follows_sifted_length() {
        let r = sample_result();
        let rows = r.qubit_rows();
        assert_eq!(rows.len(), 8);
        for row in &rows {
            assert_eq!(row.in_final_key, row.index < r.alice_sifted.len());
        }
    }

    #[test]
    fn basis_match_flag_compares_bases_per_index() {
        let r = sample_result();
        let rows = r.qubit_rows();
        // +x+x+x+x vs +x+xx+x+ — first four match, last four do not.
        for row in &rows[..4] {
            assert!(row.basis_match, "index {} should match", row.index);
        }
        for row in &rows[4..] {
            assert!(!row.basis_match, "index {} should not match", row.index);
        }
    }

    #[test]
    fn sparse_bob_bits_yield_none_rows() {
        let r = sample_result();
        let rows = r.qubit_rows();
        assert_eq!(rows[4].bob_bit, Some('?'));
        assert_eq!(rows[6].bob_bit, None);
        assert_eq!(rows[7].bob_bit, None);
    }

    #[test]
    fn test_history_caps_at_ten_newest_first() {
        let mut history = TestHistory::new();
        for i in 0..15 {
            history.push(sample_testbed(i as f64));
        }
        assert_eq!(history.len(), MAX_TEST_HISTORY);
        let stamps: Vec<f64> = history.iter().map(|r| r.timestamp).collect();
        // Newest (14) at the front, oldest five evicted from the back.
        assert_eq!(stamps[0], 14.0);
        assert_eq!(*stamps.last().unwrap(), 5.0);
    }

    #[test]
    fn test_history_newest_tracks_front() {
        let mut history = TestHistory::new();
        assert!(history.newest().is_none());
        history.push(sample_testbed(1.0));
        history.push(sample_testbed(2.0));
        assert_eq!(history.newest().unwrap().timestamp, 2.0);
    }

    #[test]
    fn device_rating_deserializes_unknown_variants() {
        let r: DeviceRating = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(r, DeviceRating::A);
        let r: DeviceRating = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(r, DeviceRating::Unknown);
    }

    #[test]
    fn simulation_result_parses_minimal_backend_payload() {
        // Supplemental fields are optional on the wire.
        let json = r#"{
            "qber": 0.03, "is_secure": true, "key_generation_rate": 0.4,
            "final_key": "0110", "alice_bits": "0110", "alice_bases": "+x+x",
            "bob_bases": "+x+x", "bob_bits": "0110", "alice_sifted": "0110"
        }"#;
        let r: SimulationResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.key_length(), 4);
        assert_eq!(r.errors_corrected, 0);
        assert!(r.backend_used.is_empty());
    }
}
