//! Simulation parameters, documented defaults, and named presets.
//!
//! Missing UI input is never an error: every field has a backend-compatible
//! default (`photon_rate=100`, `distance=10`, `noise=0.1`), so the
//! orchestrator only ever fills gaps, it never validates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Manual,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    #[default]
    Classical,
    RealQuantum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EveAttack {
    #[default]
    None,
    InterceptResend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCorrection {
    #[default]
    Cascade,
    None,
}

/// Full parameter bundle for one simulation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub scenario: Scenario,
    pub backend_type: BackendType,
    pub num_qubits: u32,
    pub photon_rate: u32,
    /// Channel length in km.
    pub distance: f64,
    /// Channel noise probability in `[0, 1]`.
    pub noise: f64,
    pub eve_attack: EveAttack,
    pub error_correction: ErrorCorrection,
    pub privacy_amplification: String,
    /// Manual-scenario bit string; auto scenarios leave this unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bits: Option<String>,
    /// Manual-scenario basis string (`+`/`x` symbols).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bases: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::Auto,
            backend_type: BackendType::Classical,
            num_qubits: 16,
            photon_rate: 100,
            distance: 10.0,
            noise: 0.1,
            eve_attack: EveAttack::None,
            error_correction: ErrorCorrection::Cascade,
            privacy_amplification: "standard".into(),
            bits: None,
            bases: None,
            rng_type: None,
            api_key: None,
        }
    }
}

/// Named parameter bundles selectable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    SecureShort,
    NoisyChannel,
    EveAttack,
    HighRate,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::SecureShort,
        Preset::NoisyChannel,
        Preset::EveAttack,
        Preset::HighRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SecureShort => "secure_short",
            Self::NoisyChannel => "noisy_channel",
            Self::EveAttack => "eve_attack",
            Self::HighRate => "high_rate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Expand this preset into a config, overwriting the fields the preset
    /// pins and switching the scenario to auto.
    pub fn apply(self, config: &mut SimulationConfig) {
        config.scenario = Scenario::Auto;
        match self {
            Self::SecureShort => {
                config.distance = 5.0;
                config.noise = 0.02;
                config.eve_attack = EveAttack::None;
                config.num_qubits = 16;
            }
            Self::NoisyChannel => {
                config.distance = 25.0;
                config.noise = 0.15;
                config.eve_attack = EveAttack::None;
                config.num_qubits = 16;
            }
            Self::EveAttack => {
                config.distance = 10.0;
                config.noise = 0.05;
                config.eve_attack = EveAttack::InterceptResend;
                config.num_qubits = 16;
            }
            Self::HighRate => {
                config.distance = 5.0;
                config.noise = 0.02;
                config.eve_attack = EveAttack::None;
                config.num_qubits = 32;
                config.photon_rate = 500;
            }
        }
    }
}
