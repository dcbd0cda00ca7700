pub mod monitor;
pub mod pair;
pub mod simulate;
pub mod testbed;

use qkdash_core::{BackendType, EveAttack, Preset, Scenario, SimulationConfig};

/// Parse an eve attack flag into the enum.
pub fn parse_eve(s: &str) -> EveAttack {
    match s {
        "intercept_resend" => EveAttack::InterceptResend,
        _ => EveAttack::None,
    }
}

/// Parse a backend flag into the enum.
pub fn parse_backend(s: &str) -> BackendType {
    match s {
        "real_quantum" => BackendType::RealQuantum,
        _ => BackendType::Classical,
    }
}

/// Resolve a preset name, exiting with the list of valid names on a typo.
pub fn resolve_preset(name: &str) -> Preset {
    match Preset::from_name(name) {
        Some(preset) => preset,
        None => {
            let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
            eprintln!("Unknown preset '{}'. Valid presets: {}", name, names.join(", "));
            std::process::exit(1);
        }
    }
}

/// Arguments every simulate invocation can override on top of a preset.
pub struct ConfigOverrides<'a> {
    pub qubits: Option<u32>,
    pub photon_rate: Option<u32>,
    pub distance: Option<f64>,
    pub noise: Option<f64>,
    pub eve: &'a str,
    pub backend: &'a str,
    pub bits: Option<&'a str>,
    pub bases: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

/// Build a simulation config: defaults, then preset, then explicit flags.
pub fn build_config(preset: Option<&str>, overrides: &ConfigOverrides) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    if let Some(name) = preset {
        resolve_preset(name).apply(&mut config);
    }
    if let Some(qubits) = overrides.qubits {
        config.num_qubits = qubits;
    }
    if let Some(rate) = overrides.photon_rate {
        config.photon_rate = rate;
    }
    if let Some(distance) = overrides.distance {
        config.distance = distance;
    }
    if let Some(noise) = overrides.noise {
        config.noise = noise;
    }
    if overrides.eve != "none" {
        config.eve_attack = parse_eve(overrides.eve);
    }
    if overrides.backend != "classical" {
        config.backend_type = parse_backend(overrides.backend);
    }
    if let Some(bits) = overrides.bits {
        config.scenario = Scenario::Manual;
        config.bits = Some(bits.to_string());
        config.bases = overrides.bases.map(str::to_string);
    }
    config.api_key = overrides.api_key.map(str::to_string);
    config
}

/// Print queued notifications to stderr, newest last, then clear nothing —
/// one-shot commands drop the orchestrator right after.
pub fn print_notifications(orch: &qkdash_core::Orchestrator) {
    let mut notes: Vec<_> = orch.presenter().notifications().collect();
    notes.reverse();
    for note in notes {
        eprintln!("[{}] {}", note.severity.label(), note.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> ConfigOverrides<'static> {
        ConfigOverrides {
            qubits: None,
            photon_rate: None,
            distance: None,
            noise: None,
            eve: "none",
            backend: "classical",
            bits: None,
            bases: None,
            api_key: None,
        }
    }

    #[test]
    fn defaults_without_preset_or_flags() {
        let c = build_config(None, &no_overrides());
        assert_eq!(c, SimulationConfig::default());
    }

    #[test]
    fn preset_applies_then_flags_override() {
        let mut overrides = no_overrides();
        overrides.qubits = Some(64);
        let c = build_config(Some("secure_short"), &overrides);
        assert_eq!(c.distance, 5.0);
        assert_eq!(c.noise, 0.02);
        assert_eq!(c.num_qubits, 64, "explicit flag wins over preset");
    }

    #[test]
    fn manual_bits_switch_scenario() {
        let mut overrides = no_overrides();
        overrides.bits = Some("0110");
        overrides.bases = Some("+x+x");
        let c = build_config(None, &overrides);
        assert_eq!(c.scenario, Scenario::Manual);
        assert_eq!(c.bits.as_deref(), Some("0110"));
        assert_eq!(c.bases.as_deref(), Some("+x+x"));
    }

    #[test]
    fn eve_and_backend_flags_parse() {
        assert_eq!(parse_eve("intercept_resend"), EveAttack::InterceptResend);
        assert_eq!(parse_eve("none"), EveAttack::None);
        assert_eq!(parse_backend("real_quantum"), BackendType::RealQuantum);
        assert_eq!(parse_backend("classical"), BackendType::Classical);
    }
}
