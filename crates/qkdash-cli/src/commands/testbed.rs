use qkdash_core::{HttpBackend, Orchestrator, SimulationConfig, TestbedResult};

pub fn run(server: &str, photon_rate: u32, api_key: Option<&str>) {
    let config = SimulationConfig {
        photon_rate,
        api_key: api_key.map(str::to_string),
        ..Default::default()
    };

    let backend = HttpBackend::new(server.to_string());
    let mut orch = Orchestrator::new();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    rt.block_on(orch.run_testbed(&backend, &config));

    super::print_notifications(&orch);

    let Some(result) = orch.store().latest_testbed() else {
        std::process::exit(1);
    };
    print_result(result);
}

fn print_result(result: &TestbedResult) {
    let m = &result.metrics;
    println!();
    println!("Quantum Testbed Probe");
    println!("  Device:      {}", result.device_info.backend);
    println!(
        "  Connected:   {}",
        if result.device_info.connected { "yes" } else { "no (simulated)" }
    );
    if let Some(qubits) = result.device_info.num_qubits {
        println!("  Qubits:      {qubits}");
    }
    println!();
    println!("  QBER:        {:.2}%", m.qber * 100.0);
    println!("  Key rate:    {:.1} bits/s", m.secure_key_rate);
    println!("  Detection:   {:.1}%", m.detection_efficiency * 100.0);
    println!("  Dark counts: {:.0} /s", m.dark_count_rate);
    println!("  Fidelity:    {:.3}", m.fidelity);
    println!();
    println!(
        "  Rating:      {} ({}/100)",
        result.analysis.rating.label(),
        result.analysis.suitability_score
    );
    if !result.analysis.recommendation.is_empty() {
        println!("  Verdict:     {}", result.analysis.recommendation);
    }
}
