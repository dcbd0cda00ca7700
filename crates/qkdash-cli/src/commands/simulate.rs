use std::path::Path;

use qkdash_core::{HttpBackend, Orchestrator, SimulationResult};

pub struct SimulateOptions<'a> {
    pub server: &'a str,
    pub preset: Option<&'a str>,
    pub qubits: Option<u32>,
    pub photon_rate: Option<u32>,
    pub distance: Option<f64>,
    pub noise: Option<f64>,
    pub eve: &'a str,
    pub backend: &'a str,
    pub bits: Option<&'a str>,
    pub bases: Option<&'a str>,
    pub api_key: Option<&'a str>,
    pub export_dir: Option<&'a str>,
}

pub fn run(opts: SimulateOptions) {
    let config = super::build_config(
        opts.preset,
        &super::ConfigOverrides {
            qubits: opts.qubits,
            photon_rate: opts.photon_rate,
            distance: opts.distance,
            noise: opts.noise,
            eve: opts.eve,
            backend: opts.backend,
            bits: opts.bits,
            bases: opts.bases,
            api_key: opts.api_key,
        },
    );

    let backend = HttpBackend::new(opts.server.to_string());
    let mut orch = Orchestrator::new();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    rt.block_on(orch.run_simulation(&backend, &config));

    super::print_notifications(&orch);

    let Some(result) = orch.store().latest_simulation() else {
        std::process::exit(1);
    };
    print_result(result);

    if let Some(dir) = opts.export_dir {
        let Some(artifact) = orch.export(&config) else {
            std::process::exit(1);
        };
        match artifact.write_to(Path::new(dir)) {
            Ok(path) => println!("\nExported to {}", path.display()),
            Err(e) => {
                eprintln!("Export failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn print_result(result: &SimulationResult) {
    println!();
    println!("BB84 Simulation");
    println!("  Security:   {}", result.security_indicator());
    println!("  QBER:       {:.2}%", result.qber_percent());
    println!("  Final key:  {}", result.key_length_label());
    println!("  Key rate:   {:.3}", result.key_generation_rate);
    if !result.backend_used.is_empty() {
        println!("  Backend:    {}", result.backend_used);
    }
    if result.errors_corrected > 0 {
        println!("  Corrected:  {} errors", result.errors_corrected);
    }

    println!();
    println!("  #   Alice  Basis  Bob basis  Bob  Match  Key");
    for row in result.qubit_rows() {
        println!(
            "  {:<3} {:<6} {:<6} {:<10} {:<4} {:<6} {}",
            row.index,
            row.alice_bit,
            row.alice_basis,
            row.bob_basis.map(String::from).unwrap_or_else(|| "-".into()),
            row.bob_bit.map(String::from).unwrap_or_else(|| "-".into()),
            if row.basis_match { "yes" } else { "no" },
            if row.in_final_key { "yes" } else { "" },
        );
    }

    if !result.final_key.is_empty() {
        println!();
        println!("  Key: {}", result.final_key);
    }
}
