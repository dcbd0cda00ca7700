//! CLI for qkdash — a BB84 QKD dashboard in your terminal.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qkdash")]
#[command(about = "qkdash — BB84 quantum key distribution dashboard")]
#[command(version = qkdash_core::VERSION)]
struct Cli {
    /// Lab backend base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one BB84 simulation and print the key exchange breakdown
    Simulate {
        /// Named parameter bundle: secure_short, noisy_channel, eve_attack, high_rate.
        /// Individual flags below override preset fields.
        #[arg(long)]
        preset: Option<String>,

        /// Number of qubits to exchange
        #[arg(long)]
        qubits: Option<u32>,

        /// Photon emission rate (photons/sec)
        #[arg(long)]
        photon_rate: Option<u32>,

        /// Channel length in km
        #[arg(long)]
        distance: Option<f64>,

        /// Channel noise probability in [0, 1]
        #[arg(long)]
        noise: Option<f64>,

        /// Eavesdropper attack: none or intercept_resend
        #[arg(long, default_value = "none", value_parser = ["none", "intercept_resend"])]
        eve: String,

        /// Simulation backend: classical or real_quantum
        #[arg(long, default_value = "classical", value_parser = ["classical", "real_quantum"])]
        backend: String,

        /// Manual bit string (0/1); switches to the manual scenario
        #[arg(long)]
        bits: Option<String>,

        /// Manual basis string (+/x); requires --bits
        #[arg(long)]
        bases: Option<String>,

        /// API key for the real quantum backend
        #[arg(long)]
        api_key: Option<String>,

        /// Write a timestamped JSON export of the run into this directory
        #[arg(long)]
        export_dir: Option<String>,
    },

    /// Probe quantum hardware characteristics and print the device rating
    Testbed {
        /// Photon emission rate for the probe
        #[arg(long, default_value = "100")]
        photon_rate: u32,

        /// API key for real hardware access
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Mint a mobile pairing session and print the QR payload
    Pair,

    /// Live interactive dashboard (TUI)
    Monitor {
        /// Refresh rate in seconds
        #[arg(long, default_value = "1.0")]
        refresh: f64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            preset,
            qubits,
            photon_rate,
            distance,
            noise,
            eve,
            backend,
            bits,
            bases,
            api_key,
            export_dir,
        } => commands::simulate::run(commands::simulate::SimulateOptions {
            server: &cli.server,
            preset: preset.as_deref(),
            qubits,
            photon_rate,
            distance,
            noise,
            eve: &eve,
            backend: &backend,
            bits: bits.as_deref(),
            bases: bases.as_deref(),
            api_key: api_key.as_deref(),
            export_dir: export_dir.as_deref(),
        }),
        Commands::Testbed {
            photon_rate,
            api_key,
        } => commands::testbed::run(&cli.server, photon_rate, api_key.as_deref()),
        Commands::Pair => commands::pair::run(&cli.server),
        Commands::Monitor { refresh } => commands::monitor::run(&cli.server, refresh),
    }
}
