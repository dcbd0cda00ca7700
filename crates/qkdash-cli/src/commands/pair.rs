use qkdash_core::{Backend, ClientError, HttpBackend, PairingInfo};

pub fn run(server: &str) {
    let backend = HttpBackend::new(server.to_string());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    match rt.block_on(backend.connect_mobile()) {
        Ok(info) => print_pairing(&info),
        Err(ClientError::Backend(msg)) => {
            eprintln!("Pairing refused: {msg}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Pairing failed: {e}");
            std::process::exit(1);
        }
    }
}

fn print_pairing(info: &PairingInfo) {
    println!("Mobile pairing session");
    println!("  Token:    {}", info.session_token);
    println!("  QR data:  {}", info.qr_data);
    if let Some(ip) = &info.local_ip {
        println!("  Local IP: {ip}");
    }
    if let Some(secs) = info.expires_in {
        println!("  Expires:  in {secs}s");
    }
    println!();
    println!("Scan the QR payload with the mobile app while on the same network.");
}
