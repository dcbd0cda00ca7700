pub fn run(server: &str, refresh: f64) {
    let mut app = crate::tui::app::App::new(server.to_string(), refresh);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
