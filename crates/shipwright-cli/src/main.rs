//! Shipwright CLI - edit rendered Mermaid diagrams

mod cli;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();

    // logging is initialized inside run(), once flags are known
    let mut app = cli::ShipwrightApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
