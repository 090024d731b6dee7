// SPDX-License-Identifier: GPL-3.0-only

//! Galaxy Keyboard replay harness
//!
//! Runs a timed touch script against the keyboard core without a host UI and
//! prints the resulting document, shift state and language.
//!
//! ```text
//! galaxy-keyboard-replay script.json
//! galaxy-keyboard-replay < script.json
//! ```

use std::io::Read;
use std::process::ExitCode;

use galaxy_keyboard::replay::{parse_script, replay};
use tracing_subscriber::filter::Directive;

fn main() -> ExitCode {
    // Initialize tracing for logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "galaxy_keyboard=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<String, Box<dyn std::error::Error>> {
    let json = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| format!("cannot read script '{}': {}", path, err))?,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json)?;
            json
        }
    };

    let script = parse_script(&json)?;
    tracing::info!("Replaying {} events", script.events.len());

    let outcome = replay(&script)?;
    Ok(outcome.to_string())
}
