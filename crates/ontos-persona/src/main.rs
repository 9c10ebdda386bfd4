//! Ontos Persona Binary
//!
//! Reads one JSON request per line from stdin and writes one JSON response per
//! line to stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ontos_persona::{PersonaConfig, PersonaService, PERSONA_VERSION};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Ontos Persona v{}", PERSONA_VERSION);

    // Load configuration
    let config = PersonaConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let service = PersonaService::new(config)?;
    info!(
        "Persona service ready, state directory: {}",
        service.config().export.directory.display()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut handled = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = service.handle_line(&line);
        if let Some(error) = &response.error {
            warn!(kind = error.kind, "Request failed: {}", error.message);
        }
        serde_json::to_writer(&mut stdout, &response)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
        handled += 1;
    }

    info!(handled, personas = service.len(), "Input closed, shutting down");
    Ok(())
}
