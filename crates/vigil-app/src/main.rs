//! Vigil binary - composition root.
//!
//! Ties the crates together into an interactive assistant:
//! 1. Load configuration from TOML and overlay env secrets
//! 2. Select the language backend
//! 3. Connect the monitoring provider
//! 4. Run the chat loop on stdin/stdout

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use vigil_chat::{ChatEngine, ChatError};
use vigil_core::config::VigilConfig;
use vigil_monitor::{HealthDataProvider, HttpHealthProvider, ProviderError};

/// Resolve the config file path: `VIGIL_CONFIG` env var, else
/// `~/.vigil/config.toml`.
fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("VIGIL_CONFIG") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".vigil").join("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Vigil v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = VigilConfig::load_or_default(&config_file).apply_env_overrides();

    // Language backend.
    let backend = vigil_llm::from_config(&config.llm);

    // Monitoring provider.
    let provider: Arc<dyn HealthDataProvider> = match HttpHealthProvider::new(&config.monitor) {
        Ok(provider) => Arc::new(provider),
        Err(ProviderError::NotConfigured) => {
            eprintln!(
                "Monitoring backend is not configured. Set monitor.base_url and \
                 monitor.api_token in {} (or the VIGIL_API_TOKEN env var).",
                config_file.display()
            );
            std::process::exit(1);
        }
        Err(e) => return Err(Box::new(e) as Box<dyn std::error::Error>),
    };

    let engine = ChatEngine::new(backend, provider, &config.llm, config.chat.clone());
    let mut session = engine.new_session();

    println!("Vigil monitoring assistant. Ask about your services in plain language.");
    println!("Type 'help' for examples, 'clear history' to reset, 'quit' to exit.\n");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match engine.handle_message(&mut session, line).await {
            Ok(reply) => println!("\n{reply}\n"),
            Err(ChatError::EmptyMessage) => continue,
            Err(e) => println!("\n{e}\n"),
        }
    }

    println!("Goodbye.");
    Ok(())
}
