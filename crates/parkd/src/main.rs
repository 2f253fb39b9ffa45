// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parkd - parking lot reservation and billing service.
//!
//! This is the binary entry point for the parkd server.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Parkd - parking lot reservation and billing service.
#[derive(Parser, Debug)]
#[command(name = "parkd", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the reservation service.
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match parkd_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parkd_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("parkd serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("parkd: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = parkd_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn default_config_renders_as_toml() {
        let config = parkd_config::ParkdConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[server]"));
        assert!(rendered.contains("[jobs]"));
    }
}
