//! Latchkey CLI
//!
//! Runs the two-node lock against a terminal keypad and display, and prints
//! the wire vocabulary.

mod config;
mod simulate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use latchkey_core::constants::SERIAL_BAUD_RATE;
use latchkey_protocol::Opcode;

use crate::config::SimulatorConfig;

#[derive(Parser)]
#[command(name = "latchkey")]
#[command(about = "Two-node keypad door lock simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the frontend and authority nodes in this terminal
    Simulate {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// EEPROM image to load at start and save on exit
        #[arg(short, long)]
        eeprom: Option<PathBuf>,

        /// Give up on a silent authority after this many milliseconds
        #[arg(long)]
        receive_timeout_ms: Option<u64>,
    },

    /// Print the opcode table
    Opcodes,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the LCD
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            eeprom,
            receive_timeout_ms,
        } => {
            let mut settings = match config {
                Some(path) => SimulatorConfig::load(&path)?,
                None => SimulatorConfig::default(),
            };
            if let Some(path) = eeprom {
                settings = settings.with_eeprom_path(path);
            }
            if let Some(ms) = receive_timeout_ms {
                settings = settings.with_receive_timeout_ms(ms);
            }
            simulate::run(settings).await
        }
        Commands::Opcodes => {
            print_opcodes();
            Ok(())
        }
    }
}

fn print_opcodes() {
    print!("{}", opcode_table());
}

fn opcode_table() -> String {
    let mut table = format!("{:<20} {:<6} ROLE\n", "OPCODE", "VALUE");
    for opcode in Opcode::ALL {
        let role = if opcode.is_command() {
            "command"
        } else if opcode.opens_transfer() {
            "transfer context"
        } else {
            "reply/notice"
        };
        table.push_str(&format!(
            "{:<20} 0x{:02X}   {}\n",
            opcode.name(),
            opcode.to_u8(),
            role
        ));
    }
    table.push_str(&format!("\nSerial line: {SERIAL_BAUD_RATE} baud, 8N1\n"));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table() {
        let table = opcode_table();

        assert!(table.contains("0xE0"));
        assert!(table.contains("0x23"));
        assert_eq!(table.lines().filter(|l| l.contains("command")).count(), 5);
        assert!(table.ends_with("Serial line: 2400 baud, 8N1\n"));
    }
}
