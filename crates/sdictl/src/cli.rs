//! Command line definition.

use clap::{Parser, Subcommand};
use sdi_types::{EntityType, ResetType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sdictl")]
#[command(author, version, about = "Query and control chassis hardware through the SDI")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Platform description (YAML, or JSON with a .json extension)
    #[arg(short = 'p', long, default_value = "/usr/share/sonic/platform/sdi.yaml")]
    pub platform: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    pub log_level: String,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List entities with their state and resources
    Entities,

    /// Entity control
    #[command(subcommand)]
    Entity(EntityCommands),

    /// Pluggable media
    #[command(subcommand)]
    Media(MediaCommands),
}

#[derive(Subcommand, Debug)]
pub enum EntityCommands {
    /// Show presence, fault and power status
    Status {
        entity_type: EntityType,
        instance: u32,
    },
    /// Reset an entity
    Reset {
        entity_type: EntityType,
        instance: u32,
        /// warm or cold
        #[arg(long, default_value = "cold")]
        kind: ResetType,
    },
    /// Apply platform defaults to one entity, or to all without arguments
    Init {
        entity_type: Option<EntityType>,
        instance: Option<u32>,
    },
    /// Switch PSU output power
    Power {
        entity_type: EntityType,
        instance: u32,
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Decode identification, inventory and diagnostics
    Show { alias: String },
    /// Hex dump of EEPROM bytes
    Read {
        alias: String,
        #[arg(long, default_value = "0", value_parser = parse_number)]
        offset: u32,
        #[arg(long, default_value = "128", value_parser = parse_number)]
        len: u32,
    },
    /// Write EEPROM bytes given as hex, e.g. "7f 00"
    Write {
        alias: String,
        #[arg(long, value_parser = parse_number)]
        offset: u32,
        bytes: String,
    },
}

fn parse_on_off(s: &str) -> Result<bool, String> {
    match s {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(format!("expected on or off, got {:?}", s)),
    }
}

/// Decimal or 0x-prefixed hexadecimal.
pub fn parse_number(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{:?}: {}", s, e))
}

/// Whitespace-separated hex bytes.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    s.split_whitespace()
        .map(|tok| {
            let tok = tok.strip_prefix("0x").unwrap_or(tok);
            u8::from_str_radix(tok, 16).map_err(|e| format!("{:?}: {}", tok, e))
        })
        .collect()
}
