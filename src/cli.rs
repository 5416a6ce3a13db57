//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use spdread_core::device::{DeviceKind, MAX_SLOTS};
use std::path::PathBuf;

const PROGRAMMER_HELP: &str = "Programmer to use, e.g. 'ftdi:type=232h,divisor=0x12B' or 'dummy'";

/// Parse a DIMM slot number
fn parse_slot(s: &str) -> Result<u8, String> {
    let slot: u8 = s.parse().map_err(|e| format!("Invalid slot: {}", e))?;
    if slot >= MAX_SLOTS {
        return Err(format!("Slot {} out of range (0-{})", slot, MAX_SLOTS - 1));
    }
    Ok(slot)
}

#[derive(Parser)]
#[command(name = "spdread")]
#[command(author, version, about = "DIMM SPD EEPROM and RCD reader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that scan a device
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Programmer to use
    #[arg(short, long, help = PROGRAMMER_HELP)]
    pub programmer: String,

    /// DIMM slot (0-7), added to the device's base address
    #[arg(short, long, default_value = "0", value_parser = parse_slot)]
    pub slot: u8,

    /// Save the raw table to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep scanning after a failed read, filling the cell with 0xFF
    #[arg(long)]
    pub continue_on_error: bool,

    /// Only print the raw table
    #[arg(long)]
    pub raw: bool,
}

/// Kind of table stored in a file
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// SPD EEPROM contents
    Spd,
    /// RCD status and register bytes
    Rcd,
}

impl From<TableKind> for DeviceKind {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Spd => DeviceKind::SpdEeprom,
            TableKind::Rcd => DeviceKind::Rcd,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and decode the SPD EEPROM
    Spd {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Read the RCD control registers
    Rcd {
        #[command(flatten)]
        scan: ScanArgs,

        /// Write the default bring-up sequence before reading
        #[arg(long)]
        init: bool,
    },

    /// Decode a previously saved table
    Decode {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Kind of table in the file
        #[arg(short, long, value_enum, default_value = "spd")]
        kind: TableKind,
    },

    /// List supported programmers
    ListProgrammers,

    /// List connected FTDI adapters
    ListDevices,
}
