//! spdread - DIMM SPD EEPROM and RCD reader
//!
//! Reads the serial presence detect EEPROM and the registering clock driver
//! of DDR4 modules through an FTDI MPSSE adapter driving the SMBus pins of a
//! DIMM socket, and decodes the JEDEC fields.
//!
//! Every programmer is opened as a [`Session`](spdread_core::i2c::Session)
//! over a boxed [`Transport`](spdread_core::i2c::Transport), so the same
//! commands run against real hardware and the `dummy` emulator.

mod cli;
mod commands;
mod error;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Spd { scan } => {
            let mut session = programmers::open_session(&scan.programmer)?;
            commands::run_spd(&mut session, &scan)
        }
        Commands::Rcd { scan, init } => {
            let mut session = programmers::open_session(&scan.programmer)?;
            commands::run_rcd(&mut session, &scan, init)
        }
        Commands::Decode { input, kind } => commands::run_decode(&input, kind.into()),
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::ListDevices => commands::list_devices(),
    }
}
