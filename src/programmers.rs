//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion, and opens the selected one as an I2C session.

use spdread_core::i2c::{Session, Transport};
#[allow(unused_imports)]
use spdread_core::mpsse::ClockConfig;

use crate::error::CliError;

/// Session over whichever adapter was selected at run time
pub type DynSession = Session<Box<dyn Transport>>;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "Emulated DDR4 RDIMM for testing (slot=<0-7>)",
    });

    #[cfg(feature = "ftdi")]
    programmers.push(ProgrammerInfo {
        name: "ftdi",
        aliases: &["ft2232_i2c", "mpsse"],
        description: "FTDI MPSSE adapter (type=<dev>,port=<A-D>,divisor=<N>,gpio=<0-15>,timeout=<ms>)",
    });

    programmers
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Resolve a name or alias to the programmer's primary name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Split "name:key=value,key=value" into the name and its options
pub fn parse_programmer_string(s: &str) -> Result<(&str, Vec<(&str, &str)>), CliError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut options = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            let (key, value) = opt
                .split_once('=')
                .ok_or_else(|| CliError::InvalidParameter(opt.to_string()))?;
            options.push((key.trim(), value.trim()));
        }
    }

    Ok((name, options))
}

/// Open the programmer and start an I2C session on it
#[allow(unused_variables)]
pub fn open_session(programmer: &str) -> Result<DynSession, Box<dyn std::error::Error>> {
    let (name, options) = parse_programmer_string(programmer)?;

    match find_programmer(name) {
        #[cfg(feature = "dummy")]
        Some("dummy") => {
            let slot = options
                .iter()
                .find(|(k, _)| *k == "slot")
                .map(|(_, v)| v.parse::<u8>())
                .transpose()?
                .unwrap_or(0);
            if slot >= spdread_core::device::MAX_SLOTS {
                return Err(spdread_core::Error::InvalidSlot(slot).into());
            }
            log::info!("Using emulated DDR4 RDIMM in slot {}", slot);
            let dimm = spdread_dummy::DummyDimm::ddr4_rdimm(slot);
            Ok(Session::new(
                Box::new(dimm) as Box<dyn Transport>,
                ClockConfig::default(),
            )?)
        }
        #[cfg(feature = "ftdi")]
        Some("ftdi") => {
            let config = spdread_ftdi::parse_options(&options)?;
            let clock = ClockConfig::new(config.divisor)?;
            let ftdi = spdread_ftdi::Ftdi::open(&config)?;
            Ok(Session::with_gpio(
                Box::new(ftdi) as Box<dyn Transport>,
                clock,
                config.gpio,
            )?)
        }
        _ => Err(CliError::UnknownProgrammer(name.to_string(), programmer_names_short()).into()),
    }
}
