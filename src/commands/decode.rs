//! Offline decode of a saved table

use std::fs;
use std::path::Path;

use spdread_core::device::{DeviceKind, RawByteTable};

use crate::commands::report::print_report;
use crate::error::CliError;

/// Decode a table previously saved with `--output`
pub fn run_decode(input: &Path, kind: DeviceKind) -> Result<(), Box<dyn std::error::Error>> {
    let table = load_table(input, kind)?;
    print_report(&table, false)?;
    Ok(())
}

/// Read a raw table from `input`
///
/// Longer files (such as a full 512-byte DDR4 EEPROM image) are truncated to
/// the table length.
pub fn load_table(input: &Path, kind: DeviceKind) -> Result<RawByteTable, Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    log::info!("Read {} bytes from {}", data.len(), input.display());

    if data.len() > kind.table_len() {
        log::debug!("Ignoring {} trailing bytes", data.len() - kind.table_len());
    }

    RawByteTable::from_bytes(kind, &data).ok_or_else(|| {
        CliError::TableTooShort {
            expected: kind.table_len(),
            got: data.len(),
        }
        .into()
    })
}
