//! Reading SPD and RCD tables from a DIMM slot

use std::fs;

use indicatif::{ProgressBar, ProgressStyle};
use spdread_core::device::{
    initialize_rcd, scan_with, DeviceKind, DeviceProfile, ErrorPolicy, RawByteTable,
    RCD_DEFAULT_INIT,
};
use spdread_core::i2c::{Session, Transport};

use crate::cli::ScanArgs;
use crate::commands::report::print_report;
use crate::error::CliError;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Read and report the SPD EEPROM in `args.slot`
pub fn run_spd<T: Transport>(session: &mut Session<T>, args: &ScanArgs) -> CmdResult {
    let table = read_table(session, DeviceKind::SpdEeprom, args)?;
    print_report(&table, args.raw)?;
    Ok(())
}

/// Read and report the RCD in `args.slot`, optionally initialising it first
pub fn run_rcd<T: Transport>(session: &mut Session<T>, args: &ScanArgs, init: bool) -> CmdResult {
    if init {
        let profile = DeviceProfile::for_slot(DeviceKind::Rcd, args.slot)?;
        log::info!(
            "Writing {} RCD init registers at 0x{:02X}",
            RCD_DEFAULT_INIT.len(),
            profile.address
        );
        initialize_rcd(session, profile.address, RCD_DEFAULT_INIT)?;
    }

    let table = read_table(session, DeviceKind::Rcd, args)?;
    print_report(&table, args.raw)?;
    Ok(())
}

fn read_table<T: Transport>(
    session: &mut Session<T>,
    kind: DeviceKind,
    args: &ScanArgs,
) -> Result<RawByteTable, Box<dyn std::error::Error>> {
    let profile = DeviceProfile::for_slot(kind, args.slot)?;
    let policy = if args.continue_on_error {
        ErrorPolicy::Continue
    } else {
        ErrorPolicy::Abort
    };

    let pb = ProgressBar::new(profile.steps() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reads")?
            .progress_chars("#>-"),
    );

    let result = scan_with(session, &profile, policy, |done, _| pb.set_position(done as u64));
    pb.finish_and_clear();
    let outcome = result?;

    if let Some(path) = &args.output {
        fs::write(path, outcome.table.as_bytes())?;
        println!(
            "Saved {} bytes to {}",
            outcome.table.len(),
            path.display()
        );
    }

    if outcome.failures > 0 {
        print_report(&outcome.table, true)?;
        if let Some(e) = outcome.first_error {
            log::error!("First failure: {}", e);
        }
        return Err(CliError::IncompleteScan {
            failures: outcome.failures,
            total: profile.steps(),
        }
        .into());
    }

    Ok(outcome.table)
}
