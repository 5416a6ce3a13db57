//! Text output for raw tables and decoded fields

use spdread_core::device::{DeviceKind, RawByteTable, RCD_GROUP_LEN};
use spdread_core::spd::{self, Decoded};

/// Bytes shown per line of an SPD dump
const DUMP_WIDTH: usize = 16;

/// Format a table as offset-prefixed hex lines
///
/// SPD tables are shown 16 bytes per line, RCD tables one register group
/// (status byte followed by four registers) per line.
pub fn format_hex_dump(table: &RawByteTable) -> String {
    let width = match table.kind() {
        DeviceKind::SpdEeprom => DUMP_WIDTH,
        DeviceKind::Rcd => RCD_GROUP_LEN,
    };

    let mut out = String::new();
    for (line, chunk) in table.as_bytes().chunks(width).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        out.push_str(&format!("{:04X}: {}\n", line * width, hex.join(" ")));
    }
    out
}

/// Print the raw dump and, unless `raw_only`, the decoded fields
pub fn print_report(table: &RawByteTable, raw_only: bool) -> spdread_core::Result<()> {
    println!("{} contents:", table.kind().name());
    print!("{}", format_hex_dump(table));

    if raw_only {
        return Ok(());
    }

    let decoded = spd::decode(table)?;
    if let Decoded::Spd(info) = &decoded {
        if !info.crc.is_valid() {
            println!();
            println!("Warning: SPD checksum mismatch, contents may be corrupt");
        }
    }

    println!();
    let fields = decoded.fields();
    let name_width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in fields.iter() {
        println!("  {:<width$}  {}", name, value, width = name_width);
    }

    Ok(())
}
