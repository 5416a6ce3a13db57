//! List commands implementation

use crate::programmers::available_programmers;

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();

    for p in available_programmers() {
        let name = if p.aliases.is_empty() {
            p.name.to_string()
        } else {
            format!("{} ({})", p.name, p.aliases.join(", "))
        };
        println!("  {:<28} - {}", name, p.description);
    }
}

/// List connected FTDI adapters
#[cfg(feature = "ftdi")]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let devices = spdread_ftdi::list_devices()?;
    if devices.is_empty() {
        println!("No FTDI adapters found");
        return Ok(());
    }

    println!("Connected FTDI adapters:");
    println!();
    for dev in devices {
        println!("  {}", dev);
    }
    Ok(())
}

/// List connected FTDI adapters
#[cfg(not(feature = "ftdi"))]
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    println!("FTDI support not compiled in");
    Ok(())
}
