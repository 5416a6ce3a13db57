//! Man page generator for spdread
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Writes one page for the top-level command and one per subcommand.

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: clap::Command, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    fs::write(path, buffer)?;
    println!("Man page generated at: {}", path.display());
    Ok(())
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    for sub in cmd.get_subcommands() {
        let file = format!("{}-{}.1", name, sub.get_name());
        render(sub.clone(), &output_dir.join(file))?;
    }
    render(cmd, &output_dir.join(format!("{}.1", name)))?;

    println!("\nTo view: man -l {}", output_dir.join(format!("{}.1", name)).display());
    Ok(())
}
