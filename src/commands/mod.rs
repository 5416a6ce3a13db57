//! CLI command implementations
//!
//! Scanning commands run against an open [`DynSession`](crate::programmers::DynSession);
//! `decode` works on a saved table and needs no adapter.

mod decode;
mod list;
mod report;
mod scan;

pub use decode::run_decode;
pub use list::{list_devices, list_programmers};
pub use report::{format_hex_dump, print_report};
pub use scan::{run_rcd, run_spd};
