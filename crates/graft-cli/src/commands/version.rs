use anyhow::Result;
use std::process::ExitCode;

pub fn show() -> Result<ExitCode> {
    println!("graft {}", env!("CARGO_PKG_VERSION"));
    Ok(ExitCode::SUCCESS)
}
