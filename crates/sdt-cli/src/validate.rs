//! # Validate Subcommand

use clap::Args;

use crate::load_document;
use crate::output::Printer;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the template document.
    pub file: String,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> anyhow::Result<()> {
    load_document(&args.file, printer)?;
    println!("✅ Document is valid!");
    Ok(())
}
