//! # Example Subcommand
//!
//! Prints a representative input for a document, synthesized from its
//! input schema. Useful as a starting point for a params file.

use clap::Args;
use sdt_core::Value;

use crate::load_document;
use crate::output::Printer;

/// Arguments for the example subcommand.
#[derive(Args, Debug)]
pub struct ExampleArgs {
    /// Path to the template document.
    pub file: String,
}

pub fn run(args: ExampleArgs, printer: &Printer) -> anyhow::Result<()> {
    let doc = load_document(&args.file, printer)?;
    match doc.example() {
        Err(e) => printer.fail("❌ Error generating example:", &e),
        Ok(None) => printer.result(&Value::Null),
        Ok(Some(example)) => printer.result(&example),
    }
}
