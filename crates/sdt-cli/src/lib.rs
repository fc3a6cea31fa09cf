//! # sdt-cli — Command-Line Front-End
//!
//! One module per subcommand, each owning its clap `Args` struct and a
//! `run` function. Shared concerns live in [`output`] (formatting,
//! colour, diagnostic printing) and [`shorthand`] (the compact object
//! renderer behind `-o shorthand`).

use anyhow::Context as _;
use sdt_core::Document;

pub mod example;
pub mod output;
pub mod render;
pub mod shorthand;
pub mod validate;

use output::Printer;

/// Load a document and statically validate its template. Exits with
/// code 1 (after printing warnings and errors) when the template does
/// not check out; warnings alone are printed and tolerated.
pub fn load_document(path: &str, printer: &Printer) -> anyhow::Result<Document> {
    let doc = match Document::from_file(path) {
        Ok(doc) => doc,
        Err(e) => printer.fail(&format!("❌ Unable to load {path}:"), &e),
    };

    let (warnings, errors) = doc.validate_template();
    if !errors.is_empty() {
        printer
            .report(&warnings, &errors, "❌ Error while validating template:")
            .context("printing diagnostics")?;
        std::process::exit(1);
    }
    printer.print_warnings(&warnings);

    Ok(doc)
}
