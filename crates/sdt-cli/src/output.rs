//! # Output Formatting
//!
//! Result printing across the supported formats, terminal colour
//! (suppressed by `NO_COLOR` or a redirected stdout), and diagnostic
//! reporting. In machine formats (`-o json|yaml|shorthand`) diagnostics
//! are emitted as data records — warnings before errors — instead of
//! human-readable text.

use std::fmt;
use std::io::IsTerminal;

use clap::ValueEnum;
use owo_colors::OwoColorize;
use sdt_core::{Diagnostic, Value};

use crate::shorthand;

/// Output format selected with `-o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human output: pretty JSON results, colourised diagnostics.
    Default,
    Json,
    Yaml,
    Shorthand,
}

/// Shared printing state for all subcommands.
pub struct Printer {
    format: OutputFormat,
    verbose: bool,
    color: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Printer {
            format,
            verbose,
            color,
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Whether a machine format was requested.
    fn machine(&self) -> bool {
        self.format != OutputFormat::Default
    }

    /// Print a rendered value to stdout in the selected format.
    pub fn result(&self, value: &Value) -> anyhow::Result<()> {
        let text = match self.format {
            OutputFormat::Default | OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_owned(),
            OutputFormat::Shorthand => shorthand::render(value),
        };
        println!("{text}");
        Ok(())
    }

    pub fn print_warnings(&self, warnings: &[Diagnostic]) {
        for warning in warnings {
            eprintln!("{} {warning}", self.paint_yellow("warning:"));
        }
    }

    /// Print a diagnostic group. Machine formats emit the records as
    /// data, warnings preceding errors; the default format prints
    /// warnings, then the heading, then each error with its excerpt.
    pub fn report(
        &self,
        warnings: &[Diagnostic],
        errors: &[Diagnostic],
        heading: &str,
    ) -> anyhow::Result<()> {
        if self.machine() {
            let combined: Vec<&Diagnostic> = warnings.iter().chain(errors).collect();
            let value = Value::from_json(serde_json::to_value(&combined)?);
            return self.result(&value);
        }

        self.print_warnings(warnings);
        if !errors.is_empty() {
            eprintln!("{}", self.paint_red(heading));
            for (i, error) in errors.iter().enumerate() {
                eprintln!("{error}");
                if i + 1 < errors.len() {
                    eprintln!();
                }
            }
        }
        Ok(())
    }

    /// Print a fatal error and exit with code 1.
    pub fn fail(&self, heading: &str, err: &dyn fmt::Display) -> ! {
        if self.machine() {
            let record = serde_json::json!([{"message": err.to_string()}]);
            // A result-print failure here has nowhere better to go.
            let _ = self.result(&Value::from_json(record));
        } else {
            eprintln!("{} {err}", self.paint_red(heading));
        }
        std::process::exit(1);
    }

    fn paint_red(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    fn paint_yellow(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_owned()
        }
    }
}
