//! # Render Subcommand
//!
//! Renders a document with params gathered from two sources: a YAML or
//! JSON params document piped on stdin, and trailing `key: value`
//! tokens which are combined into a YAML flow mapping. Inline tokens
//! override stdin keys.

use std::io::{IsTerminal, Read};

use anyhow::{bail, Context};
use clap::Args;
use sdt_core::{Params, Value};

use crate::load_document;
use crate::output::Printer;

/// Arguments for the render subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Path to the template document.
    pub file: String,

    /// Inline params as `key: value` pairs, e.g. `name: Alice, n: 3`.
    #[arg(trailing_var_arg = true)]
    pub params: Vec<String>,
}

pub fn run(args: RenderArgs, printer: &Printer) -> anyhow::Result<()> {
    let doc = load_document(&args.file, printer)?;

    let mut params = gather_params(&args.params)?;
    if printer.verbose() {
        eprintln!("input: {}", serde_json::to_string(&params)?);
    }

    if let Err(e) = doc.validate_input(&mut params) {
        printer.fail("❌ Error while validating input params:", &e);
    }

    let (rendered, errors) = doc.render(&params);
    if !errors.is_empty() {
        printer.report(&[], &errors, "❌ Error while rendering template:")?;
        std::process::exit(1);
    }

    // Confirm the rendered output conforms to the output schema.
    if let Err(e) = doc.validate_output(&rendered) {
        if printer.verbose() {
            eprintln!("rendered result: {}", serde_json::to_string(&rendered)?);
        }
        printer.fail("❌ Error validating rendered output:", &e);
    }

    printer.result(&rendered)
}

fn gather_params(tokens: &[String]) -> anyhow::Result<Params> {
    let mut params = Params::new();

    if !std::io::stdin().is_terminal() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        if !text.trim().is_empty() {
            merge(&mut params, &text).context("invalid params document on stdin")?;
        }
    }

    if !tokens.is_empty() {
        let flow = format!("{{{}}}", tokens.join(" "));
        merge(&mut params, &flow).with_context(|| format!("invalid inline params: {flow}"))?;
    }

    Ok(params)
}

fn merge(params: &mut Params, text: &str) -> anyhow::Result<()> {
    let parsed: Value = serde_yaml::from_str(text)?;
    let Value::Object(object) = parsed else {
        bail!("params must form a mapping, got {}", parsed.json_type());
    };
    params.extend(object);
    Ok(())
}
