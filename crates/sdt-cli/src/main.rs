//! # sdt CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

use sdt_cli::output::{OutputFormat, Printer};

/// Structured Data Templates.
///
/// Validates template documents against their schemas, generates
/// example inputs, and renders templates with params.
#[derive(Parser, Debug)]
#[command(name = "sdt", version, about)]
#[command(
    after_help = "Examples:\n  sdt validate doc.yaml\n  sdt render doc.yaml <params.yaml\n  sdt render doc.yaml name: Alice, count: 3"
)]
struct Cli {
    /// Output format for results and machine-readable diagnostics.
    #[arg(
        short = 'o',
        long = "output",
        global = true,
        value_enum,
        default_value = "default"
    )]
    output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a structured data template.
    Validate(sdt_cli::validate::ValidateArgs),
    /// Generate an example input for a template.
    Example(sdt_cli::example::ExampleArgs),
    /// Render a structured data template with the given params.
    Render(sdt_cli::render::RenderArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let printer = Printer::new(cli.output, cli.verbose);

    match cli.command {
        Commands::Validate(args) => sdt_cli::validate::run(args, &printer),
        Commands::Example(args) => sdt_cli::example::run(args, &printer),
        Commands::Render(args) => sdt_cli::render::run(args, &printer),
    }
}
