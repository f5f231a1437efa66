//! The `typetrace` binary: parse arguments, run one resolution, render.
//!
//! All resolution logic lives in the engine; this front end only wires the
//! in-process structural oracle to it and formats the outcome. Logging goes
//! to stderr so piped JSON output stays clean.

// Terminal output is this binary's job.
#![allow(clippy::print_stderr)]

mod args;
mod render;

use clap::Parser;
use typetrace_engine::{EngineError, ResolveOptions, ResolveRequest, resolve_with_options};
use typetrace_oracle::StructuralOracle;

use args::{CliArgs, Format};

fn main() {
    let cli = CliArgs::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &CliArgs) -> anyhow::Result<()> {
    let request = ResolveRequest {
        type_expression_text: cli.expr.clone(),
        auxiliary_declarations_text: cli.declarations()?,
    };
    let mut options = ResolveOptions::default();
    if let Some(max_steps) = cli.max_steps {
        options.max_steps = max_steps;
    }

    let oracle = StructuralOracle::new();
    tracing::debug!(expression = %request.type_expression_text, "resolving");
    match resolve_with_options(&request, &oracle, &options) {
        Ok(result) => {
            tracing::debug!(
                steps = result.steps.len(),
                final_type = %result.final_type_text,
                "resolution finished"
            );
            match cli.format {
                Format::Text => print!("{}", render::render_text(&result)),
                Format::Json => println!("{}", render::render_json(&result)?),
            }
            Ok(())
        }
        Err(EngineError::Resolution(err)) => {
            // Show whatever trace was collected before the failure.
            if cli.format == Format::Text && !err.partial_steps.is_empty() {
                eprint!("{}", render::render_partial(&err.partial_steps));
            }
            Err(anyhow::Error::new(err))
        }
        Err(err) => Err(anyhow::Error::new(err)),
    }
}

/// Initialise stderr logging. `-v` forces debug level; otherwise the
/// subscriber only starts when `TYPETRACE_LOG` or `RUST_LOG` is set.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::builder().parse_lossy("debug")
    } else if let Ok(value) = std::env::var("TYPETRACE_LOG") {
        EnvFilter::builder().parse_lossy(value)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
