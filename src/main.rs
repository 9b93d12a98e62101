//! cfp CLI - order tests by conditional failure probability.

use std::fs::File;
use std::io::{stdout, Write};
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cfp::cli::{Cli, Command, GenerateArgs, OrderArgs, OutputFormat};
use cfp::config::Config;
use cfp::core::{Error, Result};
use cfp::history::FailureLedger;
use cfp::loader::{write_history, HistoryLoader};
use cfp::output::Format;
use cfp::report::OrderReport;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    let format = match cli.format {
        Some(OutputFormat::Json) => Format::Json,
        Some(OutputFormat::Markdown) => Format::Markdown,
        Some(OutputFormat::Text) => Format::Text,
        None => Format::from(config.output.format),
    };

    match cli.command {
        Command::Order(args) => run_order(&args, config, format),
        Command::Generate(args) => run_generate(&args, &config),
        Command::Config(args) => {
            if args.default {
                print!("{}", Config::default_toml());
            } else {
                print!("{}", config.to_toml()?);
            }
            Ok(())
        }
    }
}

fn run_order(args: &OrderArgs, mut config: Config, format: Format) -> Result<()> {
    if args.headers {
        config.input.has_headers = true;
    }
    if args.trim {
        config.input.trim = true;
    }
    if let Some(delimiter) = args.delimiter {
        config.input.delimiter = delimiter;
    }
    let show_history = config.output.show_history && !args.no_history;

    let history = HistoryLoader::new(&config.input, &config.tokens).load_path(&args.file)?;
    let report = OrderReport::build(&history, show_history)?;
    format.write_report(&report, &mut stdout())?;
    Ok(())
}

fn run_generate(args: &GenerateArgs, config: &Config) -> Result<()> {
    let executions = args.executions.unwrap_or(config.generate.executions);
    let tests = args.tests.unwrap_or(config.generate.tests);
    let probability = args.probability.unwrap_or(config.generate.probability);

    if executions == 0 {
        return Err(Error::InvalidArgument(
            "at least one execution is required".to_string(),
        ));
    }
    if tests == 0 {
        return Err(Error::InvalidArgument(
            "at least one test is required".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&probability) {
        return Err(Error::InvalidArgument(format!(
            "probability {probability} must be between 0 and 1"
        )));
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ledger = FailureLedger::random(executions, tests, probability, &mut rng)?;
    tracing::info!(
        executions,
        tests,
        probability,
        "generated random test history"
    );

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(stdout()),
    };
    write_history(
        writer,
        ledger.executions(),
        &config.tokens,
        config.input.delimiter,
    )
}
