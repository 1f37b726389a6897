use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod progress;

use commands::{OutputArgs, PollArgs, QueryArgs, ServiceArgs};
use config::Config;
use error::{print_error_and_exit, CliError};
use qblast_core::OutputFormat;

#[derive(Parser)]
#[command(name = "qblast")]
#[command(about = "Run sequence searches on the NCBI BLAST service")]
#[command(version)]
#[command(long_about = "
qblast submits a query to the remote BLAST service, waits for the search to
finish and saves the result next to a short preview or a table of matches.

Examples:
  qblast run ATGCGTACGTTAGCTAGCTAGCTAG
  qblast run --query-file query.fa --format xml --max-hits 10
  qblast submit --query-file query.fa
  qblast status 8ZXYB3ST013
  qblast fetch 8ZXYB3ST013 --format xml --json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a query, wait for it and save the results
    Run {
        #[command(flatten)]
        query: QueryArgs,

        /// Result encoding
        #[arg(long)]
        format: Option<FormatArg>,

        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        poll: PollArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Submit a query and print its request ID without waiting
    Submit {
        #[command(flatten)]
        query: QueryArgs,

        /// Result encoding the job is submitted with
        #[arg(long)]
        format: Option<FormatArg>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Check the status of a submitted job once
    Status {
        /// Request ID returned by the service
        rid: String,
    },

    /// Wait for a submitted job and save its results
    Fetch {
        /// Request ID returned by the service
        rid: String,

        /// Result encoding
        #[arg(long)]
        format: Option<FormatArg>,

        #[command(flatten)]
        poll: PollArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the effective configuration or an example file
    Config {
        /// Print the built-in defaults instead of the loaded configuration
        #[arg(long)]
        example: bool,

        /// Write the configuration to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Text,
    Xml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Xml => OutputFormat::Xml,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let format = |arg: Option<FormatArg>| {
        arg.map(OutputFormat::from).unwrap_or(config.display.format)
    };

    match cli.command {
        Commands::Run { query, format: format_arg, service, poll, output } => {
            let output_format = format(format_arg);
            commands::run::execute(&config, cli.quiet, query, output_format, service, poll, output)?;
        }

        Commands::Submit { query, format: format_arg, service } => {
            commands::submit::execute(&config, query, format(format_arg), service)?;
        }

        Commands::Status { rid } => {
            commands::status::execute(&config, &rid)?;
        }

        Commands::Fetch { rid, format: format_arg, poll, output } => {
            commands::fetch::execute(&config, cli.quiet, &rid, format(format_arg), poll, output)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "qblast", "-vv", "run", "ACGT", "--format", "xml", "--max-attempts", "5", "--strict",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run { query, format, poll, output, .. } => {
                assert_eq!(query.sequence.as_deref(), Some("ACGT"));
                assert!(matches!(format, Some(FormatArg::Xml)));
                assert_eq!(poll.max_attempts, Some(5));
                assert!(output.strict);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_sequence_and_query_file_conflict() {
        let result = Cli::try_parse_from(["qblast", "run", "ACGT", "--query-file", "q.fa"]);
        assert!(result.is_err());
    }
}
