//! Error handling for the qblast CLI

use qblast_core::QblastError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for qblast CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Service(#[from] QblastError),
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your qblast.toml configuration file\n\
                 • Use 'qblast config --example' to generate a sample configuration",
            );
        }

        CliError::Input { .. } | CliError::Service(QblastError::InvalidQuery(_)) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Pass the sequence as an argument or with --query-file\n\
                 • Use '-' as the file name to read the sequence from stdin",
            );
        }

        CliError::Service(QblastError::PollTimeout { rid, .. }) => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • The job may still finish; collect it later with 'qblast fetch {}'\n\
                 • Raise --max-attempts or --interval for long searches",
                rid
            ));
        }

        CliError::Service(QblastError::Cancelled { rid }) => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • The remote job keeps running; collect it with 'qblast fetch {}'",
                rid
            ));
        }

        CliError::Service(QblastError::JobExpired { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the request ID for typos\n\
                 • Results are only kept for a limited time; submit the query again",
            );
        }

        CliError::Service(QblastError::Submission { .. }) => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check the program and database names in [service]\n\
                 • Verify that the query is a valid nucleotide or protein sequence",
            );
        }

        CliError::Service(err) if err.is_transient() => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your network connection and the configured base_url\n\
                 • Retry in a few minutes; the service throttles busy clients",
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
