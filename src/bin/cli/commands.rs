//! Command implementations for the CLI tool.

use std::path::{Path, PathBuf};

use xarc::{CancelFlag, CreateOptions, ExtractOptions};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::CliProgress;

/// Configuration for the create command.
pub struct CreateConfig<'a> {
    pub output: &'a Path,
    pub inputs: &'a [PathBuf],
    pub level: Option<u32>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub cancel: CancelFlag,
}

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub create_parents: bool,
    pub format: OutputFormat,
    pub quiet: bool,
    pub cancel: CancelFlag,
}

/// Create command implementation
pub fn create(config: &CreateConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let progress = CliProgress::new(config.quiet, config.cancel.clone());
    progress.set_message("Creating...");

    let mut options = CreateOptions::new().progress(progress.clone());
    if let Some(level) = config.level {
        options = options.level(level);
    }

    let result = match xarc::create(config.output, config.inputs, options) {
        Ok(r) => r,
        Err(e) => {
            progress.finish();
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    progress.finish();
    print!("{}", formatter.format_create_result(config.output, &result));
    ExitCode::Success
}

/// Extract command implementation
pub fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let progress = CliProgress::new(config.quiet, config.cancel.clone());
    progress.set_message("Extracting...");

    let options = ExtractOptions::new()
        .create_parents(config.create_parents)
        .progress(progress.clone());

    let result = match xarc::extract(config.input, config.output, options) {
        Ok(r) => r,
        Err(e) => {
            progress.finish();
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    progress.finish();
    print!("{}", formatter.format_extract_result(&result));
    ExitCode::Success
}
