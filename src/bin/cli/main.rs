//! CLI tool for creating and extracting archives.

mod commands;
mod exit_codes;
mod output;
mod progress;

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;
use xarc::CancelFlag;

/// Create and safely extract tar, zip and compressed files
#[derive(Parser)]
#[command(name = "xarc")]
#[command(author, version, about = "Create and safely extract tar, zip and compressed files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Increase log verbosity (-v: info, -vv: debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an archive or compressed file (alias: c)
    #[command(alias = "c")]
    Create {
        /// The path of the archive or compressed file to create
        output: PathBuf,

        /// The files to include in the output. Exactly one input must be
        /// provided when the output is a compressed file
        inputs: Vec<PathBuf>,

        /// Compression level (codec specific, clamped to the codec's range)
        #[arg(short = 'l', long)]
        level: Option<u32>,
    },

    /// Extract files from an archive or compressed file (alias: x)
    #[command(alias = "x")]
    Extract {
        /// The path of the archive or compressed file to extract from
        input: PathBuf,

        /// The directory to extract archive entries to, or the file to write
        /// the decompressed contents to
        output: Option<PathBuf>,

        /// Create missing parent directories of entries
        #[arg(long)]
        parents: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// The first Ctrl+C requests cancellation, the second one exits immediately.
fn install_interrupt_handler(cancel: &CancelFlag) {
    let flag = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if flag.is_cancelled() {
            eprintln!("\nInterrupted");
            std::process::exit(exit_codes::USER_INTERRUPT);
        }
        eprintln!("\nCancelling, press Ctrl+C again to abort immediately");
        flag.cancel();
    });
    if let Err(e) = installed {
        log::warn!("failed to install Ctrl+C handler: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel);

    let exit_code = match cli.command {
        Commands::Create {
            output,
            inputs,
            level,
        } => commands::create(&commands::CreateConfig {
            output: &output,
            inputs: &inputs,
            level,
            format: cli.format,
            quiet: cli.quiet,
            cancel,
        }),

        Commands::Extract {
            input,
            output,
            parents,
        } => commands::extract(&commands::ExtractConfig {
            input: &input,
            output: output.as_deref(),
            create_parents: parents,
            format: cli.format,
            quiet: cli.quiet,
            cancel,
        }),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
