//! Exit codes for the CLI tool.

use xarc::{Error, ErrorKind};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Archive contents are unsafe to extract
pub const FATAL_ERROR: i32 = 2;
/// Format could not be identified or processed
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    IoError,
    UserInterrupt,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::UserInterrupt => USER_INTERRUPT,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a library error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error.kind() {
        ErrorKind::Discovery | ErrorKind::Io => ExitCode::IoError,
        ErrorKind::Identify | ErrorKind::UnsupportedCapability => ExitCode::BadArchive,
        ErrorKind::Arity => ExitCode::BadArgs,
        ErrorKind::Traversal => ExitCode::FatalError,
        ErrorKind::Cancelled => ExitCode::UserInterrupt,
    }
}
