pub mod adjust;
pub mod buffer;
pub mod cli;
pub mod compare;
pub mod config;
pub mod crop;
pub mod dispatcher;
pub mod effects;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod notification;
pub mod session;
pub mod state;
pub mod transform;
pub mod worker;

pub use buffer::{ExportFormat, PixelBuffer};
pub use error::{AppError, AppResult};
pub use session::{EditError, EditResult, EditorSession, SessionOptions};

use clap::Parser;

/// Entrypoint used by the binary: parses arguments and runs one batch edit.
pub fn run() -> anyhow::Result<()> {
    logging::init();
    let args = cli::CliArgs::parse();
    tracing::debug!(?args, "starting photool");
    cli::execute(&args)
}
