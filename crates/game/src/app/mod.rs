mod bootstrap;
mod loop_runner;

use std::process::ExitCode;

use tracing::error;

pub use bootstrap::BootstrapError;

/// Builds the game from the environment and runs it until the window closes.
pub fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            eprintln!("samurai_dash: {err}");
            ExitCode::FAILURE
        }
    }
}
