//! Shared plumbing for the non-interactive commands: config loading, the
//! per-command async runtime, and the one-line JSON result envelope.

pub mod chat;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use std::future::Future;

use advisor_core::config::{AppConfig, LoadOptions};

// Exit codes, by failing stage.
pub(crate) const EXIT_CONFIG: u8 = 2;
pub(crate) const EXIT_RUNTIME: u8 = 3;
pub(crate) const EXIT_DB: u8 = 4;
pub(crate) const EXIT_MIGRATION: u8 = 5;
pub(crate) const EXIT_SEED: u8 = 6;

/// What a command hands back to `main`: the process exit code and the line
/// it prints.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self { exit_code: 0, output: envelope(command, "ok", None, &message.into()) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self { exit_code, output: envelope(command, "error", Some(error_class), &message.into()) }
    }
}

fn envelope(command: &str, status: &str, error_class: Option<&str>, message: &str) -> String {
    serde_json::json!({
        "command": command,
        "status": status,
        "error_class": error_class,
        "message": message,
    })
    .to_string()
}

/// One failed stage of a command, with its reporting class and exit code.
pub(crate) struct StageFailure {
    pub class: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl StageFailure {
    pub(crate) fn new(class: &'static str, message: impl Into<String>, exit_code: u8) -> Self {
        Self { class, message: message.into(), exit_code }
    }
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

/// Drives one command's async stages on a fresh current-thread runtime. The
/// future resolves to the success message or the first stage that failed.
pub(crate) fn run_blocking<F>(command: &str, future: F) -> CommandResult
where
    F: Future<Output = Result<String, StageFailure>>,
{
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    match runtime.block_on(future) {
        Ok(message) => CommandResult::success(command, message),
        Err(failure) => {
            CommandResult::failure(command, failure.class, failure.message, failure.exit_code)
        }
    }
}
