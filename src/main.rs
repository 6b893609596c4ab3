//! croppass-setup entry point.

use std::process::ExitCode;

use clap::Parser;
use croppass_setup::cli::{Cli, CommandDispatcher};
use croppass_setup::shell::is_ci;
use croppass_setup::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
///
/// Logs go to stderr so they never mix with spinners or JSON on stdout.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("croppass_setup=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("croppass_setup=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("croppass-setup starting with args: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);
    let mut ui = create_ui(!is_ci(), output_mode);

    let dispatcher = CommandDispatcher::new(cli.manifest.clone());
    let exit_code = match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => result.exit_code,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            1
        }
    };

    // Launched by double-click, the window would close before the summary is read.
    if cli.pauses() && ui.is_interactive() {
        ui.pause("Press Enter to exit");
    }

    ExitCode::from(exit_code as u8)
}
