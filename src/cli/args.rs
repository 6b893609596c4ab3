//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. Running without a
//! subcommand installs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Provision a machine to run CropPass.
#[derive(Debug, Parser)]
#[command(name = "croppass-setup")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use a manifest file instead of the built-in one
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Remove launchers, downloaded assets and dependencies
    #[arg(long)]
    pub uninstall: bool,

    /// Probe only; change nothing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Do not wait for Enter before exiting
    #[arg(long, global = true)]
    pub no_pause: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision the machine (default if no command specified)
    Install,

    /// Remove launchers, the downloaded assets and the dependencies
    Uninstall,

    /// Show what each step's probe reports; change nothing
    Status(StatusArgs),
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Install,
    Uninstall,
    Status(bool),
}

impl Cli {
    /// Resolve the subcommand and `--uninstall` into one action.
    ///
    /// An explicit subcommand wins over `--uninstall`.
    pub fn action(&self) -> Action {
        match &self.command {
            Some(Commands::Install) => Action::Install,
            Some(Commands::Uninstall) => Action::Uninstall,
            Some(Commands::Status(args)) => Action::Status(args.json),
            None if self.uninstall => Action::Uninstall,
            None => Action::Install,
        }
    }

    /// Whether to wait for Enter before the process exits.
    ///
    /// Only install and uninstall pause; the caller still checks that a
    /// terminal is attached.
    pub fn pauses(&self) -> bool {
        !self.no_pause && !matches!(self.action(), Action::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("croppass-setup").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn help_describes_the_tool() {
        use clap::CommandFactory;

        let about = Cli::command().get_about().map(|a| a.to_string());
        assert_eq!(about.as_deref(), Some("Provision a machine to run CropPass."));
    }

    #[test]
    fn no_arguments_installs() {
        let cli = parse(&[]);
        assert_eq!(cli.action(), Action::Install);
        assert!(cli.pauses());
    }

    #[test]
    fn uninstall_flag_selects_uninstall() {
        assert_eq!(parse(&["--uninstall"]).action(), Action::Uninstall);
        assert_eq!(parse(&["uninstall"]).action(), Action::Uninstall);
    }

    #[test]
    fn subcommand_wins_over_uninstall_flag() {
        assert_eq!(parse(&["--uninstall", "install"]).action(), Action::Install);
    }

    #[test]
    fn status_json_never_pauses() {
        let cli = parse(&["status", "--json"]);
        assert_eq!(cli.action(), Action::Status(true));
        assert!(!cli.pauses());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["install", "--dry-run", "--no-pause", "--manifest", "setup.yml"]);
        assert!(cli.dry_run);
        assert!(!cli.pauses());
        assert_eq!(cli.manifest, Some(PathBuf::from("setup.yml")));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["croppass-setup", "-v", "-q"]);
        assert!(result.is_err());
    }
}
