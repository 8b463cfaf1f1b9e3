//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use schedcal_core::TracingOutputFormat;

/// schedcal - calendar feeds from schedule pages
#[derive(Debug, Parser)]
#[command(name = "schedcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Calendar config file or directory of *.yml files (can be repeated)
    #[arg(
        long,
        short,
        global = true,
        env = "SCHEDCAL_CONFIG",
        value_delimiter = ',',
        action = clap::ArgAction::Append
    )]
    pub config: Vec<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log format: pretty, compact or json
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: TracingOutputFormat,

    /// Fetch timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, extract and write one .ics file per calendar
    Generate {
        /// Directory receiving <name>.ics files
        #[arg(long, short)]
        output_dir: PathBuf,

        /// Only generate these calendars (can be repeated)
        #[arg(long = "calendar", action = clap::ArgAction::Append)]
        calendars: Vec<String>,
    },

    /// Print one calendar to stdout without writing files
    Render {
        /// Calendar name
        #[arg(long)]
        calendar: String,

        /// Print the render context as JSON instead of ICS
        #[arg(long)]
        json: bool,
    },

    /// Check every configuration without fetching
    Validate,

    /// List configured calendars
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_args() {
        let cli = Cli::parse_from([
            "schedcal",
            "generate",
            "--config",
            "calendars/",
            "-c",
            "extra.yml",
            "--output-dir",
            "out",
            "--calendar",
            "rangers",
            "--calendar",
            "metro",
        ]);
        assert_eq!(
            cli.config,
            vec![PathBuf::from("calendars/"), PathBuf::from("extra.yml")]
        );
        match cli.command {
            Command::Generate {
                output_dir,
                calendars,
            } => {
                assert_eq!(output_dir, PathBuf::from("out"));
                assert_eq!(calendars, vec!["rangers", "metro"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["schedcal", "list", "-v", "--log-format", "json"]);
        assert!(cli.debug);
        assert_eq!(cli.log_format, TracingOutputFormat::Json);
        assert_eq!(cli.timeout, 30);
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn render_requires_calendar() {
        assert!(Cli::try_parse_from(["schedcal", "render"]).is_err());
        let cli = Cli::try_parse_from(["schedcal", "render", "--calendar", "x", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Render { json: true, .. }));
    }

    #[test]
    fn bad_log_format() {
        assert!(Cli::try_parse_from(["schedcal", "list", "--log-format", "xml"]).is_err());
    }
}
