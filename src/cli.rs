use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "license-catalog",
    about = "Browse license classes and issue license URIs from a license-chooser API",
    version
)]
pub struct Cli {
    /// Config file [default: ./.license-catalog/config.toml, fallback ~/.config/license-catalog/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API root URL from the config
    #[arg(long, global = true, value_name = "URL")]
    pub root_url: Option<String>,

    /// Exclude a license class in addition to the configured ones (repeatable)
    #[arg(long = "exclude", global = true, value_name = "ID")]
    pub exclude: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print results, no progress or headings
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the identifiers of the offered license classes
    List {
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Fetch every license class with its questions
    Catalog {
        #[arg(long, default_value = "en")]
        locale: String,

        /// Report format
        #[arg(long, default_value = "terminal", value_name = "FORMAT")]
        report: ReportFormat,
    },

    /// Show the questions of one license class
    Show {
        /// License class identifier, e.g. `standard`
        id: String,

        /// Report format
        #[arg(long, default_value = "terminal", value_name = "FORMAT")]
        report: ReportFormat,
    },

    /// Answer the questions of a license class and print the issued license URI
    Issue {
        /// License class identifier
        id: String,

        #[arg(long, default_value = "en")]
        locale: String,

        /// Answer as `field=value` (repeatable)
        #[arg(long = "answer", value_name = "FIELD=VALUE", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },

    /// Fetch the descriptor document of a license URI and print its name
    Details {
        /// License URI, e.g. `http://creativecommons.org/licenses/by/4.0/`
        uri: String,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Xml,
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got `{}`", raw)),
    }
}
