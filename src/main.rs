//! `license-catalog` — browse license classes and issue license URIs.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and install logging.
//! 2. Load config ([`license_catalog::config::load_config`]) and apply CLI overrides.
//! 3. Build one [`LicenseCatalogClient`] for the whole run.
//! 4. Run the requested command and render the result ([`report`]).
//! 5. Exit `0`, or `1` when `issue`/`details` produced nothing.

mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ReportFormat};
use license_catalog::catalog::client::CatalogProgress;
use license_catalog::catalog::parse::{license_class_xml, license_name};
use license_catalog::config::load_config;
use license_catalog::models::{AnswerSet, Catalog, LicenseSummary};
use license_catalog::LicenseCatalogClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    let mut config = load_config(&cwd, cli.config.as_deref())?;

    if let Some(root_url) = &cli.root_url {
        config.api.root_url = root_url.clone();
    }
    config.api.excluded_licenses.extend(cli.exclude.iter().cloned());

    let client = LicenseCatalogClient::new(config.catalog_config()?)
        .context("building license API client")?;
    info!(root = %client.root_url(), "license API client ready");

    match cli.command {
        Command::List { locale } => {
            let ids = client.list_licenses(&locale).await;
            report::terminal::render_ids(&ids, &locale, cli.quiet);
        }

        Command::Catalog { locale, report } => {
            let catalog = fetch_catalog(&client, &locale, cli.quiet).await;
            match report {
                ReportFormat::Terminal => {
                    report::terminal::render_catalog(&catalog, &locale, cli.quiet)
                }
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
                ReportFormat::Xml => {
                    for license in &catalog.licenses {
                        println!("{}", license_class_xml(license)?);
                    }
                }
            }
        }

        Command::Show { id, report } => {
            let Some(license) = client.get_license(&id).await else {
                eprintln!("{} license class `{}` could not be retrieved", "✗".red(), id);
                std::process::exit(1);
            };
            render_license(&license, report)?;
        }

        Command::Issue {
            id,
            locale,
            answers,
        } => {
            let answers: AnswerSet = answers.into_iter().collect();
            match client.resolve_license_uri(&id, &locale, &answers).await {
                Some(uri) => println!("{}", uri),
                None => {
                    eprintln!(
                        "{} no license URI issued for `{}` with answers {}",
                        "✗".red(),
                        id,
                        answers
                    );
                    std::process::exit(1);
                }
            }
        }

        Command::Details { uri } => {
            let name = client
                .fetch_license_document(&uri)
                .await
                .and_then(|doc| license_name(&doc));
            match name {
                Some(name) => {
                    if !cli.quiet {
                        println!(" {} {}", "License:".bold(), uri);
                    }
                    println!("{}", name);
                }
                None => {
                    eprintln!("{} no license document for {}", "✗".red(), uri);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn render_license(license: &LicenseSummary, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Terminal => report::terminal::render_license(license),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(license)?),
        ReportFormat::Xml => println!("{}", license_class_xml(license)?),
    }
    Ok(())
}

/// [`LicenseCatalogClient::retrieve_licenses`] with a progress bar.
async fn fetch_catalog(client: &LicenseCatalogClient, locale: &str, quiet: bool) -> Catalog {
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    };

    let catalog = client
        .retrieve_licenses_with(locale, |step| match step {
            CatalogProgress::Listed(total) => pb.set_length(total as u64),
            CatalogProgress::Fetched(_) => pb.inc(1),
        })
        .await;

    pb.finish_with_message("Done");
    catalog
}
