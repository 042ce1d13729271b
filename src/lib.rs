//! `license-catalog` — client for license-chooser APIs such as the Creative
//! Commons license REST API.
//!
//! # Flow
//! 1. List the license classes offered for a locale ([`LicenseCatalogClient::list_licenses`]).
//! 2. Fetch the questions of a class ([`LicenseCatalogClient::get_license`]).
//! 3. Post the answers to obtain a license URI ([`LicenseCatalogClient::resolve_license_uri`]).
//! 4. Fetch the license's descriptor document ([`LicenseCatalogClient::fetch_license_document`]).

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod xml;

pub use catalog::client::{CatalogConfig, LicenseCatalogClient};
pub use error::{CatalogError, ErrorKind};
pub use models::{AnswerSet, Catalog, LicenseField, LicenseFieldOption, LicenseSummary};
