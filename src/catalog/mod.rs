//! Access to a license-chooser API.
//!
//! - [`client`] — [`LicenseCatalogClient`](client::LicenseCatalogClient): HTTP calls
//!   over one pooled client, with typed (`try_*`) and best-effort forms.
//! - [`parse`] — extraction functions for each response schema.
//! - [`payload`] — the answers document posted when issuing a license.

pub mod client;
pub mod parse;
pub mod payload;
