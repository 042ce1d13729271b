//! Renderers for catalog results.
//!
//! - [`terminal`] — colored tables; respects `--quiet`.
//! - JSON and XML output are written directly by `main` from the models.

pub mod terminal;
