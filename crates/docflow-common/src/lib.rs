//! Common utilities for the docflow layout core.
//!
//! This crate provides shared infrastructure used by every pipeline stage:
//! - **Diagnostics** - per-run collection of recoverable problems, mirrored to
//!   the `log` facade

pub mod diagnostics;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
