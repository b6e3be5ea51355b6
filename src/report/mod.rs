//! Run reports. The JSON report is a pretty-printed [`RunSummary`](crate::models::RunSummary)
//! written straight from `main`.
//!
//! - [`terminal`] — colored summary box, with per-group tables under `--verbose`.

pub mod terminal;
