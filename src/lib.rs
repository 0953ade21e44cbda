//! Core library for the quarterly-revenue command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the unit tests. The modules are
//! structured to keep responsibilities narrow and composable: IO adapters
//! live under [`io`], data representations inside [`model`], the column-name
//! heuristics in [`resolve`], the cross-quarter aggregation in [`aggregate`],
//! and the run orchestration under [`pipeline`].

pub mod aggregate;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod resolve;

pub use error::{Result, ToolError};
