//! Solver run-log charts.
//!
//! Pipeline: a [`grammar::Registry`] resolves a solver variant to its
//! [`grammar::GrammarSpec`], a [`log::LogReader`] streams telemetry records out
//! of a log, [`model::TimeSeries`] accumulates them, and
//! [`render::draw_chart`] plots cost and handled count against elapsed time.

pub mod error;
pub mod grammar;
pub mod log;
pub mod model;
pub mod render;

pub use error::{Error, ExtractError, Result};
