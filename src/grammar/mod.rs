//! Grammar layer: per-variant field-location rules and the variant registry.
//!
//! This module is separate from reading and rendering. It owns:
//! - FieldRule / Metric / Scalar (where a value lives and what type it has)
//! - GrammarSpec (validated per-variant layout)
//! - Registry (variant name -> GrammarSpec, built-ins plus grammar files)

pub mod registry;
pub mod rule;
pub mod variant;

pub use registry::Registry;
pub use rule::{FieldRule, Metric, Scalar, ScalarKind};
pub use variant::{GrammarSpec, RawGrammar};
