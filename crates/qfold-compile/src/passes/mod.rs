//! Built-in compilation passes.

pub mod inline;

pub use inline::{InlineConfig, InlinePass, InlineStats};
