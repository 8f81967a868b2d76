//! Core types for docent.

mod analysis;
mod document;
mod provider;
mod query;
mod search;

pub use analysis::*;
pub use document::*;
pub use provider::*;
pub use query::*;
pub use search::*;
