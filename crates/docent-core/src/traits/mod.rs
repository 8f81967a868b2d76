//! Core traits for docent collaborators.

mod completion;
mod store;

pub use completion::*;
pub use store::*;
