//! Shared utilities for the re2mv-rs CLI

pub mod table;
pub mod tree;

pub use table::*;
pub use tree::*;
