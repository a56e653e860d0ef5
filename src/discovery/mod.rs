//! Source tree discovery

pub mod scanner;

pub use scanner::{discover, MatchRule};
