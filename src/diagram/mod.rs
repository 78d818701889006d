//! Memory graph: turns a form snapshot into flowchart text.
//!
//! - `sanitize`: escaping of user text for quoted labels
//! - `generator`: the fixed seven-node template

mod generator;
mod sanitize;

pub use generator::{generate, DiagramSource};
pub use sanitize::QUOTE_ENTITY;
