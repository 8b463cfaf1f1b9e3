//! Command handlers.

pub mod generate;
pub mod list;
pub mod render;
pub mod validate;
