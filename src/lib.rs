//! Z9 assistant: prompt assembly, completion client, and extraction of
//! project directives from assistant responses.

pub mod api;
pub mod cli;
pub mod commands;
pub mod errors;
pub mod file_processing;
pub mod models;
pub mod parser;
pub mod utils;

pub use errors::AppError;
pub use models::{CodeProjectDirectives, ParsedResult};
pub use parser::parse;
