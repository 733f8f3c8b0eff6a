pub mod commands;
mod output;

pub use output::OutputFormat;
