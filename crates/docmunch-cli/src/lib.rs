mod cli;
mod commands;
mod interrupt;

pub use cli::Cli;
