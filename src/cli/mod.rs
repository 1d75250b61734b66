//! CLI module for tripplan - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
