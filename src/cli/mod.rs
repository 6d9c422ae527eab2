//! CLI module - argument parsing and command dispatch

pub mod commands;

use clap::{Parser, Subcommand};

/// Steady-state production and routing solvers
#[derive(Parser, Debug)]
#[command(name = "flowrate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan steady-state production from a JSON problem on stdin
    Factory,
    /// Route flows through a bounded belt network from JSON on stdin
    Belts,
}
