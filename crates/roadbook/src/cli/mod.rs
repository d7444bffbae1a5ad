//! Command-line interface for roadbook.
//!
//! This module provides the CLI structure for the `roadbook` binary and the
//! renderers it uses for human-readable output.

mod commands;
pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CreateCommand, KindArg, ListCommand, OutputFormat, RecordRef, RouteCommand,
    SetStatusCommand, StatusArg, StatusCommand, UpdateCommand,
};

/// roadbook - Delivery records and driver routes
///
/// Manage customers, products, drivers and delivery orders, and list a
/// driver's deliveries nearest first.
#[derive(Debug, Parser)]
#[command(name = "roadbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a record
    Create(CreateCommand),

    /// Change fields of a record
    Update(UpdateCommand),

    /// Delete a record
    Delete(RecordRef),

    /// Show a single record
    Get(RecordRef),

    /// List records of one kind
    List(ListCommand),

    /// Set the status of a delivery
    SetStatus(SetStatusCommand),

    /// List a driver's deliveries, nearest first
    Route(RouteCommand),

    /// Show record counts and database information
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }
}
