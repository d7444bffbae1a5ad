//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use roadbook_core::DeliveryStatus;
use serde_json::Value;

use crate::storage::RecordKind;

/// Create command arguments.
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Kind of record to create
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Record fields as a JSON object, e.g. '{"name": "Rosa"}'
    #[arg(value_parser = parse_json)]
    pub payload: Value,
}

/// Update command arguments.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Kind of record to update
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Id of the record
    pub id: String,

    /// Fields to change as a JSON object
    #[arg(value_parser = parse_json)]
    pub patch: Value,
}

/// Arguments naming a single record.
#[derive(Debug, Args)]
pub struct RecordRef {
    /// Kind of record
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Id of the record
    pub id: String,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Kind of record to list
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Only deliveries with this status (deliveries only)
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Set-status command arguments.
#[derive(Debug, Args)]
pub struct SetStatusCommand {
    /// Id of the delivery
    pub id: String,

    /// New status
    #[arg(value_enum)]
    pub status: StatusArg,
}

/// Route command arguments.
#[derive(Debug, Args)]
pub struct RouteCommand {
    /// Only deliveries assigned to this driver
    #[arg(short, long)]
    pub driver: Option<String>,

    /// Current latitude (defaults to the configured depot)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Current longitude (defaults to the configured depot)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Accuracy of the current position in metres
    #[arg(long, requires = "lat")]
    pub accuracy: Option<f64>,

    /// Statuses to include (repeatable; defaults to the configured route statuses)
    #[arg(short, long, value_enum)]
    pub status: Vec<StatusArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Record kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Customers
    Customer,
    /// Products
    Product,
    /// Drivers
    Driver,
    /// Delivery orders
    Delivery,
}

impl From<KindArg> for RecordKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Customer => Self::Customer,
            KindArg::Product => Self::Product,
            KindArg::Driver => Self::Driver,
            KindArg::Delivery => Self::Delivery,
        }
    }
}

/// Delivery status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Not yet picked up
    Pending,
    /// Driver is en route
    OnWay,
    /// Handed over
    Delivered,
    /// Nobody answered
    NoAnswer,
    /// Order cancelled
    Cancelled,
}

impl From<StatusArg> for DeliveryStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::OnWay => Self::OnWay,
            StatusArg::Delivered => Self::Delivered,
            StatusArg::NoAnswer => Self::NoAnswer,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

fn parse_json(s: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_string())
    }
}
