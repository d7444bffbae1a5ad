//! `roadbook` - Delivery records and driver routes
//!
//! This library wires the delivery core in `roadbook-core` to a `SQLite`
//! record store, a location provider and layered configuration.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod service;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use location::{locate, FixedLocation, LocationProvider, Unavailable};
pub use logging::init_logging;
pub use service::{DeliveryService, DriverRoute};
pub use storage::{RecordKind, RecordStore, Storage, StorageStats};
