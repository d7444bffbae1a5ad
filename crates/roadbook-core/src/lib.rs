//! `roadbook-core` - Delivery record normalization and proximity ranking
//!
//! This crate holds the pure logic behind the driver view: turning loosely
//! shaped backend records into typed deliveries, measuring great-circle
//! distance from the driver's position, and ordering deliveries by it.
//! Nothing here performs I/O or returns an error.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod delivery;
pub mod geo;
pub mod normalize;
pub mod ranking;

pub use delivery::{
    DeliveryRecord, DeliveryStatus, LinkSummary, Priority, RankedDelivery, ReferencePoint,
};
pub use geo::{distance_km, format_distance};
pub use normalize::{normalize_priority, normalize_record, normalize_records, normalize_status};
pub use ranking::{partition_by_location, rank_by_distance};
