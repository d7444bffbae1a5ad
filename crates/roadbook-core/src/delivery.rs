//! Delivery data model.
//!
//! These are the canonical, post-normalization types. Raw backend documents
//! are converted into them by [`crate::normalize`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a delivery.
///
/// The variants serialize as the canonical labels shown to users
/// (`"Pending"`, `"On Way"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Not yet picked up.
    #[default]
    Pending,
    /// Driver is en route.
    #[serde(rename = "On Way")]
    OnWay,
    /// Handed over to the customer.
    Delivered,
    /// Driver arrived but nobody answered.
    #[serde(rename = "No Answer")]
    NoAnswer,
    /// Order was cancelled.
    Cancelled,
}

impl DeliveryStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::OnWay,
        Self::Delivered,
        Self::NoAnswer,
        Self::Cancelled,
    ];

    /// The canonical label for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OnWay => "On Way",
            Self::Delivered => "Delivered",
            Self::NoAnswer => "No Answer",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether no further work is expected for a delivery in this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether a delivery in this status still belongs on a driver's route.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Statuses a delivery usually moves to from this one.
    ///
    /// Informational only: the record store accepts any status at any time.
    #[must_use]
    pub fn next_states(&self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::OnWay, Self::Cancelled],
            Self::OnWay => &[Self::Delivered, Self::NoAnswer, Self::Cancelled],
            Self::NoAnswer => &[Self::OnWay, Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Check whether moving to `to` follows the usual lifecycle.
    ///
    /// Re-writing the current status counts as expected.
    #[must_use]
    pub fn is_expected_transition(&self, to: Self) -> bool {
        *self == to || self.next_states().contains(&to)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal handling.
    #[default]
    Medium,
    /// Handle before medium.
    High,
    /// Handle first.
    Urgent,
}

impl Priority {
    /// The lowercase label for this priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized snapshot of a linked driver, product or customer.
///
/// The link is a weak reference: it exists for display and lookup only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSummary {
    /// Identity of the linked record.
    pub id: String,
    /// Display title, when the linked record has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display name, when the linked record has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The linked payload as received, for legacy field access.
    pub raw: serde_json::Value,
}

impl LinkSummary {
    /// The best human label for the link: title, then name, then id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A delivery order after normalization.
///
/// Latitude and longitude are always finite. `(0, 0)` means the location is
/// unknown; see [`DeliveryRecord::has_known_location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    /// Opaque record identity.
    pub id: String,
    /// Identity in an upstream system, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Referenced customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Assigned driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    /// Ordered product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    /// Recipient name.
    pub customer_name: String,
    /// Recipient phone number.
    pub phone: String,
    /// Drop-off address.
    pub address: String,

    /// Drop-off latitude in degrees.
    pub latitude: f64,
    /// Drop-off longitude in degrees.
    pub longitude: f64,

    /// Lifecycle status.
    pub status: DeliveryStatus,
    /// Urgency.
    pub priority: Priority,

    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last changed.
    pub updated_at: DateTime<Utc>,

    /// Value of the order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_value: Option<f64>,

    /// Snapshot of the assigned driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<LinkSummary>,
    /// Snapshot of the ordered product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<LinkSummary>,
    /// Snapshot of the customer record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_record: Option<LinkSummary>,
}

impl DeliveryRecord {
    /// Create an empty pending delivery with the given id, timestamped now.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            external_id: None,
            customer_id: None,
            driver_id: None,
            product_id: None,
            customer_name: String::new(),
            phone: String::new(),
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            status: DeliveryStatus::Pending,
            priority: Priority::Medium,
            created_at: now,
            updated_at: now,
            order_value: None,
            driver: None,
            product: None,
            customer_record: None,
        }
    }

    /// Set the drop-off coordinates.
    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Whether the coordinates are a real location rather than the `(0, 0)`
    /// sentinel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn has_known_location(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0)
    }

    /// Whether the delivery is assigned to `driver_id`, either directly or
    /// through the driver link.
    #[must_use]
    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.driver_id.as_deref() == Some(driver_id)
            || self.driver.as_ref().is_some_and(|d| d.id == driver_id)
    }
}

/// The position distances are measured from, usually the driver's device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reported accuracy radius in metres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// When the position was captured.
    pub captured_at: DateTime<Utc>,
}

impl ReferencePoint {
    /// Create a reference point captured now, without accuracy information.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            captured_at: Utc::now(),
        }
    }

    /// Attach an accuracy radius in metres.
    #[must_use]
    pub fn with_accuracy(mut self, metres: f64) -> Self {
        self.accuracy = Some(metres);
        self
    }
}

/// A delivery together with its distance from a reference point.
///
/// Produced per ranking call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDelivery {
    /// The delivery itself.
    #[serde(flatten)]
    pub record: DeliveryRecord,
    /// Great-circle distance in kilometres.
    pub distance_km: f64,
    /// Human-readable distance, e.g. `"850m"` or `"3.4km"`.
    pub distance_label: String,
}
