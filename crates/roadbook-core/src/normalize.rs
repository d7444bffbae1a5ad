//! Record normalizer.
//!
//! Backend documents arrive with whatever shape the writer gave them:
//! coordinates as strings, statuses in assorted spellings, missing
//! timestamps. Every function here is total. Unusable input is replaced by
//! a typed default instead of producing an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::trace;

use crate::delivery::{DeliveryRecord, DeliveryStatus, LinkSummary, Priority};

/// Coerce a loosely typed value into a finite `f64`.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace is
/// ignored). Anything else, or a non-finite result, yields `fallback`.
#[must_use]
pub fn coerce_number(value: Option<&Value>, fallback: f64) -> f64 {
    coerce_optional_number(value).unwrap_or(fallback)
}

/// Like [`coerce_number`], but reports unusable input as `None`.
#[must_use]
pub fn coerce_optional_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Canonical key for status matching: trimmed, lowercased, whitespace runs
/// joined with `_`.
fn status_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Map a free-form status string onto one of the canonical statuses.
///
/// Unrecognized input becomes [`DeliveryStatus::Pending`].
#[must_use]
pub fn normalize_status(raw: &str) -> DeliveryStatus {
    match status_key(raw).as_str() {
        "pending" | "not_started" | "notstarted" | "new" | "waiting" | "scheduled" => {
            DeliveryStatus::Pending
        }
        "on_way" | "onway" | "on_the_way" | "in_progress" | "inprogress" | "in_transit"
        | "out_for_delivery" | "en_route" | "started" => DeliveryStatus::OnWay,
        "delivered" | "completed" | "complete" | "done" => DeliveryStatus::Delivered,
        "no_answer" | "noanswer" | "no_response" | "unreachable" => DeliveryStatus::NoAnswer,
        "cancelled" | "canceled" | "cancel" => DeliveryStatus::Cancelled,
        other => {
            trace!("Unrecognized delivery status {:?}, using Pending", other);
            DeliveryStatus::Pending
        }
    }
}

/// Map a free-form priority string onto a [`Priority`], defaulting to medium.
#[must_use]
pub fn normalize_priority(raw: &str) -> Priority {
    match raw.trim().to_lowercase().as_str() {
        "low" => Priority::Low,
        "high" => Priority::High,
        "urgent" => Priority::Urgent,
        _ => Priority::Medium,
    }
}

/// First present, non-null field among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Text for identifier-like and contact fields. Numbers are rendered, other
/// shapes are treated as absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Offset-less date-times accepted after RFC 3339, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Timestamp from an ISO-8601 string or a number of epoch milliseconds.
fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(_) => epoch_millis(Some(value)),
        _ => None,
    }
}

/// First of `keys` holding a usable timestamp.
fn first_timestamp(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(timestamp)
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_millis(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let millis = coerce_optional_number(value)?;
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

fn link(value: Option<&Value>) -> Option<LinkSummary> {
    match value? {
        Value::String(id) => Some(LinkSummary {
            id: id.clone(),
            title: None,
            name: None,
            raw: Value::String(id.clone()),
        }),
        Value::Object(obj) => {
            let id = text(field(obj, &["$id", "id"]))?;
            Some(LinkSummary {
                id,
                title: text(obj.get("title")),
                name: text(obj.get("name")),
                raw: Value::Object(obj.clone()),
            })
        }
        _ => None,
    }
}

/// Convert a raw backend document into a [`DeliveryRecord`].
///
/// Never fails: a non-object input produces a record made entirely of
/// defaults.
#[must_use]
pub fn normalize_record(raw: &Value) -> DeliveryRecord {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let created_at = first_timestamp(obj, &["createdAt", "$createdAt"])
        .or_else(|| epoch_millis(field(obj, &["createdAtMs"])))
        .unwrap_or_else(Utc::now);
    let updated_at = first_timestamp(obj, &["updatedAt", "$updatedAt"]).unwrap_or(created_at);

    let status = field(obj, &["status"])
        .and_then(Value::as_str)
        .map(normalize_status)
        .unwrap_or_default();
    let priority = field(obj, &["priority"])
        .and_then(Value::as_str)
        .map(normalize_priority)
        .unwrap_or_default();

    DeliveryRecord {
        id: text(field(obj, &["$id", "id"])).unwrap_or_default(),
        external_id: text(field(obj, &["externalId", "external_id"])),
        customer_id: text(field(obj, &["customerId", "customer_id"])),
        driver_id: text(field(obj, &["driverId", "driver_id"])),
        product_id: text(field(obj, &["productId", "product_id"])),
        customer_name: text(field(obj, &["customerName", "customer_name"])).unwrap_or_default(),
        phone: text(field(obj, &["phone", "customerPhone"])).unwrap_or_default(),
        address: text(field(obj, &["address", "customerAddress"])).unwrap_or_default(),
        latitude: coerce_number(field(obj, &["latitude", "lat"]), 0.0),
        longitude: coerce_number(field(obj, &["longitude", "lng", "lon"]), 0.0),
        status,
        priority,
        created_at,
        updated_at,
        order_value: coerce_optional_number(field(obj, &["orderValue", "order_value"])),
        driver: link(obj.get("driver")),
        product: link(obj.get("product")),
        customer_record: link(obj.get("customerRecord")),
    }
}

/// Normalize a batch of raw documents, preserving their order.
#[must_use]
pub fn normalize_records<'a>(raw: impl IntoIterator<Item = &'a Value>) -> Vec<DeliveryRecord> {
    raw.into_iter().map(normalize_record).collect()
}
