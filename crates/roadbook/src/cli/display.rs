//! Text rendering for records and routes.
//!
//! Every renderer returns a `String`; the binary decides where it goes.

use std::fmt::Write as _;

use roadbook_core::{DeliveryRecord, RankedDelivery};
use serde_json::Value;

use crate::service::DriverRoute;

/// Label shown for deliveries without coordinates.
pub const LOCATION_UNKNOWN: &str = "location unknown";

const MAX_CELL: usize = 32;

/// Shorten `text` to fit a table cell.
fn cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(MAX_CELL - 1).collect();
        short.push('…');
        short
    }
}

/// The most descriptive name a raw record carries.
#[must_use]
pub fn record_label(doc: &Value) -> &str {
    ["name", "title", "customerName"]
        .iter()
        .find_map(|key| doc.get(*key).and_then(Value::as_str))
        .unwrap_or("-")
}

fn id_of(doc: &Value) -> &str {
    doc.get("$id").and_then(Value::as_str).unwrap_or("-")
}

/// Render raw records as a table of id, label and last update.
#[must_use]
pub fn records_table(docs: &[Value]) -> String {
    let mut out = format!("{:<32}  {:<32}  {}\n", "ID", "NAME", "UPDATED");
    for doc in docs {
        let updated = doc.get("$updatedAt").and_then(Value::as_str).unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<32}  {:<32}  {}",
            id_of(doc),
            cell(record_label(doc)),
            updated
        );
    }
    out
}

/// Render raw records one per line as `id<TAB>label`.
#[must_use]
pub fn records_plain(docs: &[Value]) -> String {
    docs.iter()
        .map(|doc| format!("{}\t{}\n", id_of(doc), record_label(doc)))
        .collect()
}

/// Render deliveries as a table.
#[must_use]
pub fn deliveries_table(records: &[DeliveryRecord]) -> String {
    let mut out = format!(
        "{:<32}  {:<10}  {:<8}  {:<32}  {}\n",
        "ID", "STATUS", "PRIORITY", "CUSTOMER", "ADDRESS"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<32}  {:<10}  {:<8}  {:<32}  {}",
            r.id,
            r.status,
            r.priority,
            cell(&r.customer_name),
            cell(&r.address)
        );
    }
    out
}

/// Render deliveries one per line.
#[must_use]
pub fn deliveries_plain(records: &[DeliveryRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{}\t{}\t{}\t{}\n", r.id, r.status, r.customer_name, r.address))
        .collect()
}

fn route_row(out: &mut String, position: usize, distance: &str, r: &DeliveryRecord) {
    let _ = writeln!(
        out,
        "{:>3}  {:>16}  {:<10}  {:<8}  {:<32}  {}",
        position,
        distance,
        r.status,
        r.priority,
        cell(&r.customer_name),
        cell(&r.address)
    );
}

/// Render a driver route as a table: ranked stops first, then stops without
/// a reference distance, then stops whose location is unknown.
#[must_use]
pub fn route_table(route: &DriverRoute) -> String {
    let mut out = format!(
        "{:>3}  {:>16}  {:<10}  {:<8}  {:<32}  {}\n",
        "#", "DISTANCE", "STATUS", "PRIORITY", "CUSTOMER", "ADDRESS"
    );

    let mut position = 0;
    for RankedDelivery {
        record,
        distance_label,
        ..
    } in &route.ranked
    {
        position += 1;
        route_row(&mut out, position, distance_label, record);
    }
    for record in &route.unranked {
        position += 1;
        route_row(&mut out, position, "-", record);
    }
    for record in &route.unlocated {
        position += 1;
        route_row(&mut out, position, LOCATION_UNKNOWN, record);
    }

    if route.reference.is_none() && !route.unranked.is_empty() {
        out.push_str("\nNo current position; deliveries are shown in stored order.\n");
    }
    out
}

/// Render a driver route one stop per line.
#[must_use]
pub fn route_plain(route: &DriverRoute) -> String {
    let ranked = route
        .ranked
        .iter()
        .map(|r| (r.distance_label.as_str(), &r.record));
    let unranked = route.unranked.iter().map(|r| ("-", r));
    let unlocated = route.unlocated.iter().map(|r| (LOCATION_UNKNOWN, r));

    ranked
        .chain(unranked)
        .chain(unlocated)
        .map(|(distance, r)| format!("{}\t{}\t{}\t{}\n", r.id, distance, r.status, r.address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadbook_core::{rank_by_distance, DeliveryStatus, ReferencePoint};
    use serde_json::json;

    fn delivery(id: &str, lat: f64, lon: f64) -> DeliveryRecord {
        let mut record = DeliveryRecord::new(id).at(lat, lon);
        record.customer_name = format!("Customer {id}");
        record.address = format!("{id} Main St");
        record
    }

    #[test]
    fn test_cell_truncates_long_text() {
        assert_eq!(cell("short"), "short");
        let long = "x".repeat(40);
        let truncated = cell(&long);
        assert_eq!(truncated.chars().count(), MAX_CELL);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_record_label() {
        assert_eq!(record_label(&json!({"name": "Sam"})), "Sam");
        assert_eq!(record_label(&json!({"title": "Water 20L"})), "Water 20L");
        assert_eq!(record_label(&json!({"customerName": "Rosa"})), "Rosa");
        assert_eq!(record_label(&json!({"name": 5})), "-");
    }

    #[test]
    fn test_records_table() {
        let docs = vec![json!({"$id": "c1", "name": "Rosa", "$updatedAt": "2024-01-01T00:00:00.000Z"})];
        let table = records_table(&docs);
        assert!(table.starts_with("ID"));
        assert!(table.contains("c1"));
        assert!(table.contains("Rosa"));
        assert!(table.contains("2024-01-01"));
    }

    #[test]
    fn test_records_plain() {
        let docs = vec![json!({"$id": "p1", "title": "Ice"}), json!({"$id": "p2"})];
        assert_eq!(records_plain(&docs), "p1\tIce\np2\t-\n");
    }

    #[test]
    fn test_deliveries_table() {
        let mut record = delivery("d1", 1.0, 1.0);
        record.status = DeliveryStatus::OnWay;
        let table = deliveries_table(&[record]);
        assert!(table.contains("On Way"));
        assert!(table.contains("Customer d1"));
        assert!(table.contains("medium"));
    }

    #[test]
    fn test_route_table_sections() {
        let reference = ReferencePoint::new(0.0, 0.0);
        let route = DriverRoute {
            reference: Some(reference),
            ranked: rank_by_distance(vec![delivery("near", 0.001, 0.0)], &reference),
            unranked: Vec::new(),
            unlocated: vec![delivery("lost", 0.0, 0.0)],
        };

        let table = route_table(&route);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("111m"));
        assert!(lines[1].contains("Customer near"));
        assert!(lines[2].contains(LOCATION_UNKNOWN));
        assert!(!table.contains("stored order"));
    }

    #[test]
    fn test_route_table_without_reference() {
        let route = DriverRoute {
            reference: None,
            ranked: Vec::new(),
            unranked: vec![delivery("a", 1.0, 1.0)],
            unlocated: Vec::new(),
        };
        assert!(route_table(&route).contains("stored order"));
    }

    #[test]
    fn test_route_plain_order() {
        let reference = ReferencePoint::new(0.0, 0.0);
        let route = DriverRoute {
            reference: Some(reference),
            ranked: rank_by_distance(
                vec![delivery("far", 0.02, 0.0), delivery("near", 0.001, 0.0)],
                &reference,
            ),
            unranked: Vec::new(),
            unlocated: vec![delivery("lost", 0.0, 0.0)],
        };

        let ids: Vec<_> = route_plain(&route)
            .lines()
            .map(|l| l.split('\t').next().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["near", "far", "lost"]);
    }
}
