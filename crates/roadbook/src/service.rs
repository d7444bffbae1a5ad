//! Delivery service: the glue between the record store and the delivery core.
//!
//! Reads go through [`roadbook_core::normalize`], so every delivery handed to
//! callers is fully typed. Listing is failed-safe: when the store cannot be
//! read, the failure is logged and an empty list is returned.

use roadbook_core::{
    normalize_record, normalize_records, partition_by_location, rank_by_distance, DeliveryRecord,
    DeliveryStatus, RankedDelivery, ReferencePoint,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{RecordKind, RecordStore};

/// A driver's view of their assigned deliveries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRoute {
    /// Where distances were measured from, if a position was available.
    pub reference: Option<ReferencePoint>,
    /// Located deliveries, nearest first. Empty without a reference point.
    pub ranked: Vec<RankedDelivery>,
    /// Located deliveries in stored order, when there was no reference point.
    pub unranked: Vec<DeliveryRecord>,
    /// Deliveries whose location is unknown, in stored order.
    pub unlocated: Vec<DeliveryRecord>,
}

impl DriverRoute {
    /// Total number of deliveries on the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len() + self.unranked.len() + self.unlocated.len()
    }

    /// Whether the route has no deliveries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Delivery operations over a [`RecordStore`].
#[derive(Debug)]
pub struct DeliveryService<S> {
    store: S,
}

impl<S: RecordStore> DeliveryService<S> {
    /// Create a service backed by `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All deliveries, normalized, optionally restricted to one status.
    ///
    /// The filter compares normalized statuses, so a stored `"in_progress"`
    /// matches [`DeliveryStatus::OnWay`]. Store failures yield an empty list.
    pub fn deliveries(&self, status: Option<DeliveryStatus>) -> Vec<DeliveryRecord> {
        let raw = match self.store.list(RecordKind::Delivery) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to list deliveries: {}", e);
                return Vec::new();
            }
        };

        let mut records = normalize_records(&raw);
        if let Some(status) = status {
            records.retain(|r| r.status == status);
        }
        records
    }

    /// A single delivery, normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn delivery(&self, id: &str) -> Result<Option<DeliveryRecord>> {
        Ok(self
            .store
            .get(RecordKind::Delivery, id)?
            .as_ref()
            .map(normalize_record))
    }

    /// Build the route for `driver_id` (or for every driver when `None`).
    ///
    /// Only deliveries whose status is in `statuses` are included; an empty
    /// slice means all active statuses. Deliveries at the `(0, 0)` sentinel
    /// are never ranked and are returned in [`DriverRoute::unlocated`].
    pub fn driver_route(
        &self,
        driver_id: Option<&str>,
        statuses: &[DeliveryStatus],
        reference: Option<&ReferencePoint>,
    ) -> DriverRoute {
        let wanted = |status: DeliveryStatus| {
            if statuses.is_empty() {
                status.is_active()
            } else {
                statuses.contains(&status)
            }
        };

        let assigned = self
            .deliveries(None)
            .into_iter()
            .filter(|r| driver_id.map_or(true, |id| r.is_assigned_to(id)))
            .filter(|r| wanted(r.status));

        let (located, unlocated) = partition_by_location(assigned);
        if !unlocated.is_empty() {
            debug!("{} deliveries have no known location", unlocated.len());
        }

        let (ranked, unranked) = match reference {
            Some(point) => (rank_by_distance(located, point), Vec::new()),
            None => (Vec::new(), located),
        };

        DriverRoute {
            reference: reference.copied(),
            ranked,
            unranked,
            unlocated,
        }
    }

    /// Write a canonical status onto a delivery.
    ///
    /// Any status may be written at any time; an unusual transition is only
    /// logged. Returns `false` if the delivery does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn set_status(&self, id: &str, status: DeliveryStatus) -> Result<bool> {
        let Some(current) = self.delivery(id)? else {
            return Ok(false);
        };

        if !current.status.is_expected_transition(status) {
            warn!(
                "Delivery {} moves from {} to {}, which skips the usual lifecycle",
                id, current.status, status
            );
        }

        self.store.update(
            RecordKind::Delivery,
            id,
            &json!({ "status": status.as_str() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::Storage;
    use serde_json::{json, Value};

    /// A store whose every operation fails.
    struct BrokenStore;

    impl RecordStore for BrokenStore {
        fn create(&self, _: RecordKind, _: &Value) -> Result<String> {
            Err(Error::internal("store offline"))
        }
        fn update(&self, _: RecordKind, _: &str, _: &Value) -> Result<bool> {
            Err(Error::internal("store offline"))
        }
        fn delete(&self, _: RecordKind, _: &str) -> Result<bool> {
            Err(Error::internal("store offline"))
        }
        fn get(&self, _: RecordKind, _: &str) -> Result<Option<Value>> {
            Err(Error::internal("store offline"))
        }
        fn list(&self, _: RecordKind) -> Result<Vec<Value>> {
            Err(Error::internal("store offline"))
        }
    }

    fn service() -> DeliveryService<Storage> {
        DeliveryService::new(Storage::open_in_memory().expect("failed to create test storage"))
    }

    fn add(service: &DeliveryService<Storage>, payload: &Value) -> String {
        service
            .store()
            .create(RecordKind::Delivery, payload)
            .expect("failed to create delivery")
    }

    #[test]
    fn test_deliveries_are_normalized() {
        let service = service();
        add(&service, &json!({"customerName": "Rosa", "latitude": "40.7", "status": "COMPLETE"}));

        let records = service.deliveries(None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer_name, "Rosa");
        assert_eq!(records[0].latitude, 40.7);
        assert_eq!(records[0].status, DeliveryStatus::Delivered);
        assert!(!records[0].id.is_empty());
    }

    #[test]
    fn test_status_filter_uses_normalized_status() {
        let service = service();
        add(&service, &json!({"status": "in_progress"}));
        add(&service, &json!({"status": "On Way"}));
        add(&service, &json!({"status": "pending"}));

        assert_eq!(service.deliveries(Some(DeliveryStatus::OnWay)).len(), 2);
        assert_eq!(service.deliveries(Some(DeliveryStatus::Pending)).len(), 1);
        assert!(service.deliveries(Some(DeliveryStatus::Cancelled)).is_empty());
    }

    #[test]
    fn test_store_failure_yields_empty_list() {
        crate::logging::init_test_logging();
        let service = DeliveryService::new(BrokenStore);

        assert!(service.deliveries(None).is_empty());

        let route = service.driver_route(None, &[], Some(&ReferencePoint::new(0.0, 0.0)));
        assert!(route.is_empty());
    }

    #[test]
    fn test_delivery_lookup() {
        let service = service();
        let id = add(&service, &json!({"priority": "urgent"}));

        let record = service.delivery(&id).unwrap().unwrap();
        assert_eq!(record.id, id);
        assert!(service.delivery("missing").unwrap().is_none());
        assert!(DeliveryService::new(BrokenStore).delivery("x").is_err());
    }

    #[test]
    fn test_driver_route_ranks_by_distance() {
        let service = service();
        let far = add(&service, &json!({"driverId": "drv1", "latitude": 0.09, "longitude": 0.0}));
        let near = add(&service, &json!({"driverId": "drv1", "latitude": 0.01, "longitude": 0.0}));
        add(&service, &json!({"driverId": "drv2", "latitude": 0.001, "longitude": 0.0}));

        let reference = ReferencePoint::new(0.0, 0.0);
        let route = service.driver_route(Some("drv1"), &[], Some(&reference));

        let ids: Vec<_> = route.ranked.iter().map(|r| r.record.id.clone()).collect();
        assert_eq!(ids, [near, far]);
        assert!(route.unranked.is_empty());
        assert_eq!(route.reference, Some(reference));
    }

    #[test]
    fn test_driver_route_matches_driver_link() {
        let service = service();
        add(
            &service,
            &json!({"driver": {"$id": "drv9", "name": "Alex"}, "lat": 1.0, "lng": 1.0}),
        );

        let route = service.driver_route(Some("drv9"), &[], Some(&ReferencePoint::new(1.0, 1.0)));
        assert_eq!(route.ranked.len(), 1);
        assert_eq!(route.ranked[0].distance_label, "0m");
    }

    #[test]
    fn test_driver_route_separates_unknown_locations() {
        let service = service();
        add(&service, &json!({"latitude": "abc", "longitude": null}));
        add(&service, &json!({"latitude": 10.0, "longitude": 10.0}));

        let route = service.driver_route(None, &[], Some(&ReferencePoint::new(10.0, 10.1)));
        assert_eq!(route.ranked.len(), 1);
        assert_eq!(route.unlocated.len(), 1);
        assert!(!route.unlocated[0].has_known_location());
    }

    #[test]
    fn test_driver_route_default_statuses_are_active() {
        let service = service();
        add(&service, &json!({"status": "delivered", "latitude": 1.0, "longitude": 1.0}));
        add(&service, &json!({"status": "canceled", "latitude": 1.0, "longitude": 1.0}));
        add(&service, &json!({"status": "no answer", "latitude": 1.0, "longitude": 1.0}));
        add(&service, &json!({"latitude": 1.0, "longitude": 1.0}));

        let route = service.driver_route(None, &[], Some(&ReferencePoint::new(1.0, 1.0)));
        assert_eq!(route.len(), 2);

        let route = service.driver_route(
            None,
            &[DeliveryStatus::Delivered],
            Some(&ReferencePoint::new(1.0, 1.0)),
        );
        assert_eq!(route.len(), 1);
        assert_eq!(route.ranked[0].record.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_driver_route_without_reference() {
        let service = service();
        let first = add(&service, &json!({"latitude": 5.0, "longitude": 5.0}));
        let second = add(&service, &json!({"latitude": 1.0, "longitude": 1.0}));

        let route = service.driver_route(None, &[], None);
        assert!(route.ranked.is_empty());
        assert!(route.reference.is_none());
        let ids: Vec<_> = route.unranked.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, [first, second]);
    }

    #[test]
    fn test_set_status() {
        let service = service();
        let id = add(&service, &json!({"status": "not_started"}));

        assert!(service.set_status(&id, DeliveryStatus::OnWay).unwrap());
        let raw = service.store().get(RecordKind::Delivery, &id).unwrap().unwrap();
        assert_eq!(raw["status"], "On Way");

        // Unusual transitions are still written
        assert!(service.set_status(&id, DeliveryStatus::Pending).unwrap());
        assert_eq!(
            service.delivery(&id).unwrap().unwrap().status,
            DeliveryStatus::Pending
        );
    }

    #[test]
    fn test_set_status_missing_delivery() {
        let service = service();
        assert!(!service.set_status("missing", DeliveryStatus::Delivered).unwrap());
    }
}
