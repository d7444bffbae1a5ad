//! Ranking pipeline: order deliveries by distance from a reference point.

use crate::delivery::{DeliveryRecord, RankedDelivery, ReferencePoint};
use crate::geo::{distance_between, format_distance};

/// Attach distances to `records` and sort them nearest first.
///
/// The sort is stable, so records at equal distance keep their input order.
/// No filtering happens here: records at the `(0, 0)` sentinel are ranked
/// like any other point. Callers that want them treated separately should
/// use [`partition_by_location`] first.
#[must_use]
pub fn rank_by_distance(
    records: impl IntoIterator<Item = DeliveryRecord>,
    reference: &ReferencePoint,
) -> Vec<RankedDelivery> {
    let mut ranked: Vec<RankedDelivery> = records
        .into_iter()
        .map(|record| {
            let distance_km = distance_between(reference, &record);
            RankedDelivery {
                distance_label: format_distance(distance_km),
                distance_km,
                record,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

/// Split records into those with a known location and those at the
/// `(0, 0)` sentinel. Both halves keep their input order.
#[must_use]
pub fn partition_by_location(
    records: impl IntoIterator<Item = DeliveryRecord>,
) -> (Vec<DeliveryRecord>, Vec<DeliveryRecord>) {
    records
        .into_iter()
        .partition(DeliveryRecord::has_known_location)
}
