//! Great-circle distance and its human-readable form.

use crate::delivery::{DeliveryRecord, ReferencePoint};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for near-antipodal pairs.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance from a reference point to a delivery's drop-off location.
#[must_use]
pub fn distance_between(reference: &ReferencePoint, record: &DeliveryRecord) -> f64 {
    distance_km(
        reference.latitude,
        reference.longitude,
        record.latitude,
        record.longitude,
    )
}

/// Render a distance for display.
///
/// Under one kilometre the value is shown in whole metres (`"500m"`),
/// otherwise in kilometres with one decimal (`"3.4km"`).
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0}m", (km * 1000.0).round())
    } else {
        format!("{km:.1}km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: (f64, f64) = (40.7128, -74.0060);
    const LOS_ANGELES: (f64, f64) = (34.0522, -118.2437);

    #[test]
    fn test_distance_to_self_is_zero() {
        for (lat, lon) in [NEW_YORK, LOS_ANGELES, (0.0, 0.0), (-33.87, 151.21)] {
            assert_eq!(distance_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ab = distance_km(NEW_YORK.0, NEW_YORK.1, LOS_ANGELES.0, LOS_ANGELES.1);
        let ba = distance_km(LOS_ANGELES.0, LOS_ANGELES.1, NEW_YORK.0, NEW_YORK.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_new_york_to_los_angeles() {
        let d = distance_km(NEW_YORK.0, NEW_YORK.1, LOS_ANGELES.0, LOS_ANGELES.1);
        assert!(d > 3935.0 && d < 3945.0, "got {d}");
    }

    #[test]
    fn test_distance_is_non_negative() {
        let d = distance_km(-10.0, 170.0, 10.0, -170.0);
        assert!(d > 0.0);
    }

    #[test]
    fn test_antipodal_points() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half_circumference).abs() < 1e-6);
    }

    #[test]
    fn test_near_antipodal_pairs_stay_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        for lat in -90..=90 {
            for lon in -180..=180 {
                let (lat, lon) = (f64::from(lat), f64::from(lon));
                let d = distance_km(lat, 0.0, -lat, lon);
                assert!(d.is_finite(), "({lat}, 0) to ({}, {lon}) gave {d}", -lat);
                assert!(d >= 0.0);
                assert!(d <= half_circumference + 1e-6);
            }
        }
        assert_eq!(format_distance(distance_km(-82.0, 0.0, 82.0, 180.0)), "20015.1km");
    }

    #[test]
    fn test_distance_between_reference_and_record() {
        let reference = ReferencePoint::new(NEW_YORK.0, NEW_YORK.1);
        let record = DeliveryRecord::new("d1").at(LOS_ANGELES.0, LOS_ANGELES.1);
        let expected = distance_km(NEW_YORK.0, NEW_YORK.1, LOS_ANGELES.0, LOS_ANGELES.1);
        assert_eq!(distance_between(&reference, &record), expected);
    }

    #[test]
    fn test_format_metres() {
        assert_eq!(format_distance(0.5), "500m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(0.0424), "42m");
        assert_eq!(format_distance(0.9994), "999m");
    }

    #[test]
    fn test_format_kilometres() {
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(12.34), "12.3km");
        assert_eq!(format_distance(3.36), "3.4km");
        assert_eq!(format_distance(3940.2), "3940.2km");
    }
}
