//! Sources of the driver's current position.
//!
//! A position fix is a request/response call that may fail or hang on its
//! own. [`locate`] bounds it with a timeout and turns every failure into
//! `None`, so callers simply render an unranked route.

use std::time::Duration;

use roadbook_core::ReferencePoint;
use tracing::{debug, warn};

/// A provider of the device's current location.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// Name of this provider (for logging).
    fn name(&self) -> &'static str;

    /// The current position, or `None` when it cannot be determined
    /// (capability missing, permission denied, no fix).
    async fn current_location(&self) -> Option<ReferencePoint>;
}

/// A provider that always reports the same position.
///
/// Used for coordinates given on the command line and for the configured
/// depot.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    point: ReferencePoint,
}

impl FixedLocation {
    /// Create a provider for the given point.
    #[must_use]
    pub fn new(point: ReferencePoint) -> Self {
        Self { point }
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedLocation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_location(&self) -> Option<ReferencePoint> {
        let mut point = self.point;
        point.captured_at = chrono::Utc::now();
        Some(point)
    }
}

/// A provider for environments without any location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait::async_trait]
impl LocationProvider for Unavailable {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn current_location(&self) -> Option<ReferencePoint> {
        None
    }
}

/// Ask `provider` for a position, giving up after `timeout`.
pub async fn locate(provider: &dyn LocationProvider, timeout: Duration) -> Option<ReferencePoint> {
    match tokio::time::timeout(timeout, provider.current_location()).await {
        Ok(Some(point)) => {
            debug!(
                "Location from {}: {:.5}, {:.5}",
                provider.name(),
                point.latitude,
                point.longitude
            );
            Some(point)
        }
        Ok(None) => {
            debug!("Location provider {} has no position", provider.name());
            None
        }
        Err(_) => {
            warn!(
                "Location provider {} timed out after {}ms",
                provider.name(),
                timeout.as_millis()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Never answers within any reasonable timeout.
    struct Stalled;

    #[async_trait::async_trait]
    impl LocationProvider for Stalled {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn current_location(&self) -> Option<ReferencePoint> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some(ReferencePoint::new(1.0, 1.0))
        }
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let provider = FixedLocation::new(ReferencePoint::new(40.7128, -74.0060).with_accuracy(5.0));
        let point = locate(&provider, Duration::from_secs(1)).await.unwrap();

        assert_eq!(point.latitude, 40.7128);
        assert_eq!(point.longitude, -74.0060);
        assert_eq!(point.accuracy, Some(5.0));
    }

    #[tokio::test]
    async fn test_unavailable_yields_none() {
        assert!(locate(&Unavailable, Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_yields_none() {
        let point = locate(&Stalled, Duration::from_millis(50)).await;
        assert!(point.is_none());
    }

    #[test]
    fn test_provider_names() {
        let fixed = FixedLocation::new(ReferencePoint::new(0.5, 0.5));
        assert_eq!(fixed.name(), "fixed");
        assert_eq!(Unavailable.name(), "unavailable");
    }
}
