//! Coordinates, great-circle distance, and location providers.
//!
//! The distance evaluator is a pure haversine implementation. Location
//! acquisition goes through the [`GeoProvider`] trait so the attendance
//! evaluator can be exercised with a fixed provider in tests while the
//! deployed binary polls a location bridge over HTTP (a phone GPS
//! exporter or similar).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance in meters between two points (haversine).
///
/// Pure and deterministic. NaN input propagates as NaN; callers guard
/// coordinates at validation time, not here.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lng - a.lng).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Supplies the device's current position on demand.
///
/// Implementations must return a fresh fix or fail within a bounded wait.
/// Failure is a first-class outcome: the evaluator falls back to the
/// fail-safe absence default for decisions and retries warnings on the
/// next tick.
pub trait GeoProvider: Send + Sync {
    fn current_fix(&self) -> Result<Coordinates, GeoError>;
}

/// A provider that always reports the same position.
///
/// Used by tests and by the CLI `--lat`/`--lng` override when no location
/// bridge is configured.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeoProvider {
    position: Coordinates,
}

impl FixedGeoProvider {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

impl GeoProvider for FixedGeoProvider {
    fn current_fix(&self) -> Result<Coordinates, GeoError> {
        Ok(self.position)
    }
}

/// Wire format of the location bridge response.
#[derive(Debug, Deserialize)]
struct BridgeFix {
    lat: f64,
    lng: f64,
    /// When the bridge captured the fix. Absent means the bridge reads
    /// the sensor on request and the fix is live.
    #[serde(default)]
    fix_at: Option<DateTime<Utc>>,
}

/// Polls a location-bridge HTTP endpoint for the current position.
///
/// The request is bounded by `timeout_secs` and a reported fix older
/// than `max_fix_age_secs` is rejected as stale -- a cached position is
/// worse than no position for a presence decision.
pub struct HttpGeoProvider {
    endpoint: url::Url,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    max_fix_age_secs: u64,
}

impl HttpGeoProvider {
    /// Build a provider for the given bridge endpoint.
    ///
    /// # Errors
    /// Returns [`GeoError::Unavailable`] if the endpoint URL is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(endpoint: &str, timeout_secs: u64, max_fix_age_secs: u64) -> Result<Self, GeoError> {
        let endpoint = url::Url::parse(endpoint)
            .map_err(|e| GeoError::Unavailable(format!("invalid bridge URL: {e}")))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GeoError::Unavailable(e.to_string()))?;
        Ok(Self {
            endpoint,
            client,
            timeout_secs,
            max_fix_age_secs,
        })
    }
}

impl GeoProvider for HttpGeoProvider {
    fn current_fix(&self) -> Result<Coordinates, GeoError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GeoError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    GeoError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GeoError::Unavailable(format!(
                "bridge returned {}",
                response.status()
            )));
        }

        let fix: BridgeFix = response
            .json()
            .map_err(|e| GeoError::Malformed(e.to_string()))?;

        if !fix.lat.is_finite() || !fix.lng.is_finite() {
            return Err(GeoError::Malformed(format!(
                "non-finite coordinates ({}, {})",
                fix.lat, fix.lng
            )));
        }

        if let Some(fix_at) = fix.fix_at {
            let age = (Utc::now() - fix_at).num_seconds().max(0) as u64;
            if age > self.max_fix_age_secs {
                return Err(GeoError::Stale {
                    age_secs: age,
                    max_age_secs: self.max_fix_age_secs,
                });
            }
        }

        Ok(Coordinates::new(fix.lat, fix.lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distance_of_point_to_itself_is_zero() {
        let p = Coordinates::new(12.9716, 77.5946);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_on_the_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);
        let d = distance_meters(a, b);
        // R * 1 degree in radians = 6371000 * pi / 180
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn nan_input_propagates() {
        let a = Coordinates::new(f64::NAN, 0.0);
        let b = Coordinates::new(0.0, 0.0);
        assert!(distance_meters(a, b).is_nan());
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -90.0f64..90.0,
            lng1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lng2 in -180.0f64..180.0,
        ) {
            let a = Coordinates::new(lat1, lng1);
            let b = Coordinates::new(lat2, lng2);
            let ab = distance_meters(a, b);
            let ba = distance_meters(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn distance_is_non_negative(
            lat1 in -90.0f64..90.0,
            lng1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0,
            lng2 in -180.0f64..180.0,
        ) {
            let d = distance_meters(
                Coordinates::new(lat1, lng1),
                Coordinates::new(lat2, lng2),
            );
            prop_assert!(d >= 0.0);
        }
    }

    #[test]
    fn fixed_provider_returns_its_position() {
        let p = FixedGeoProvider::new(Coordinates::new(1.0, 2.0));
        let fix = p.current_fix().unwrap();
        assert_eq!(fix.lat, 1.0);
        assert_eq!(fix.lng, 2.0);
    }

    #[test]
    fn http_provider_parses_a_fresh_fix() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/fix")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"lat": 12.5, "lng": 77.25}"#)
            .create();

        let provider =
            HttpGeoProvider::new(&format!("{}/fix", server.url()), 5, 30).unwrap();
        let fix = provider.current_fix().unwrap();
        assert_eq!(fix.lat, 12.5);
        assert_eq!(fix.lng, 77.25);
    }

    #[test]
    fn http_provider_rejects_stale_fix() {
        let mut server = mockito::Server::new();
        let old = Utc::now() - chrono::Duration::minutes(10);
        let body = format!(
            r#"{{"lat": 1.0, "lng": 2.0, "fix_at": "{}"}}"#,
            old.to_rfc3339()
        );
        let _m = server
            .mock("GET", "/fix")
            .with_status(200)
            .with_body(body)
            .create();

        let provider =
            HttpGeoProvider::new(&format!("{}/fix", server.url()), 5, 30).unwrap();
        match provider.current_fix() {
            Err(GeoError::Stale { max_age_secs, .. }) => assert_eq!(max_age_secs, 30),
            other => panic!("expected stale error, got {other:?}"),
        }
    }

    #[test]
    fn http_provider_rejects_malformed_body() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/fix")
            .with_status(200)
            .with_body("not json")
            .create();

        let provider =
            HttpGeoProvider::new(&format!("{}/fix", server.url()), 5, 30).unwrap();
        assert!(matches!(
            provider.current_fix(),
            Err(GeoError::Malformed(_))
        ));
    }

    #[test]
    fn http_provider_reports_server_errors_as_unavailable() {
        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/fix").with_status(503).create();

        let provider =
            HttpGeoProvider::new(&format!("{}/fix", server.url()), 5, 30).unwrap();
        assert!(matches!(
            provider.current_fix(),
            Err(GeoError::Unavailable(_))
        ));
    }
}
