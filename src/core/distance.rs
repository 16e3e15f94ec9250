/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sentinel distance for profiles with unknown location
///
/// Candidates without coordinates are scored as geographically
/// incompatible rather than failing the scoring pipeline.
pub const UNKNOWN_DISTANCE_KM: f64 = f64::MAX;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two optional coordinate pairs
///
/// Returns [`UNKNOWN_DISTANCE_KM`] when either side has no location.
#[inline]
pub fn distance_km(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> f64 {
    match (a, b) {
        (Some((lat1, lon1)), Some((lat2, lon2))) => haversine_distance(lat1, lon1, lat2, lon2),
        _ => UNKNOWN_DISTANCE_KM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance_london_paris() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!(
            (distance - 344.0).abs() < 10.0,
            "Distance should be ~344km, got {}",
            distance
        );
    }

    #[test]
    fn test_haversine_distance_identity() {
        let distance = haversine_distance(37.7749, -122.4194, 37.7749, -122.4194);
        assert!(distance < 0.01);
    }

    #[test]
    fn test_haversine_distance_symmetry() {
        let ab = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        let ba = haversine_distance(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_missing_coordinates_use_sentinel() {
        let here = Some((37.7749, -122.4194));
        assert_eq!(distance_km(here, None), UNKNOWN_DISTANCE_KM);
        assert_eq!(distance_km(None, here), UNKNOWN_DISTANCE_KM);
        assert_eq!(distance_km(None, None), UNKNOWN_DISTANCE_KM);
    }

    #[test]
    fn test_both_coordinates_present() {
        let d = distance_km(Some((51.5074, -0.1278)), Some((48.8566, 2.3522)));
        assert!(d > 300.0 && d < 400.0);
    }
}
