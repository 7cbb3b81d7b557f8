use crate::models::GeoPoint;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

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

    // Rounding can push `a` a hair past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two validated points
#[inline]
pub fn distance_between(from: GeoPoint, to: GeoPoint) -> f64 {
    haversine_distance(from.lat(), from.lon(), to.lat(), to.lon())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Istanbul (Taksim) to Ankara (Kizilay), approximately 350 km
        let istanbul_lat = 41.0369;
        let istanbul_lon = 28.9850;
        let ankara_lat = 39.9208;
        let ankara_lon = 32.8541;

        let distance = haversine_distance(istanbul_lat, istanbul_lon, ankara_lat, ankara_lon);
        assert!((distance - 350.0).abs() < 10.0, "Distance should be ~350km, got {}", distance);
    }

    #[test]
    fn test_identical_points_are_zero() {
        for (lat, lon) in [(41.0082, 28.9784), (-33.8688, 151.2093), (90.0, 0.0), (0.0, -180.0)] {
            assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_antipodal_points() {
        let distance = haversine_distance(10.0, 20.0, -10.0, -160.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;

        assert!(distance.is_finite());
        assert!((distance - half_circumference).abs() < 1.0, "got {}", distance);
    }

    #[test]
    fn test_symmetric() {
        let ab = haversine_distance(38.4237, 27.1428, 36.8969, 30.7133);
        let ba = haversine_distance(36.8969, 30.7133, 38.4237, 27.1428);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_distance_between_points() {
        let kadikoy = GeoPoint::new(40.9903, 29.0290).unwrap();
        let besiktas = GeoPoint::new(41.0422, 29.0083).unwrap();

        let distance = distance_between(kadikoy, besiktas);
        assert!(distance > 5.0 && distance < 7.0, "Expected ~6km, got {}", distance);
    }
}
