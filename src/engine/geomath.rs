use crate::engine::models::Coordinate;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points (haversine)
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

pub fn distance_between(start: &Coordinate, end: &Coordinate) -> f64 {
    distance_meters(start.lat, start.lng, end.lat, end.lng)
}

/// Direction from point 1 to point 2 in degrees, within (-180, 180].
///
/// 0 is north and 90 is east. This is a planar approximation that treats the
/// lat/lng deltas as cartesian components. It is only meant to orient route
/// arrows on screen and is not a geodesic initial bearing.
pub fn bearing_degrees(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let angle = (lng2 - lng1).atan2(lat2 - lat1).to_degrees();
    if angle <= -180.0 { angle + 360.0 } else { angle }
}

pub fn bearing_between(start: &Coordinate, end: &Coordinate) -> f64 {
    bearing_degrees(start.lat, start.lng, end.lat, end.lng)
}

/// Sum of the segment distances along an ordered list of points
pub fn path_length_meters(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_between(&pair[0], &pair[1]))
        .sum()
}

/// Arithmetic midpoint, used to anchor segment arrows
pub fn midpoint(start: &Coordinate, end: &Coordinate) -> Coordinate {
    Coordinate::new((start.lat + end.lat) / 2.0, (start.lng + end.lng) / 2.0)
}

/// Whole meters below 1 km, kilometers with two decimals above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        // Halves round away from zero, not to even
        format!("{:.2}km", (meters / 1000.0 * 100.0).round() / 100.0)
    }
}

pub fn format_coordinate(degrees: f64) -> String {
    format!("{:.6}", (degrees * 1e6).round() / 1e6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_zero_distance() {
        assert_eq!(distance_meters(37.7749, -122.4194, 37.7749, -122.4194), 0.0);
        assert_eq!(distance_meters(-90.0, 180.0, -90.0, 180.0), 0.0);
        assert_eq!(distance_meters(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = distance_meters(37.7749, -122.4194, 37.7849, -122.4294);
        let d2 = distance_meters(37.7849, -122.4294, 37.7749, -122.4194);
        assert!((d1 - d2).abs() < 1e-6);
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_known_distances() {
        // Golden Gate Bridge to Ferry Building, roughly 6.5 km
        let d = distance_meters(37.8199, -122.4783, 37.7955, -122.3937);
        assert!(d > 6000.0 && d < 8000.0, "got {}", d);

        // One degree of latitude is about 111 km
        let d = distance_meters(37.0, -122.0, 38.0, -122.0);
        assert!(d > 110_000.0 && d < 112_000.0, "got {}", d);

        let d = distance_meters(-33.8688, 151.2093, -34.8688, 151.2093);
        assert!(d > 110_000.0 && d < 112_000.0, "got {}", d);
    }

    #[test]
    fn test_distance_across_dateline() {
        let d = distance_meters(0.0, 179.0, 0.0, -179.0);
        assert!(d > 220_000.0 && d < 225_000.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_distance_is_finite() {
        let d = distance_meters(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);

        let d = distance_meters(90.0, 0.0, -90.0, 0.0);
        assert!(d.is_finite() && d >= 0.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        assert!(bearing_degrees(0.0, 0.0, 1.0, 0.0).abs() < 0.1);
        assert!((bearing_degrees(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < 0.1);
        assert!((bearing_degrees(0.0, 0.0, 0.0, -1.0) + 90.0).abs() < 0.1);
        // Due south lands on +180, never -180
        assert_eq!(bearing_degrees(0.0, 0.0, -1.0, 0.0), 180.0);
        assert_eq!(bearing_degrees(0.0, 0.0, -1.0, -0.0), 180.0);
    }

    #[test]
    fn test_bearing_is_planar() {
        // 45 degrees in lat/lng space regardless of latitude
        assert!((bearing_degrees(60.0, 10.0, 61.0, 11.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_length() {
        assert_eq!(path_length_meters(&[]), 0.0);
        assert_eq!(path_length_meters(&[Coordinate::new(1.0, 1.0)]), 0.0);

        let a = Coordinate::new(37.0, -122.0);
        let b = Coordinate::new(38.0, -122.0);
        let c = Coordinate::new(38.0, -121.0);
        let total = path_length_meters(&[a, b, c]);
        let expected = distance_between(&a, &b) + distance_between(&b, &c);
        assert!((total - expected).abs() < 1e-6);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(&Coordinate::new(10.0, 20.0), &Coordinate::new(20.0, 40.0));
        assert_eq!(m, Coordinate::new(15.0, 30.0));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(450.0), "450m");
        assert_eq!(format_distance(449.6), "450m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(1000.0), "1.00km");
        assert_eq!(format_distance(6500.2), "6.50km");
        assert_eq!(format_distance(1125.0), "1.13km");
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(37.774912345678), "37.774912");
        assert_eq!(format_coordinate(-122.419415678901), "-122.419416");
        assert_eq!(format_coordinate(37.0), "37.000000");
        assert_eq!(format_coordinate(-122.0), "-122.000000");
        assert_eq!(format_coordinate(37.0078125), "37.007813");
        assert_eq!(format_coordinate(-37.0078125), "-37.007813");
    }
}
