//! Great-circle geometry used when no road route is available.

use super::entities::GeoPoint;

pub const EARTH_RADIUS_MILES: f64 = 3958.8;
pub const METERS_PER_MILE: f64 = 1609.344;
/// Calibrated multiplier approximating how much longer roads are than the
/// great-circle path. A heuristic, not a conversion.
pub const ROAD_CURVATURE_FACTOR: f64 = 1.15;

pub fn haversine_miles(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Road-distance estimate from coordinates alone: great-circle miles scaled
/// by [`ROAD_CURVATURE_FACTOR`], rounded, never below one mile.
pub fn approximate_road_miles(from: GeoPoint, to: GeoPoint) -> u32 {
    whole_miles(haversine_miles(from, to) * ROAD_CURVATURE_FACTOR)
}

pub fn meters_to_miles(meters: f64) -> u32 {
    whole_miles(meters / METERS_PER_MILE)
}

fn whole_miles(miles: f64) -> u32 {
    miles.round().max(1.0) as u32
}
