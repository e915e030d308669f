use geo::{HaversineDistance, Point};
use crate::models::{BoundingBox, Coordinates};

/// Meters in a statute mile
const METERS_PER_MILE: f64 = 1609.344;

/// Approximate miles per degree of latitude
///
/// Slightly under the true ~69.09 so the latitude span errs on the wide side.
const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// Mean Earth radius in miles, matching the radius `geo` uses
const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// Great-circle distance between two points in miles (haversine formula)
#[inline]
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    Point::from(a).haversine_distance(&Point::from(b)) / METERS_PER_MILE
}

/// Calculate a bounding box around a center point
///
/// This is much faster than Haversine for pre-filtering, and always a
/// superset of the true radius: candidates inside it are re-checked with
/// [`distance_miles`].
/// 1° latitude ≈ 69 miles, 1° longitude ≈ 69 miles * cos(latitude)
///
/// Longitudes are kept in [-180, 180]. A box that crosses the antimeridian
/// comes back with `min_lon > max_lon`; see [`BoundingBox::crosses_antimeridian`].
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees, within [-180, 180]
/// * `radius_miles` - Radius in miles
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_miles: f64) -> BoundingBox {
    let lat_delta = radius_miles / MILES_PER_DEGREE_LAT;
    let min_lat = (lat - lat_delta).max(-90.0);
    let max_lat = (lat + lat_delta).min(90.0);

    let cos_lat = lat.to_radians().cos().abs();
    let angular = (radius_miles / EARTH_RADIUS_MILES).min(std::f64::consts::PI);

    // Away from the equator the widest point of the circle sits poleward of
    // the center, so the simple cos(lat) correction is widened to the exact
    // spherical bound. A circle that reaches a pole spans every longitude.
    let lon_delta = if angular.sin() >= cos_lat {
        None
    } else {
        let approx = radius_miles / (MILES_PER_DEGREE_LAT * cos_lat);
        let exact = (angular.sin() / cos_lat).asin().to_degrees();
        Some(approx.max(exact)).filter(|delta| *delta < 180.0)
    };

    let (min_lon, max_lon) = match lon_delta {
        Some(delta) => (wrap_longitude(lon - delta), wrap_longitude(lon + delta)),
        None => (-180.0, 180.0),
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Bring a longitude that overshot by less than a full turn back into [-180, 180]
#[inline]
fn wrap_longitude(lon: f64) -> f64 {
    if lon < -180.0 {
        lon + 360.0
    } else if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}

/// Check if a point is within a bounding box
///
/// Handles boxes that wrap across the antimeridian.
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    if lat < bbox.min_lat || lat > bbox.max_lat {
        return false;
    }

    if bbox.crosses_antimeridian() {
        lon >= bbox.min_lon || lon <= bbox.max_lon
    } else {
        lon >= bbox.min_lon && lon <= bbox.max_lon
    }
}
