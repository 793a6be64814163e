use crate::models::BoundingBox;

/// Kilometers per degree of latitude.
pub const KM_PER_DEGREE_LAT: f64 = 111.32;

/// Below this, cos(lat) is treated as zero and the longitude constraint
/// degrades to the full circle instead of blowing up.
const MIN_COS_LAT: f64 = 1e-6;

/// Calculate a bounding box around a center point.
///
/// The box is a rectangular approximation of a circular radius: 1 degree of
/// latitude is taken as 111.32 km, 1 degree of longitude as
/// 111.32 km * cos(latitude). Ranking behavior depends on this
/// approximation, so it must not be replaced with a great-circle distance.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;

    let cos_lat = lat.to_radians().cos().abs();
    let (min_lng, max_lng) = if cos_lat < MIN_COS_LAT {
        // Degenerate near the poles: no usable longitude constraint.
        (-180.0, 180.0)
    } else {
        let lng_delta = radius_km / (KM_PER_DEGREE_LAT * cos_lat);
        (lng - lng_delta, lng + lng_delta)
    };

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lng,
        max_lng,
    }
}

/// Check if a point is within a bounding box, bounds inclusive.
#[inline]
pub fn is_within_bounding_box(lat: f64, lng: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lng >= bbox.min_lng && lng <= bbox.max_lng
}
