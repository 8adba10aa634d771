use crate::common::{DomainError, DomainResult};
use h3o::LatLng;

use super::types::Position;

/// Mean Earth radius of the H3 sphere model, meters. `LatLng::distance_m`
/// measures on this sphere.
pub const EARTH_RADIUS_M: f64 = 6_371_007.180_918_475;

/// Slack applied to radius comparisons so a point computed to lie exactly on
/// the boundary is not lost to rounding.
pub const DISTANCE_TOLERANCE_M: f64 = 1e-6;

pub fn to_lat_lng(position: Position) -> DomainResult<LatLng> {
    LatLng::new(position.latitude, position.longitude)
        .map_err(|e| DomainError::out_of_range(format!("Invalid coordinates {:?}: {}", position, e)))
}

/// Great-circle (haversine) distance on the H3 sphere.
pub fn haversine_distance_m(a: Position, b: Position) -> DomainResult<f64> {
    Ok(to_lat_lng(a)?.distance_m(to_lat_lng(b)?))
}

pub fn within_radius(distance_m: f64, radius_m: f64) -> bool {
    distance_m <= radius_m + DISTANCE_TOLERANCE_M
}
