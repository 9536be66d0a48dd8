use crate::models::{Listing, NearbyListing};
use crate::core::distance::haversine_distance;

/// Distance from a point to a listing, if the listing has usable coordinates
#[inline]
pub fn distance_to(listing: &Listing, target_lat: f64, target_lon: f64) -> Option<f64> {
    listing
        .lat_lon()
        .map(|(lat, lon)| haversine_distance(target_lat, target_lon, lat, lon))
}

/// Check whether a listing lies within `radius_km` of the target.
///
/// Listings without a `[lon, lat]` pair are never within range.
#[inline]
pub fn within_radius(listing: &Listing, target_lat: f64, target_lon: f64, radius_km: f64) -> bool {
    match distance_to(listing, target_lat, target_lon) {
        Some(distance) => distance <= radius_km,
        None => false,
    }
}

/// Narrow a listing set to those within `radius_km` of the target, keeping input order
pub fn filter_by_proximity(
    listings: &[Listing],
    target_lat: f64,
    target_lon: f64,
    radius_km: f64,
) -> Vec<Listing> {
    listings
        .iter()
        .filter(|listing| within_radius(listing, target_lat, target_lon, radius_km))
        .cloned()
        .collect()
}

/// Listings within range paired with their distance, nearest first.
///
/// Ties keep input order.
pub fn nearby(
    listings: &[Listing],
    target_lat: f64,
    target_lon: f64,
    radius_km: f64,
) -> Vec<NearbyListing> {
    let mut found: Vec<NearbyListing> = listings
        .iter()
        .filter_map(|listing| {
            let distance_km = distance_to(listing, target_lat, target_lon)?;
            (distance_km <= radius_km).then(|| NearbyListing {
                listing: listing.clone(),
                distance_km,
            })
        })
        .collect();

    found.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    found
}
