//! Stage predicates of the facet filter pipeline.
//!
//! Each predicate returns `true` when its criteria field is empty (stage skipped)
//! or when the listing does not carry the field under test. The one exception is
//! the location stage: a listing without coordinates never passes it.

use chrono::{DateTime, Duration, Utc};
use crate::models::{FilterCriteria, Listing, LocalizedLabel};
use crate::core::proximity::within_radius;

/// Every requested id must be present in `listing_ids`
#[inline]
pub fn require_all(ids: &[String], listing_ids: &[String]) -> bool {
    ids.iter().all(|id| listing_ids.contains(id))
}

/// At least one requested id must be present in `listing_ids`
#[inline]
pub fn require_any(ids: &[String], listing_ids: &[String]) -> bool {
    ids.iter().any(|id| listing_ids.contains(id))
}

#[inline]
fn label_matches(wanted: Option<&str>, label: Option<&LocalizedLabel>) -> bool {
    match (wanted, label) {
        (Some(wanted), Some(label)) if !wanted.is_empty() => label.contains(wanted),
        _ => true,
    }
}

/// Stage 1: listing type (sale/rent), against any locale variant
#[inline]
pub fn matches_listing_type(listing: &Listing, criteria: &FilterCriteria) -> bool {
    label_matches(criteria.listing_type.as_deref(), listing.listing_type.as_ref())
}

/// Stage 2: selected location and radius
#[inline]
pub fn matches_location(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let Some(location) = &criteria.location else {
        return true;
    };

    match location.target() {
        Some((lat, lon)) => within_radius(listing, lat, lon, location.radius),
        None => true,
    }
}

/// Stage 3: property type, against the listing's entrance type
#[inline]
pub fn matches_property_type(listing: &Listing, criteria: &FilterCriteria) -> bool {
    label_matches(criteria.property_type.as_deref(), listing.entrance_type.as_ref())
}

/// Stage 4: category, against the listing's housing type
#[inline]
pub fn matches_category(listing: &Listing, criteria: &FilterCriteria) -> bool {
    label_matches(criteria.category.as_deref(), listing.housing_type.as_ref())
}

/// Stage 5: price range in the active currency.
///
/// A listing without a price in that currency passes.
#[inline]
pub fn matches_price(listing: &Listing, criteria: &FilterCriteria, currency: &str) -> bool {
    if criteria.min_price.is_none() && criteria.max_price.is_none() {
        return true;
    }

    let Some(amount) = listing.price_in(currency) else {
        return true;
    };

    if let Some(min) = criteria.min_price {
        if amount < min {
            return false;
        }
    }

    if let Some(max) = criteria.max_price {
        if amount > max {
            return false;
        }
    }

    true
}

#[inline]
fn exact_count(wanted: Option<u32>, actual: Option<u32>) -> bool {
    match (wanted, actual) {
        (Some(wanted), Some(actual)) if wanted > 0 => wanted == actual,
        _ => true,
    }
}

/// Stage 6: exact room count
#[inline]
pub fn matches_room_count(listing: &Listing, criteria: &FilterCriteria) -> bool {
    exact_count(criteria.room_count, listing.room_count)
}

/// Stage 7: exact bathroom count
#[inline]
pub fn matches_bathroom_count(listing: &Listing, criteria: &FilterCriteria) -> bool {
    exact_count(criteria.bathroom_count, listing.bathroom_count)
}

/// Stage 8: area range in square meters; zero bounds are ignored
#[inline]
pub fn matches_area(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let Some(area) = listing.project_area else {
        return true;
    };

    if let Some(min) = criteria.min_area.filter(|m| *m > 0.0) {
        if area < min {
            return false;
        }
    }

    if let Some(max) = criteria.max_area.filter(|m| *m > 0.0) {
        if area > max {
            return false;
        }
    }

    true
}

/// Stage 9: interior, exterior and accessibility features; each set must be fully present
#[inline]
pub fn matches_feature_sets(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let Some(feature_ids) = &listing.feature_ids else {
        return true;
    };

    [
        &criteria.interior_features,
        &criteria.exterior_features,
        &criteria.accessibility_features,
    ]
    .into_iter()
    .filter(|ids| !ids.is_empty())
    .all(|ids| require_all(ids, feature_ids))
}

/// Stage 10: facing; any selected face is enough
#[inline]
pub fn matches_faces(listing: &Listing, criteria: &FilterCriteria) -> bool {
    if criteria.face_features.is_empty() {
        return true;
    }

    match &listing.faces {
        Some(faces) => require_any(&criteria.face_features, faces),
        None => true,
    }
}

/// Stage 11: created within `window` of `now`
#[inline]
pub fn matches_new(
    listing: &Listing,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    if !criteria.is_new {
        return true;
    }

    match listing.created_at {
        Some(created_at) => created_at >= now - window,
        None => true,
    }
}

/// Stage 12: room-shape shortcuts (1+1, 2+1, 3+1), OR'd together
#[inline]
pub fn matches_room_shape(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let shapes = criteria.room_shapes();
    if shapes.is_empty() {
        return true;
    }

    match listing.room_as_text.as_deref() {
        Some(room_as_text) => shapes.iter().any(|shape| *shape == room_as_text),
        None => true,
    }
}

/// Stage 13: quick-filter features; all must be present
#[inline]
pub fn matches_quick_filters(listing: &Listing, criteria: &FilterCriteria) -> bool {
    if criteria.quick_filter_ids.is_empty() {
        return true;
    }

    match &listing.feature_ids {
        Some(feature_ids) => require_all(&criteria.quick_filter_ids, feature_ids),
        None => true,
    }
}
