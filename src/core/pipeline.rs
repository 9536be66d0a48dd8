use chrono::{DateTime, Duration, Utc};
use crate::models::{FilterCriteria, Listing};
use crate::core::filters::{
    matches_area, matches_bathroom_count, matches_category, matches_faces, matches_feature_sets,
    matches_listing_type, matches_location, matches_new, matches_price, matches_property_type,
    matches_quick_filters, matches_room_count, matches_room_shape,
};

/// How far back a listing counts as "new"
pub const DEFAULT_NEW_LISTING_DAYS: i64 = 7;

/// Facet filter pipeline over an in-memory listing set
///
/// # Pipeline Stages
/// 1. Listing type
/// 2. Location radius
/// 3. Property type
/// 4. Category
/// 5. Price range (active currency)
/// 6. Room count
/// 7. Bathroom count
/// 8. Area range
/// 9. Interior / exterior / accessibility features (all)
/// 10. Faces (any)
/// 11. New listings
/// 12. Room-shape shortcuts
/// 13. Quick filters (all)
///
/// Stages are independent predicates ANDed together, so the order only
/// decides which one short-circuits first.
#[derive(Debug, Clone, Copy)]
pub struct FilterPipeline {
    new_listing_window: Duration,
}

impl FilterPipeline {
    pub fn new(new_listing_window: Duration) -> Self {
        Self { new_listing_window }
    }

    pub fn with_new_listing_days(days: i64) -> Self {
        Self::new(Duration::days(days))
    }

    pub fn new_listing_window(&self) -> Duration {
        self.new_listing_window
    }

    /// Run every stage against one listing
    #[inline]
    pub fn matches(
        &self,
        listing: &Listing,
        criteria: &FilterCriteria,
        currency: &str,
        now: DateTime<Utc>,
    ) -> bool {
        matches_listing_type(listing, criteria)
            && matches_location(listing, criteria)
            && matches_property_type(listing, criteria)
            && matches_category(listing, criteria)
            && matches_price(listing, criteria, currency)
            && matches_room_count(listing, criteria)
            && matches_bathroom_count(listing, criteria)
            && matches_area(listing, criteria)
            && matches_feature_sets(listing, criteria)
            && matches_faces(listing, criteria)
            && matches_new(listing, criteria, now, self.new_listing_window)
            && matches_room_shape(listing, criteria)
            && matches_quick_filters(listing, criteria)
    }

    /// Filter `listings` against `criteria`, keeping input order
    pub fn apply_filters(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        currency: &str,
    ) -> Vec<Listing> {
        self.apply_filters_at(listings, criteria, currency, Utc::now())
    }

    /// Same as [`apply_filters`](Self::apply_filters) with an explicit clock
    pub fn apply_filters_at(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        currency: &str,
        now: DateTime<Utc>,
    ) -> Vec<Listing> {
        if criteria.is_empty() {
            return listings.to_vec();
        }

        let result: Vec<Listing> = listings
            .iter()
            .filter(|listing| self.matches(listing, criteria, currency, now))
            .cloned()
            .collect();

        tracing::trace!("Filtered {} listings down to {}", listings.len(), result.len());

        result
    }

    /// Number of listings [`apply_filters`](Self::apply_filters) would return
    pub fn count_matches(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        currency: &str,
    ) -> usize {
        self.count_matches_at(listings, criteria, currency, Utc::now())
    }

    pub fn count_matches_at(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        currency: &str,
        now: DateTime<Utc>,
    ) -> usize {
        if criteria.is_empty() {
            return listings.len();
        }

        listings
            .iter()
            .filter(|listing| self.matches(listing, criteria, currency, now))
            .count()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::with_new_listing_days(DEFAULT_NEW_LISTING_DAYS)
    }
}

/// Filter with the default pipeline
pub fn apply_filters(listings: &[Listing], criteria: &FilterCriteria, currency: &str) -> Vec<Listing> {
    FilterPipeline::default().apply_filters(listings, criteria, currency)
}

/// Count with the default pipeline
pub fn count_matches(listings: &[Listing], criteria: &FilterCriteria, currency: &str) -> usize {
    FilterPipeline::default().count_matches(listings, criteria, currency)
}
