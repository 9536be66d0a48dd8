// Core engine exports
pub mod distance;
pub mod filters;
pub mod pipeline;
pub mod proximity;

pub use distance::{distance_km, haversine_distance};
pub use filters::{require_all, require_any};
pub use pipeline::{apply_filters, count_matches, FilterPipeline, DEFAULT_NEW_LISTING_DAYS};
pub use proximity::{distance_to, filter_by_proximity, nearby, within_radius};
