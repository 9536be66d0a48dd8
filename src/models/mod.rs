// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{FilterCriteria, GeoLocation, Listing, LocalizedLabel, NearbyListing, Price, SelectedLocation, DEFAULT_RADIUS_KM};
pub use requests::{CountRequest, NearbyRequest, SearchRequest};
pub use responses::{CountResponse, ErrorResponse, HealthResponse, NearbyResponse, RefreshResponse, SearchResponse};
