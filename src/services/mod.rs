// Service exports
pub mod cache;
pub mod listings;

pub use cache::{CacheStats, ListingCache};
pub use listings::{parse_listings, ListingsClient, ListingsError};
