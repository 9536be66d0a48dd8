//! Listing Search - filter and proximity engine for the real-estate marketplace
//!
//! This library provides the listing filter pipeline used by the marketplace front end.
//! The engine in [`core`] is pure; [`services`] and [`routes`] wrap it in an HTTP service
//! that fetches and caches the listing snapshot from the backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{apply_filters, count_matches, distance_km, filter_by_proximity, haversine_distance, FilterPipeline};
pub use models::{FilterCriteria, Listing, LocalizedLabel, Price, SelectedLocation};
