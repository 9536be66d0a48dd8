use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::FilterCriteria;

/// Request to search the listing snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_search_request"))]
pub struct SearchRequest {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[validate(length(equal = 3))]
    #[serde(default)]
    pub currency: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to count matching listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_count_request"))]
pub struct CountRequest {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[validate(length(equal = 3))]
    #[serde(default)]
    pub currency: Option<String>,
}

/// Request for listings around a point, nearest first
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "radius")]
    pub radius_km: f64,
}

fn validate_search_request(req: &SearchRequest) -> Result<(), ValidationError> {
    validate_currency(req.currency.as_deref())?;
    validate_criteria(&req.criteria)
}

fn validate_count_request(req: &CountRequest) -> Result<(), ValidationError> {
    validate_currency(req.currency.as_deref())?;
    validate_criteria(&req.criteria)
}

fn validate_currency(currency: Option<&str>) -> Result<(), ValidationError> {
    match currency {
        Some(code) if !code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Err(ValidationError::new("currency_code"))
        }
        _ => Ok(()),
    }
}

/// Range checks the filter engine itself leaves to the caller
pub fn validate_criteria(criteria: &FilterCriteria) -> Result<(), ValidationError> {
    check_range("price", criteria.min_price, criteria.max_price)?;
    check_range("area", criteria.min_area, criteria.max_area)?;

    if let Some(location) = &criteria.location {
        if !(location.radius >= 0.0) {
            return Err(ValidationError::new("radius_negative"));
        }
        if let Some((lat, lon)) = location.target() {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(ValidationError::new("coordinates_out_of_range"));
            }
        }
    }

    Ok(())
}

fn check_range(name: &'static str, min: Option<f64>, max: Option<f64>) -> Result<(), ValidationError> {
    for bound in [min, max].into_iter().flatten() {
        if !(bound >= 0.0) {
            let mut err = ValidationError::new("bound_negative");
            err.add_param("field".into(), &name);
            return Err(err);
        }
    }

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            let mut err = ValidationError::new("min_greater_than_max");
            err.add_param("field".into(), &name);
            return Err(err);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::SelectedLocation;

    #[test]
    fn test_empty_search_request_is_valid() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_inverted_price_range_rejected() {
        let mut req = SearchRequest::default();
        req.criteria.min_price = Some(500.0);
        req.criteria.max_price = Some(100.0);

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_bad_currency_rejected() {
        let mut req = CountRequest::default();
        req.currency = Some("US".to_string());
        assert!(req.validate().is_err());

        req.currency = Some("U$D".to_string());
        assert!(req.validate().is_err());

        req.currency = Some("USD".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut criteria = FilterCriteria::default();
        criteria.location = Some(SelectedLocation::new(41.0, 29.0, -1.0));
        assert!(validate_criteria(&criteria).is_err());

        criteria.location = Some(SelectedLocation::new(41.0, 29.0, 5.0));
        assert!(validate_criteria(&criteria).is_ok());
    }

    #[test]
    fn test_nearby_request_bounds() {
        let req = NearbyRequest {
            latitude: 91.0,
            longitude: 29.0,
            radius_km: 5.0,
        };
        assert!(req.validate().is_err());

        let req: NearbyRequest =
            serde_json::from_str(r#"{"latitude": 41.0, "longitude": 29.0, "radius": 5}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
