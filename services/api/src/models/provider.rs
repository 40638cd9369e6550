//! Provider directory and profile models

use serde::{Deserialize, Serialize};

/// Upper bound of the price filter; at the bound the filter is not sent
pub const MAX_PRICE_FILTER: u32 = 10_000;

/// A service provider as shown in the directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Provider {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub service_type: Option<String>,
    pub available: Option<bool>,
    pub bio: Option<String>,
    pub profile_photo: Option<String>,
    pub average_rating: Option<f64>,
    pub price: Option<f64>,
    pub verified: Option<bool>,
}

impl Provider {
    pub fn provider_id(&self) -> Option<i64> {
        self.id.or(self.user_id)
    }
}

/// Body of `PUT /api/providers/profile/update`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Filters for `GET /api/public/provider/category/{category}`
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSearch {
    pub category: String,
    pub min_rating: f64,
    pub min_price: u32,
    pub max_price: u32,
    pub location: Option<String>,
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
}

impl ProviderSearch {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            min_rating: 0.0,
            min_price: 0,
            max_price: MAX_PRICE_FILTER,
            location: None,
            page: 0,
            size: 10,
        }
    }

    /// Query pairs; neutral filters are left out
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if self.min_rating > 0.0 {
            query.push(("minRating", self.min_rating.to_string()));
        }
        if self.min_price > 0 {
            query.push(("minPrice", self.min_price.to_string()));
        }
        if self.max_price < MAX_PRICE_FILTER {
            query.push(("maxPrice", self.max_price.to_string()));
        }
        if let Some(location) = self.location.as_deref().filter(|l| !l.trim().is_empty()) {
            query.push(("location", location.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_filters_are_omitted() {
        let search = ProviderSearch::new("ELECTRICIAN");
        assert_eq!(
            search.query(),
            vec![("page", "0".to_string()), ("size", "10".to_string())]
        );

        let search = ProviderSearch {
            min_rating: 4.0,
            max_price: 500,
            location: Some("Pune".to_string()),
            page: 2,
            ..ProviderSearch::new("ELECTRICIAN")
        };
        let query = search.query();
        assert!(query.contains(&("minRating", "4".to_string())));
        assert!(query.contains(&("maxPrice", "500".to_string())));
        assert!(query.contains(&("location", "Pune".to_string())));
        assert!(!query.iter().any(|(key, _)| *key == "minPrice"));
    }
}
