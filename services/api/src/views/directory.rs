//! Public provider directory and provider profiles

use std::collections::BTreeSet;

use crate::error::ViewResult;
use crate::models::{Provider, ProviderSearch, Rating};
use crate::repositories::DirectoryRepository;
use crate::state::AppState;

/// One page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPage {
    pub providers: Vec<Provider>,
    /// Distinct addresses on this page, for the location filter
    pub locations: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDetails {
    pub provider: Provider,
    pub reviews: Vec<Rating>,
}

impl ProviderDetails {
    /// Mean of the listed reviews, when the backend sent no average
    pub fn average_rating(&self) -> Option<f64> {
        self.provider.average_rating.or_else(|| {
            (!self.reviews.is_empty()).then(|| {
                let total: u32 = self.reviews.iter().map(|r| u32::from(r.score)).sum();
                f64::from(total) / self.reviews.len() as f64
            })
        })
    }
}

pub struct DirectoryView {
    directory: DirectoryRepository,
}

impl DirectoryView {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory_repository.clone(),
        }
    }

    pub async fn search(&self, search: &ProviderSearch) -> ViewResult<ProviderPage> {
        let providers = self.directory.search(search).await?;
        let locations = providers
            .iter()
            .filter_map(|p| p.address.as_deref())
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ProviderPage {
            providers,
            locations,
        })
    }

    /// Profile and reviews, fetched concurrently
    pub async fn provider(&self, id: i64) -> ViewResult<ProviderDetails> {
        let (provider, reviews) =
            tokio::join!(self.directory.provider(id), self.directory.ratings(id));
        Ok(ProviderDetails {
            provider: provider?,
            reviews: reviews?,
        })
    }
}
