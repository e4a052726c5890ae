//! Product matching: hard metadata filter, then a soft sustainability
//! preference over the surviving candidates.

use std::sync::Arc;

use tracing::info;

use advisor_core::domain::product::{ProductFilter, ProductRecord};
use advisor_core::domain::profile::{InvestmentProfile, Preference};
use advisor_core::errors::ApplicationError;

use advisor_index::repositories::DocumentIndex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(ProductRecord),
    NoMatch,
}

pub struct ProductMatcher {
    index: Arc<dyn DocumentIndex>,
}

impl ProductMatcher {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }

    pub async fn match_profile(
        &self,
        profile: &InvestmentProfile,
    ) -> Result<MatchOutcome, ApplicationError> {
        let filter = ProductFilter::from_profile(profile);
        let candidates = self
            .index
            .find_matching(&filter)
            .await
            .map_err(|error| ApplicationError::Index(error.to_string()))?;

        let candidate_count = candidates.len();
        let prefers_sustainable = profile.sustainability == Preference::Yes;
        let selected = select_candidate(candidates, prefers_sustainable);

        match &selected {
            Some(product) => info!(
                product_id = %product.id,
                candidates = candidate_count,
                sustainable = product.sustainable,
                "product matched"
            ),
            None => info!(candidates = candidate_count, "no product matched"),
        }

        Ok(selected.map_or(MatchOutcome::NoMatch, MatchOutcome::Matched))
    }
}

/// Sustainability never excludes a candidate. A customer who cares about it
/// gets the first sustainable candidate when one exists; everyone else, and
/// the fallback, is the first candidate in index order.
fn select_candidate(
    candidates: Vec<ProductRecord>,
    prefers_sustainable: bool,
) -> Option<ProductRecord> {
    if prefers_sustainable {
        if let Some(position) = candidates.iter().position(|candidate| candidate.sustainable) {
            return candidates.into_iter().nth(position);
        }
    }
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use advisor_core::domain::product::{ProductId, ProductRecord};
    use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};

    use super::select_candidate;

    fn candidate(id: i64, sustainable: bool) -> ProductRecord {
        ProductRecord {
            id: ProductId(id),
            name: format!("Product {id}"),
            min_amount: 0,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost: Some(Preference::No),
            sustainable,
            source_file: format!("product_{id}.pdf"),
        }
    }

    #[test]
    fn first_candidate_wins_without_a_sustainability_preference() {
        let selected = select_candidate(vec![candidate(1, false), candidate(2, true)], false);
        assert_eq!(selected.map(|product| product.id), Some(ProductId(1)));
    }

    #[test]
    fn sustainability_preference_skips_ahead_to_a_flagged_candidate() {
        let selected =
            select_candidate(vec![candidate(1, false), candidate(2, false), candidate(3, true)], true);
        assert_eq!(selected.map(|product| product.id), Some(ProductId(3)));
    }

    #[test]
    fn preference_without_sustainable_candidates_falls_back_to_the_first() {
        let selected = select_candidate(vec![candidate(1, false), candidate(2, false)], true);
        assert_eq!(selected.map(|product| product.id), Some(ProductId(1)));
    }

    #[test]
    fn no_candidates_is_no_match() {
        assert_eq!(select_candidate(Vec::new(), true), None);
    }
}
